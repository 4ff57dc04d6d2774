//! Value Object Module

pub mod credential;
pub mod email;
pub mod user_id;
pub mod user_name;
pub mod user_status;

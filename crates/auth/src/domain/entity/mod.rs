//! Entity Module

pub mod access_token;
pub mod magic_link;
pub mod session;
pub mod user;

//! Infrastructure Layer
//!
//! Store implementations and retry plumbing.

pub mod memory;
pub mod postgres;
pub mod retry;

// Re-exports
pub use memory::MemoryAuthStore;
pub use postgres::PgAuthStore;
pub use retry::{BackoffPolicy, with_backoff};

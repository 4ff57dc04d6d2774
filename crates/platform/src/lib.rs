//! Platform Crate
//!
//! Infrastructure primitives with no domain knowledge:
//! - `crypto` - Secure randomness, digests, encoding, constant-time compare
//! - `password` - Credential hashing (bcrypt / Argon2id) behind one contract
//! - `similarity` - String similarity metric for password policy checks

pub mod crypto;
pub mod password;
pub mod similarity;

//! Session Token Signing
//!
//! Sessions are referenced by a `<session_id>.<signature>` string where the
//! signature is HMAC-SHA256 over the session id under the configured secret.
//! The store holds only the session record; possession of a validly signed
//! token is what authenticates the bearer.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Sign a session id into a transportable token
pub fn sign(secret: &[u8; 32], session_id: Uuid) -> String {
    let session_id = session_id.to_string();

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(session_id.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!(
        "{}.{}",
        session_id,
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Parse and verify a session token; `None` on any mismatch
pub fn parse(secret: &[u8; 32], token: &str) -> Option<Uuid> {
    let (session_id_str, signature_b64) = token.split_once('.')?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(session_id_str.as_bytes());

    let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .ok()?;

    // Constant-time verification inside the Mac implementation
    mac.verify_slice(&signature).ok()?;

    session_id_str.parse().ok()
}

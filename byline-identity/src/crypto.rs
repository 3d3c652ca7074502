//! Identifier and API key generation.

use base64::{engine::general_purpose, Engine as _};
use rand::Rng;

use crate::types::AccountId;
use uuid::Uuid;

/// Generate a fresh, globally unique account id.
pub fn new_account_id() -> AccountId {
    Uuid::new_v4()
}

/// Generates a cryptographically secure API key with 256 bits of entropy.
///
/// The key is formatted as `bk-{base64url_encoded_random_bytes}` where the
/// random bytes are 32 bytes (256 bits) of cryptographically secure random
/// data, giving a 46-character key.
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; 32];
    rand::rng().fill(&mut key_bytes);

    format!("bk-{}", general_purpose::URL_SAFE_NO_PAD.encode(key_bytes))
}

/// Abbreviate an API key for logs and traces: prefix plus the first few
/// characters of the secret, never the whole key.
pub fn abbrev_api_key(api_key: &str) -> String {
    let visible: String = api_key.chars().take(9).collect();
    format!("{visible}…")
}

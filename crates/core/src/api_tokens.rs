//! Device / mobile API token generation and hashing.
//!
//! A token is handed to the mobile app or scanning device exactly once at
//! login. Only its SHA-256 digest is stored on the user row. Refresh-token
//! sessions go through the same [`token_digest`].

use rand::RngCore;
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of random bytes in a token (rendered as twice as many hex chars).
pub const TOKEN_BYTES: usize = 32;

/// Number of leading characters kept as a human-visible prefix.
pub const TOKEN_PREFIX_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// The result of issuing a new API token.
pub struct GeneratedApiToken {
    /// The plaintext token (returned to the client once, never stored).
    pub plaintext: String,
    /// The first [`TOKEN_PREFIX_LENGTH`] characters, safe to display to admins.
    pub prefix: String,
    /// SHA-256 hex digest of the plaintext (stored on the user row).
    pub hash: String,
}

/// Generate a new random API token.
pub fn generate_api_token() -> GeneratedApiToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let prefix = extract_prefix(&plaintext).to_string();
    let hash = hash_api_token(&plaintext);

    GeneratedApiToken {
        plaintext,
        prefix,
        hash,
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 of a bearer secret. The only form a token is ever persisted in.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Digest of a device API token, used both when issuing and when authenticating.
pub fn hash_api_token(token: &str) -> String {
    token_digest(token)
}

/// Extract the display prefix from a plaintext token.
pub fn extract_prefix(token: &str) -> &str {
    &token[..TOKEN_PREFIX_LENGTH.min(token.len())]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

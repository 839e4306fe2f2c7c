//! Token generation for session entries

use sha2::{Digest, Sha256};

/// Length of a session token in hex characters
pub const TOKEN_LEN: usize = 16;

/// Generate an opaque token for a session entry
///
/// # Arguments
/// * `owner` - User the entry belongs to
/// * `sequence` - Process-wide insertion counter
/// * `secret` - Per-process salt so tokens cannot be predicted
///
/// # Returns
/// * 16-character hexadecimal token
pub fn generate_session_token(owner: u64, sequence: u64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner.to_be_bytes());
    hasher.update(sequence.to_be_bytes());
    hasher.update(secret.as_bytes());
    let result = hasher.finalize();

    hex::encode(&result[..TOKEN_LEN / 2])
}

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of a password. Stored at registration and
/// compared verbatim at login.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

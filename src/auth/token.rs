use rand::RngCore;
use ring::constant_time;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random token (hex-encoded).
pub fn generate_secure_token(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hash a token for safe database storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time string equality for token comparison.
///
/// Equal-length inputs compare in constant time; a length mismatch returns
/// early, which leaks only the length.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    constant_time::verify_slices_are_equal(a.as_bytes(), b.as_bytes()).is_ok()
}

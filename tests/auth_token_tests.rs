use warden::auth::token::{constant_time_eq, generate_secure_token, hash_token};

#[test]
fn test_token_length_matches_requested_bytes() {
    // Hex encoding doubles the byte count
    assert_eq!(generate_secure_token(32).len(), 64);
    assert_eq!(generate_secure_token(64).len(), 128);
}

#[test]
fn test_tokens_are_unique() {
    let a = generate_secure_token(32);
    let b = generate_secure_token(32);
    assert_ne!(a, b);
}

#[test]
fn test_token_is_hex() {
    let token = generate_secure_token(32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_hash_token_is_deterministic() {
    let token = generate_secure_token(32);
    assert_eq!(hash_token(&token), hash_token(&token));
}

#[test]
fn test_hash_token_differs_from_input() {
    let token = generate_secure_token(32);
    let digest = hash_token(&token);
    assert_ne!(digest, token);
    // SHA-256 hex digest is 64 chars
    assert_eq!(digest.len(), 64);
}

#[test]
fn test_different_tokens_hash_differently() {
    assert_ne!(hash_token("token-a"), hash_token("token-b"));
}

#[test]
fn test_constant_time_eq() {
    assert!(constant_time_eq("abc123", "abc123"));
    assert!(!constant_time_eq("abc123", "abc124"));
    assert!(!constant_time_eq("abc123", "abc12"));
    assert!(!constant_time_eq("", "x"));
    assert!(constant_time_eq("", ""));
}

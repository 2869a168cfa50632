//! Salted password hashes for terminal users.
//!
//! Hashes are stored as `sha256$<salt hex>$<digest hex>`.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn from_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Hashes `password` with a fresh random salt.
pub fn generate_secure_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}${}", SCHEME, to_hex(&salt), digest(&salt, password))
}

/// Checks `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let (Some(scheme), Some(salt_hex), Some(expected), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    match from_hex(salt_hex) {
        Some(salt) => digest(&salt, password) == expected,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trip() {
        let hash = generate_secure_password("Th1s1sTh3m0stS3cur3!");
        assert!(hash.starts_with("sha256$"));
        assert!(verify_password("Th1s1sTh3m0stS3cur3!", &hash));
        assert!(!verify_password("password1", &hash));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(generate_secure_password("password1"), generate_secure_password("password1"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("password1", ""));
        assert!(!verify_password("password1", "md5$00$abc"));
        assert!(!verify_password("password1", "sha256$zz$abc"));
        assert!(!verify_password("password1", "sha256$00$abc$extra"));
    }
}

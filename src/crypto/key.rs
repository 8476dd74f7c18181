//! Key derivation for the native container
//!
//! The container key is derived from the master password and the header
//! salt: the seed digest is MD5(password || salt) as lowercase hex, then
//! the configured number of extra MD5 rounds is applied over the running
//! hex digest. The final 32 hex characters are the AES-256 key bytes.

use super::md5::{md5_hex, md5_hex_bytes};
use md5::{Digest, Md5};

/// Key length for AES-256 (32 bytes = 256 bits)
pub const KEY_LENGTH: usize = 32;

/// Derive the container key from password and salt
///
/// `iterations` is the extra MD5 round count stored in the container
/// header; 0 means the seed digest is used directly.
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LENGTH] {
    let mut hasher = Md5::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    let seed = hasher.finalize();

    let mut digest: String = seed.iter().map(|b| format!("{:02x}", b)).collect();
    for _ in 0..iterations {
        digest = md5_hex(&digest);
    }

    // 32 hex characters are exactly 32 ASCII bytes
    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(digest.as_bytes());
    key
}

/// Key-check value stored in the container header
///
/// Lets `validate_password` verify a candidate without touching the
/// encrypted payload. The derived key itself is never written out.
pub fn key_check(key: &[u8; KEY_LENGTH], salt: &[u8]) -> [u8; 32] {
    let mut input = Vec::with_capacity(key.len() + salt.len());
    input.extend_from_slice(key);
    input.extend_from_slice(salt);
    let hex = md5_hex_bytes(&input);

    let mut check = [0u8; 32];
    check.copy_from_slice(hex.as_bytes());
    check
}

/// Overwrite key material in place
pub fn wipe_key(key: &mut [u8; KEY_LENGTH]) {
    key.fill(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [7u8; 16];
        let a = derive_key("Sun001!", &salt, 200);
        let b = derive_key("Sun001!", &salt, 200);
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_key_salt_matters() {
        let a = derive_key("Sun001!", &[1u8; 16], 0);
        let b = derive_key("Sun001!", &[2u8; 16], 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_key_iterations_matter() {
        let salt = [7u8; 16];
        let a = derive_key("Sun001!", &salt, 0);
        let b = derive_key("Sun001!", &salt, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_key_is_ascii_hex() {
        let key = derive_key("password", &[0u8; 16], 3);
        assert!(key.iter().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_check_differs_per_password() {
        let salt = [9u8; 16];
        let a = key_check(&derive_key("one", &salt, 0), &salt);
        let b = key_check(&derive_key("two", &salt, 0), &salt);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wipe_key() {
        let mut key = derive_key("secret", &[3u8; 16], 0);
        wipe_key(&mut key);
        assert_eq!(key, [0u8; KEY_LENGTH]);
    }
}

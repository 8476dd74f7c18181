//! MD5 hashing for key checks and payload integrity
//!
//! The native container prepends an MD5 hex digest to the plaintext
//! before encryption so a wrong key is detected on decryption.

use md5::{Digest, Md5};

/// MD5 hex string length
pub const MD5_HEX_LENGTH: usize = 32;

/// Calculate MD5 hash of input string and return as lowercase hex string (32 chars)
pub fn md5_hex(input: &str) -> String {
    md5_hex_bytes(input.as_bytes())
}

/// Calculate MD5 hash of raw bytes and return as lowercase hex string (32 chars)
pub fn md5_hex_bytes(input: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(input);
    let result = hasher.finalize();

    result.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Calculate MD5 hash of raw bytes and return the 16 digest bytes
pub fn md5_bytes(input: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(input);
    hasher.finalize().into()
}

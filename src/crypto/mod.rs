//! Cryptographic operations for Keyring Desktop Core
//!
//! AES-256-CBC with PKCS7 padding protects the native container payload;
//! DES-EDE3-CBC is kept only for reading legacy PalmOS Keyring files.

pub mod aes;
pub mod key;
pub mod md5;
pub mod tdes;

pub use aes::{decrypt, encrypt, IV_SIZE};
pub use key::{derive_key, key_check, wipe_key, KEY_LENGTH};
pub use md5::{md5_bytes, md5_hex, md5_hex_bytes};

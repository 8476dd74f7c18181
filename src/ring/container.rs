//! Native container format (version 1)
//!
//! Byte layout:
//!
//! ```text
//! offset  size  field
//! 0       4     magic "KRNG"
//! 4       2     format version (LE u16)
//! 6       1     cipher id (1 = AES-256-CBC)
//! 7       1     kdf id (1 = salted iterated MD5)
//! 8       4     kdf iterations (LE u32)
//! 12      16    salt
//! 28      16    IV
//! 44      32    key-check (MD5 hex of derived key + salt)
//! 76      ...   ciphertext (checksum-prefixed JSON payload)
//! ```
//!
//! The key-check lets password validation run without decrypting the
//! payload; the checksum inside the ciphertext catches payload
//! corruption that a matching key-check would miss.

use serde::{Deserialize, Serialize};

use crate::crypto::{self, IV_SIZE, KEY_LENGTH};
use crate::error::{KeyringError, Result};
use crate::model::{CategoryRegistry, Item};
use crate::utils::random_bytes;

pub const MAGIC: &[u8; 4] = b"KRNG";
pub const FORMAT_VERSION: u16 = 1;
pub const CIPHER_AES256_CBC: u8 = 1;
pub const KDF_ITERATED_MD5: u8 = 1;
pub const SALT_SIZE: usize = 16;
pub const HEADER_SIZE: usize = 76;

/// Default KDF iteration count for new containers
pub const DEFAULT_ITERATIONS: u32 = 200;

/// Parsed container header
#[derive(Debug, Clone)]
pub struct ContainerHeader {
    pub version: u16,
    pub cipher_id: u8,
    pub kdf_id: u8,
    pub iterations: u32,
    pub salt: [u8; SALT_SIZE],
    pub iv: [u8; IV_SIZE],
    pub key_check: [u8; 32],
}

impl ContainerHeader {
    /// Fresh header with random salt and IV for a new save
    pub fn generate(iterations: u32, key_check: [u8; 32]) -> Self {
        let mut salt = [0u8; SALT_SIZE];
        let mut iv = [0u8; IV_SIZE];
        random_bytes(&mut salt);
        random_bytes(&mut iv);

        Self {
            version: FORMAT_VERSION,
            cipher_id: CIPHER_AES256_CBC,
            kdf_id: KDF_ITERATED_MD5,
            iterations,
            salt,
            iv,
            key_check,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.push(self.cipher_id);
        buf.push(self.kdf_id);
        buf.extend_from_slice(&self.iterations.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&self.key_check);
        debug_assert_eq!(buf.len(), HEADER_SIZE);
        buf
    }

    /// Parse a header and return it plus the trailing ciphertext slice
    pub fn parse(bytes: &[u8]) -> Result<(Self, &[u8])> {
        if bytes.len() < HEADER_SIZE {
            return Err(KeyringError::Format("Container too short".to_string()));
        }
        if &bytes[0..4] != MAGIC {
            return Err(KeyringError::Format("Not a keyring container".to_string()));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FORMAT_VERSION {
            return Err(KeyringError::Format(format!(
                "Unsupported container version {}",
                version
            )));
        }

        let cipher_id = bytes[6];
        let kdf_id = bytes[7];
        if cipher_id != CIPHER_AES256_CBC {
            return Err(KeyringError::Format(format!("Unknown cipher id {}", cipher_id)));
        }
        if kdf_id != KDF_ITERATED_MD5 {
            return Err(KeyringError::Format(format!("Unknown kdf id {}", kdf_id)));
        }

        let iterations = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&bytes[12..28]);
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&bytes[28..44]);
        let mut key_check = [0u8; 32];
        key_check.copy_from_slice(&bytes[44..76]);

        Ok((
            Self {
                version,
                cipher_id,
                kdf_id,
                iterations,
                salt,
                iv,
                key_check,
            },
            &bytes[HEADER_SIZE..],
        ))
    }

    /// Derive the key for a candidate password and test it against the
    /// stored key-check. Returns the key only when the check matches.
    pub fn check_password(&self, candidate: &str) -> Option<[u8; KEY_LENGTH]> {
        let key = crypto::derive_key(candidate, &self.salt, self.iterations);
        if crypto::key_check(&key, &self.salt) == self.key_check {
            Some(key)
        } else {
            None
        }
    }
}

/// Decrypted container payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    pub categories: CategoryRegistry,
    pub items: Vec<Item>,
}

/// Assemble a full container from a payload and a password-derived key
pub fn seal(payload: &Payload, key: &[u8; KEY_LENGTH], header: &ContainerHeader) -> Result<Vec<u8>> {
    let json = serde_json::to_string(payload)?;
    let ciphertext = crypto::encrypt(&json, key, &header.iv).map_err(KeyringError::Encryption)?;

    let mut container = header.to_bytes();
    container.extend_from_slice(&ciphertext);
    Ok(container)
}

/// Decrypt and deserialize a container payload
///
/// A checksum or padding failure maps to `Authentication`; a payload
/// that decrypts but does not deserialize maps to `Format`.
pub fn open(ciphertext: &[u8], key: &[u8; KEY_LENGTH], header: &ContainerHeader) -> Result<Payload> {
    let json = crypto::decrypt(ciphertext, key, &header.iv)
        .map_err(|_| KeyringError::Authentication)?;
    Ok(serde_json::from_str(&json)?)
}

//! AES-256-CBC encryption and decryption
//!
//! Payload scheme for the native container and the AES-based legacy
//! imports: PKCS7 padding, MD5 hex checksum prepended to the plaintext
//! before encryption and verified after decryption. A checksum or
//! padding failure means the key was wrong or the data was tampered with.

use aes::Aes256;
use block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cbc::{Decryptor, Encryptor};

use super::key::KEY_LENGTH;
use super::md5::{md5_hex, MD5_HEX_LENGTH};

/// IV size for AES-CBC (16 bytes = 128 bits)
pub const IV_SIZE: usize = 16;

type Aes256CbcEnc = Encryptor<Aes256>;
type Aes256CbcDec = Decryptor<Aes256>;

/// Encrypt plaintext with AES-256-CBC, checksum prepended
pub fn encrypt(plaintext: &str, key: &[u8; KEY_LENGTH], iv: &[u8; IV_SIZE]) -> Result<Vec<u8>, String> {
    let md5_checksum = md5_hex(plaintext);
    let full_text = format!("{}{}", md5_checksum, plaintext);
    let data = full_text.as_bytes();

    // Buffer must hold data plus one full padding block
    let block_size = 16;
    let padded_len = ((data.len() / block_size) + 1) * block_size;

    let mut buffer = vec![0u8; padded_len];
    buffer[..data.len()].copy_from_slice(data);

    let encryptor = Aes256CbcEnc::new(key.into(), iv.into());

    let encrypted = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, data.len())
        .map_err(|e| format!("Encryption failed: {:?}", e))?;

    Ok(encrypted.to_vec())
}

/// Decrypt AES-256-CBC ciphertext and verify the embedded checksum
pub fn decrypt(ciphertext: &[u8], key: &[u8; KEY_LENGTH], iv: &[u8; IV_SIZE]) -> Result<String, String> {
    if ciphertext.is_empty() {
        return Err("Empty ciphertext".to_string());
    }

    let mut buffer = ciphertext.to_vec();

    let decryptor = Aes256CbcDec::new(key.into(), iv.into());

    let decrypted = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|e| format!("Decryption failed: {:?}", e))?;

    let full_text = String::from_utf8(decrypted.to_vec())
        .map_err(|e| format!("Invalid UTF-8: {}", e))?;

    if full_text.len() < MD5_HEX_LENGTH {
        return Err("Decrypted text too short".to_string());
    }

    let (checksum, plaintext) = full_text.split_at(MD5_HEX_LENGTH);
    let computed_checksum = md5_hex(plaintext);

    if checksum != computed_checksum {
        return Err("MD5 checksum mismatch".to_string());
    }

    Ok(plaintext.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::derive_key;

    fn test_key() -> [u8; KEY_LENGTH] {
        derive_key("TestPassword123!", &[5u8; 16], 0)
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let iv = [11u8; IV_SIZE];
        let plaintext = "Hello, World! This is a test message.";

        let encrypted = encrypt(plaintext, &key, &iv).unwrap();
        let decrypted = decrypt(&encrypted, &key, &iv).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_utf8() {
        let key = test_key();
        let iv = [0u8; IV_SIZE];
        let plaintext = "Привет мир! 你好世界! مرحبا بالعالم";

        let encrypted = encrypt(plaintext, &key, &iv).unwrap();
        let decrypted = decrypt(&encrypted, &key, &iv).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let key = test_key();
        let iv = [0u8; IV_SIZE];

        let encrypted = encrypt("", &key, &iv).unwrap();
        let decrypted = decrypt(&encrypted, &key, &iv).unwrap();

        assert_eq!(decrypted, "");
    }

    #[test]
    fn test_wrong_key_fails() {
        let iv = [0u8; IV_SIZE];
        let encrypted = encrypt("Secret message", &test_key(), &iv).unwrap();

        let wrong = derive_key("wrong_password", &[5u8; 16], 0);
        assert!(decrypt(&encrypted, &wrong, &iv).is_err());
    }

    #[test]
    fn test_wrong_iv_fails() {
        let key = test_key();
        let encrypted = encrypt("Secret message", &key, &[1u8; IV_SIZE]).unwrap();

        assert!(decrypt(&encrypted, &key, &[2u8; IV_SIZE]).is_err());
    }

    #[test]
    fn test_corrupted_ciphertext_fails() {
        let key = test_key();
        let iv = [0u8; IV_SIZE];
        let mut encrypted = encrypt("Secret message", &key, &iv).unwrap();
        encrypted[0] ^= 0xff;

        assert!(decrypt(&encrypted, &key, &iv).is_err());
    }

    #[test]
    fn test_empty_ciphertext_fails() {
        assert!(decrypt(&[], &test_key(), &[0u8; IV_SIZE]).is_err());
    }
}

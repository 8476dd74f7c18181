//! Triple-DES decryption for the PalmOS Keyring import
//!
//! Keyring for PalmOS records are encrypted with DES-EDE3-CBC using a
//! two-key schedule: the 16-byte MD5 of salt and password is expanded to
//! 24 bytes by repeating the first half (K1, K2, K1).

use block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cbc::{Decryptor, Encryptor};
use des::TdesEde3;

/// Triple-DES key length (24 bytes)
pub const TDES_KEY_LENGTH: usize = 24;

/// DES block / IV size (8 bytes)
pub const TDES_IV_SIZE: usize = 8;

type TdesCbcEnc = Encryptor<TdesEde3>;
type TdesCbcDec = Decryptor<TdesEde3>;

/// Expand a 16-byte digest to a 24-byte two-key 3DES key (K1, K2, K1)
pub fn expand_key(digest: &[u8; 16]) -> [u8; TDES_KEY_LENGTH] {
    let mut key = [0u8; TDES_KEY_LENGTH];
    key[..16].copy_from_slice(digest);
    key[16..].copy_from_slice(&digest[..8]);
    key
}

/// Encrypt raw bytes with DES-EDE3-CBC and PKCS7 padding
pub fn encrypt(plaintext: &[u8], key: &[u8; TDES_KEY_LENGTH], iv: &[u8; TDES_IV_SIZE]) -> Result<Vec<u8>, String> {
    let block_size = 8;
    let padded_len = ((plaintext.len() / block_size) + 1) * block_size;

    let mut buffer = vec![0u8; padded_len];
    buffer[..plaintext.len()].copy_from_slice(plaintext);

    let encryptor = TdesCbcEnc::new(key.into(), iv.into());

    let encrypted = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
        .map_err(|e| format!("3DES encryption failed: {:?}", e))?;

    Ok(encrypted.to_vec())
}

/// Decrypt DES-EDE3-CBC ciphertext with PKCS7 padding
pub fn decrypt(ciphertext: &[u8], key: &[u8; TDES_KEY_LENGTH], iv: &[u8; TDES_IV_SIZE]) -> Result<Vec<u8>, String> {
    if ciphertext.is_empty() || ciphertext.len() % 8 != 0 {
        return Err("Invalid 3DES ciphertext length".to_string());
    }

    let mut buffer = ciphertext.to_vec();

    let decryptor = TdesCbcDec::new(key.into(), iv.into());

    let decrypted = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|e| format!("3DES decryption failed: {:?}", e))?;

    Ok(decrypted.to_vec())
}

//! eWallet import
//!
//! Container: magic `!WLT`, version, 16-byte salt and 16-byte IV, then
//! an AES-256-CBC payload of the checksum-prefixed plaintext. The KDF
//! is fixed at 1000 MD5 rounds over password and salt. The plaintext is
//! a JSON array of card objects; absent fields default to empty
//! strings.

use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use super::{Converter, DEFAULT_IMPORT_CATEGORY};
use crate::crypto::{self, IV_SIZE, KEY_LENGTH};
use crate::error::{KeyringError, Result};
use crate::model::Item;
use crate::ring::Ring;

const MAGIC: &[u8; 4] = b"!WLT";
const VERSION: u16 = 1;
const SALT_LEN: usize = 16;
const HEADER_SIZE: usize = 4 + 2 + SALT_LEN + IV_SIZE;

/// Fixed KDF round count used by the format
const KDF_ROUNDS: u32 = 1000;

pub struct EWalletConverter;

#[derive(Debug, Deserialize)]
struct Card {
    #[serde(default)]
    category: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    notes: String,
}

impl Converter for EWalletConverter {
    fn needs_input_file_password(&self) -> bool {
        true
    }

    fn convert(&self, path: &Path, input_password: &str, output_password: &str) -> Result<Ring> {
        info!("importing eWallet file from {}", path.display());
        let bytes = std::fs::read(path)?;

        let (key, iv, ciphertext) = parse_header(&bytes, input_password)?;

        let plaintext =
            crypto::decrypt(ciphertext, &key, &iv).map_err(|_| KeyringError::Authentication)?;

        let cards: Vec<Card> = serde_json::from_str(&plaintext)
            .map_err(|e| KeyringError::Format(format!("Invalid card list: {}", e)))?;

        let mut ring = Ring::new(output_password);

        for card in cards {
            let category = if card.category.is_empty() {
                DEFAULT_IMPORT_CATEGORY
            } else {
                card.category.as_str()
            };
            let category_id = ring.category_id_for_name(category)?;
            ring.add_item(Item::new(
                &card.title,
                &card.username,
                &card.password,
                &card.url,
                &card.notes,
                category_id,
            ))?;
        }

        debug!("imported {} items", ring.item_count());
        Ok(ring)
    }
}

fn parse_header<'a>(
    bytes: &'a [u8],
    password: &str,
) -> Result<([u8; KEY_LENGTH], [u8; IV_SIZE], &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KeyringError::Format("eWallet header truncated".to_string()));
    }
    if &bytes[..4] != MAGIC {
        return Err(KeyringError::Format("Not an eWallet file".to_string()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(KeyringError::Format(format!(
            "Unsupported eWallet version {}",
            version
        )));
    }

    let salt = &bytes[6..6 + SALT_LEN];
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&bytes[6 + SALT_LEN..HEADER_SIZE]);

    Ok((
        crypto::derive_key(password, salt, KDF_ROUNDS),
        iv,
        &bytes[HEADER_SIZE..],
    ))
}

//! CodeWallet import
//!
//! Container: magic `CWLT`, version, an 8-byte salt and a stored KDF
//! iteration count, then an AES-256-CBC payload (zero IV) carrying the
//! usual checksum-prefixed plaintext. The plaintext is a card list:
//! cards separated by 0x1e, fields inside a card separated by 0x1f as
//! `category, title, label, value, label, value, ...`. Card labels are
//! mapped onto item fields by keyword; everything unrecognized lands in
//! the notes.

use std::path::Path;

use log::{debug, info};

use super::{Converter, DEFAULT_IMPORT_CATEGORY};
use crate::crypto::{self, KEY_LENGTH};
use crate::error::{KeyringError, Result};
use crate::model::Item;
use crate::ring::Ring;

const MAGIC: &[u8; 4] = b"CWLT";
const VERSION: u16 = 1;
const SALT_LEN: usize = 8;
const HEADER_SIZE: usize = 4 + 2 + SALT_LEN + 4;

const RECORD_SEPARATOR: char = '\x1e';
const FIELD_SEPARATOR: char = '\x1f';

pub struct CodeWalletConverter;

impl Converter for CodeWalletConverter {
    fn needs_input_file_password(&self) -> bool {
        true
    }

    fn convert(&self, path: &Path, input_password: &str, output_password: &str) -> Result<Ring> {
        info!("importing CodeWallet file from {}", path.display());
        let bytes = std::fs::read(path)?;

        let (key, ciphertext) = parse_header(&bytes, input_password)?;

        let plaintext = crypto::decrypt(ciphertext, &key, &[0u8; crypto::IV_SIZE])
            .map_err(|_| KeyringError::Authentication)?;

        let mut ring = Ring::new(output_password);

        for card in plaintext.split(RECORD_SEPARATOR).filter(|c| !c.is_empty()) {
            let fields: Vec<&str> = card.split(FIELD_SEPARATOR).collect();
            if fields.len() < 2 {
                return Err(KeyringError::Format(
                    "Card is missing category or title".to_string(),
                ));
            }
            let pairs = &fields[2..];
            if pairs.len() % 2 != 0 {
                return Err(KeyringError::Conversion(format!(
                    "Card '{}' has an unpaired field label",
                    fields[1]
                )));
            }

            let category = if fields[0].is_empty() {
                DEFAULT_IMPORT_CATEGORY
            } else {
                fields[0]
            };
            let title = fields[1];

            let mut username = String::new();
            let mut password = String::new();
            let mut url = String::new();
            let mut notes = String::new();

            for pair in pairs.chunks(2) {
                let (label, value) = (pair[0], pair[1]);
                match label.to_lowercase().as_str() {
                    "username" | "user" | "login" | "account" => username = value.to_string(),
                    "password" | "pass" | "pin" => password = value.to_string(),
                    "url" | "link" | "website" => url = value.to_string(),
                    "notes" | "note" | "comment" => {
                        if !notes.is_empty() {
                            notes.push('\n');
                        }
                        notes.push_str(value);
                    }
                    other => {
                        if !notes.is_empty() {
                            notes.push('\n');
                        }
                        notes.push_str(&format!("{}: {}", other, value));
                    }
                }
            }

            let category_id = ring.category_id_for_name(category)?;
            ring.add_item(Item::new(title, &username, &password, &url, &notes, category_id))?;
        }

        debug!("imported {} items", ring.item_count());
        Ok(ring)
    }
}

fn parse_header<'a>(bytes: &'a [u8], password: &str) -> Result<([u8; KEY_LENGTH], &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KeyringError::Format("CodeWallet header truncated".to_string()));
    }
    if &bytes[..4] != MAGIC {
        return Err(KeyringError::Format("Not a CodeWallet file".to_string()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(KeyringError::Format(format!(
            "Unsupported CodeWallet version {}",
            version
        )));
    }

    let salt = &bytes[6..6 + SALT_LEN];
    let iterations = u32::from_le_bytes([bytes[14], bytes[15], bytes[16], bytes[17]]);

    Ok((
        crypto::derive_key(password, salt, iterations),
        &bytes[HEADER_SIZE..],
    ))
}

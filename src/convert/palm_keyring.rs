//! Keyring for PalmOS import
//!
//! Reads a Palm PDB container of type `Gkyr`/creator `Gtkr`. The
//! AppInfo block carries the standard PalmOS category table (16 names
//! of up to 15 characters). Record 0 holds a 4-byte salt followed by
//! MD5(salt || password) as the password check; every later record is a
//! NUL-terminated plaintext title followed by a DES-EDE3-CBC block of
//! account, password and notes separated by NUL bytes, keyed from
//! MD5(password || salt). The record attribute low nibble indexes the
//! category table.

use std::path::Path;

use log::{debug, info};

use super::{Converter, DEFAULT_IMPORT_CATEGORY};
use crate::crypto::{md5_bytes, tdes};
use crate::error::{KeyringError, Result};
use crate::model::Item;
use crate::ring::Ring;

const PDB_HEADER_SIZE: usize = 78;
const RECORD_ENTRY_SIZE: usize = 8;
const DB_TYPE: &[u8; 4] = b"Gkyr";
const DB_CREATOR: &[u8; 4] = b"Gtkr";
const CATEGORY_COUNT: usize = 16;
const CATEGORY_NAME_LEN: usize = 16;
const SALT_LEN: usize = 4;

pub struct PalmKeyringConverter;

struct RawRecord<'a> {
    category_index: usize,
    data: &'a [u8],
}

impl Converter for PalmKeyringConverter {
    fn needs_input_file_password(&self) -> bool {
        true
    }

    fn convert(&self, path: &Path, input_password: &str, output_password: &str) -> Result<Ring> {
        info!("importing PalmOS Keyring database from {}", path.display());
        let bytes = std::fs::read(path)?;

        let (categories, records) = parse_pdb(&bytes)?;
        if records.is_empty() {
            return Err(KeyringError::Format(
                "Keyring database has no key record".to_string(),
            ));
        }

        // Record 0 is the password check: salt + MD5(salt || password)
        let key_record = records[0].data;
        if key_record.len() < SALT_LEN + 16 {
            return Err(KeyringError::Format("Key record too short".to_string()));
        }
        let salt = &key_record[..SALT_LEN];
        let stored_hash = &key_record[SALT_LEN..SALT_LEN + 16];

        let mut check_input = Vec::with_capacity(SALT_LEN + input_password.len());
        check_input.extend_from_slice(salt);
        check_input.extend_from_slice(input_password.as_bytes());
        if md5_bytes(&check_input) != stored_hash {
            return Err(KeyringError::Authentication);
        }

        // Cipher key digest uses the reverse concatenation so the stored
        // check never equals the key
        let mut key_input = Vec::with_capacity(SALT_LEN + input_password.len());
        key_input.extend_from_slice(input_password.as_bytes());
        key_input.extend_from_slice(salt);
        let key = tdes::expand_key(&md5_bytes(&key_input));
        let iv = [0u8; tdes::TDES_IV_SIZE];

        let mut ring = Ring::new(output_password);

        for record in &records[1..] {
            let nul = record
                .data
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| KeyringError::Format("Record has no title terminator".to_string()))?;
            let title = String::from_utf8_lossy(&record.data[..nul]).into_owned();
            let ciphertext = &record.data[nul + 1..];

            let (username, password, notes) = if ciphertext.is_empty() {
                (String::new(), String::new(), String::new())
            } else {
                let plaintext = tdes::decrypt(ciphertext, &key, &iv)
                    .map_err(|_| KeyringError::Authentication)?;
                let mut parts = plaintext.split(|&b| b == 0);
                let mut next = || {
                    parts
                        .next()
                        .map(|p| String::from_utf8_lossy(p).into_owned())
                        .unwrap_or_default()
                };
                (next(), next(), next())
            };

            let name = categories
                .get(record.category_index)
                .filter(|n| !n.is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_IMPORT_CATEGORY.to_string());
            let category_id = ring.category_id_for_name(&name)?;

            ring.add_item(Item::new(&title, &username, &password, "", &notes, category_id))?;
        }

        debug!("imported {} items", ring.item_count());
        Ok(ring)
    }
}

/// Parse the PDB shell: header, category table, record slices
fn parse_pdb(bytes: &[u8]) -> Result<(Vec<String>, Vec<RawRecord<'_>>)> {
    if bytes.len() < PDB_HEADER_SIZE {
        return Err(KeyringError::Format("PDB header truncated".to_string()));
    }
    if &bytes[60..64] != DB_TYPE || &bytes[64..68] != DB_CREATOR {
        return Err(KeyringError::Format(
            "Not a Keyring for PalmOS database".to_string(),
        ));
    }

    let appinfo_offset =
        u32::from_be_bytes([bytes[52], bytes[53], bytes[54], bytes[55]]) as usize;
    let num_records = u16::from_be_bytes([bytes[76], bytes[77]]) as usize;

    let list_end = PDB_HEADER_SIZE + num_records * RECORD_ENTRY_SIZE;
    if bytes.len() < list_end {
        return Err(KeyringError::Format("PDB record list truncated".to_string()));
    }

    let categories = parse_categories(bytes, appinfo_offset)?;

    let mut entries = Vec::with_capacity(num_records);
    for i in 0..num_records {
        let base = PDB_HEADER_SIZE + i * RECORD_ENTRY_SIZE;
        let offset = u32::from_be_bytes([
            bytes[base],
            bytes[base + 1],
            bytes[base + 2],
            bytes[base + 3],
        ]) as usize;
        let attr = bytes[base + 4];
        entries.push((offset, (attr & 0x0f) as usize));
    }

    let mut records = Vec::with_capacity(num_records);
    for (i, &(offset, category_index)) in entries.iter().enumerate() {
        let end = if i + 1 < entries.len() {
            entries[i + 1].0
        } else {
            bytes.len()
        };
        if offset > end || end > bytes.len() {
            return Err(KeyringError::Format(format!(
                "Record {} has an invalid offset",
                i
            )));
        }
        records.push(RawRecord {
            category_index,
            data: &bytes[offset..end],
        });
    }

    Ok((categories, records))
}

/// Read the 16 category names from the standard PalmOS AppInfo block
fn parse_categories(bytes: &[u8], appinfo_offset: usize) -> Result<Vec<String>> {
    if appinfo_offset == 0 {
        return Ok(Vec::new());
    }

    // Two flag bytes precede the name table
    let table_start = appinfo_offset + 2;
    let table_end = table_start + CATEGORY_COUNT * CATEGORY_NAME_LEN;
    if table_end > bytes.len() {
        return Err(KeyringError::Format("AppInfo block truncated".to_string()));
    }

    let mut names = Vec::with_capacity(CATEGORY_COUNT);
    for i in 0..CATEGORY_COUNT {
        let start = table_start + i * CATEGORY_NAME_LEN;
        let raw = &bytes[start..start + CATEGORY_NAME_LEN];
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        names.push(String::from_utf8_lossy(&raw[..len]).into_owned());
    }
    Ok(names)
}

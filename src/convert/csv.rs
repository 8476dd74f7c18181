//! CSV import
//!
//! Plain-text import, no input-file password. Expected column order is
//! `category, title, username, password, url, notes`; trailing columns
//! may be omitted and map to empty strings. A leading header row is
//! detected and skipped. Quoted fields may contain delimiters, doubled
//! quotes and line breaks. An empty file is a valid empty ring.

use std::path::Path;

use log::{debug, info};

use super::{Converter, DEFAULT_IMPORT_CATEGORY};
use crate::error::{KeyringError, Result};
use crate::model::Item;
use crate::ring::Ring;

pub struct CsvConverter;

impl Converter for CsvConverter {
    fn needs_input_file_password(&self) -> bool {
        false
    }

    fn convert(&self, path: &Path, _input_password: &str, output_password: &str) -> Result<Ring> {
        info!("importing CSV file from {}", path.display());
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| KeyringError::Format("CSV file is not valid UTF-8".to_string()))?;

        let mut records = parse_records(&text)?;

        if let Some(first) = records.first() {
            if is_header(first) {
                records.remove(0);
            }
        }

        let mut ring = Ring::new(output_password);

        for record in records {
            let field = |i: usize| record.get(i).map(String::as_str).unwrap_or("");

            let category = if field(0).is_empty() {
                DEFAULT_IMPORT_CATEGORY
            } else {
                field(0)
            };
            let category_id = ring.category_id_for_name(category)?;

            ring.add_item(Item::new(
                field(1),
                field(2),
                field(3),
                field(4),
                field(5),
                category_id,
            ))?;
        }

        debug!("imported {} items", ring.item_count());
        Ok(ring)
    }
}

fn is_header(record: &[String]) -> bool {
    record.len() >= 2
        && record[0].eq_ignore_ascii_case("category")
        && record[1].eq_ignore_ascii_case("title")
}

/// Quote-aware CSV record parser; fields may span physical lines
fn parse_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    end_record(&mut records, &mut record, &mut field);
                }
                '\n' => end_record(&mut records, &mut record, &mut field),
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err(KeyringError::Format(
            "Unterminated quoted field in CSV".to_string(),
        ));
    }
    end_record(&mut records, &mut record, &mut field);

    Ok(records)
}

fn end_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    // A blank line is no record at all
    if record.is_empty() && field.is_empty() {
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}

//! CSV export
//!
//! One headerless row per item, fixed column order: category, title,
//! username, password, url, notes, created, changed, viewed. Fields
//! containing the delimiter, a quote or a newline are quoted with
//! doubled inner quotes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use super::Ring;
use crate::error::Result;

/// Quote a field when it contains a delimiter, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl Ring {
    /// Write all items to a CSV file at `path`
    pub fn export_to_csv(&self, path: &Path) -> Result<()> {
        let items = self.items()?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for item in items {
            let category = self.category_name(item.category_id).unwrap_or("");
            let row = [
                csv_field(category),
                csv_field(&item.title),
                csv_field(&item.username),
                csv_field(&item.password),
                csv_field(&item.url),
                csv_field(&item.notes),
                Ring::format_date(&item.created, true),
                Ring::format_date(&item.changed, true),
                Ring::format_date(&item.viewed, true),
            ];
            writeln!(writer, "{}", row.join(","))?;
        }

        writer.flush()?;
        info!("exported {} items to {}", items.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::populated_ring;
    use super::*;
    use crate::model::Item;
    use tempfile::TempDir;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("with,comma"), "\"with,comma\"");
        assert_eq!(csv_field("with \"quote\""), "\"with \"\"quote\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn test_export_row_per_item() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.csv");

        let ring = populated_ring("master");
        ring.export_to_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), ring.item_count());

        // Passwords appear verbatim
        assert!(content.contains("s3cret"));
        assert!(content.contains("hunter2"));
        // Category name leads each row
        assert!(rows[0].starts_with("Banking,Bank,alice,s3cret,"));
    }

    #[test]
    fn test_export_quotes_delimiters() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.csv");

        let mut ring = crate::ring::Ring::new("pw");
        let id = ring.category_id_for_name("Misc").unwrap();
        ring.add_item(Item::new("Title, with comma", "user", "pw,1", "", "note\nline", id))
            .unwrap();
        ring.export_to_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Title, with comma\""));
        assert!(content.contains("\"pw,1\""));
        assert!(content.contains("\"note\nline\""));
    }

    #[test]
    fn test_export_empty_ring() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.csv");

        let ring = crate::ring::Ring::new("pw");
        ring.export_to_csv(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_export_locked_ring_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.csv");

        let mut ring = populated_ring("master");
        ring.lock();
        assert!(ring.export_to_csv(&path).is_err());
    }
}

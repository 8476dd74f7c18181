//! Caller preferences
//!
//! Thin persistence helper for the settings the GUI feeds back into the
//! core (timeout duration, save behavior). The core itself only reads
//! these as plain values; nothing here is security sensitive.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default session timeout in seconds
pub const DEFAULT_PASSWORD_TIMEOUT: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// URL offered when loading from or saving to a remote location
    pub default_url: String,
    /// Inactivity window before the session lock trips
    pub password_timeout_seconds: u64,
    /// Ask before removing an item
    pub confirm_deletion: bool,
    /// Notify after every save operation
    pub inform_about_each_save: bool,
    /// Prune categories without items at save time
    pub delete_empty_categories: bool,
    /// Allow copying passwords to the clipboard
    pub allow_password_clipboard_copy: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_url: String::new(),
            password_timeout_seconds: DEFAULT_PASSWORD_TIMEOUT,
            confirm_deletion: true,
            inform_about_each_save: true,
            delete_empty_categories: false,
            allow_password_clipboard_copy: false,
        }
    }
}

impl Preferences {
    /// Load preferences; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save preferences as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.password_timeout_seconds, 60);
        assert!(prefs.confirm_deletion);
        assert!(prefs.inform_about_each_save);
        assert!(!prefs.delete_empty_categories);
        assert!(!prefs.allow_password_clipboard_copy);
        assert_eq!(prefs.default_url, "");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let prefs = Preferences::load(&temp.path().join("missing.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");

        let mut prefs = Preferences::default();
        prefs.default_url = "https://vault.example/keyring.dat".to_string();
        prefs.password_timeout_seconds = 120;
        prefs.delete_empty_categories = true;

        prefs.save(&path).unwrap();
        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");
        std::fs::write(&path, r#"{"password_timeout_seconds": 300}"#).unwrap();

        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.password_timeout_seconds, 300);
        assert!(prefs.confirm_deletion);
    }
}

//! Legacy wallet importers
//!
//! One converter per supported foreign format. Each parses its
//! container, decrypts it with the input-file password where the format
//! is encrypted, and rebuilds the records as a fresh authenticated ring
//! keyed from the output password. The format set is closed; dispatch is
//! by explicit tag.

pub mod codewallet;
pub mod csv;
pub mod ewallet;
pub mod palm_keyring;

use std::path::Path;

use crate::error::{KeyringError, Result};
use crate::ring::Ring;

pub use codewallet::CodeWalletConverter;
pub use csv::CsvConverter;
pub use ewallet::EWalletConverter;
pub use palm_keyring::PalmKeyringConverter;

/// Category name assigned to records that carry none
pub const DEFAULT_IMPORT_CATEGORY: &str = "Imported";

/// A format-specific importer
pub trait Converter {
    /// Whether `convert` needs a password for the input file
    fn needs_input_file_password(&self) -> bool;

    /// Parse `path` and build a new authenticated ring keyed from
    /// `output_password`
    fn convert(&self, path: &Path, input_password: &str, output_password: &str) -> Result<Ring>;
}

/// The closed set of supported import formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    PalmKeyring,
    CodeWallet,
    EWallet,
    Csv,
}

impl Format {
    /// Decode a type selector; unknown selectors fail before any file
    /// I/O is attempted.
    pub fn from_selector(selector: &str) -> Result<Self> {
        match selector {
            "keyring" => Ok(Format::PalmKeyring),
            "codewallet" => Ok(Format::CodeWallet),
            "ewallet" => Ok(Format::EWallet),
            "csv" => Ok(Format::Csv),
            other => Err(KeyringError::Conversion(format!(
                "Unknown/unsupported conversion type '{}'",
                other
            ))),
        }
    }

    pub fn needs_input_file_password(&self) -> bool {
        self.converter().needs_input_file_password()
    }

    pub fn converter(&self) -> Box<dyn Converter> {
        match self {
            Format::PalmKeyring => Box::new(PalmKeyringConverter),
            Format::CodeWallet => Box::new(CodeWalletConverter),
            Format::EWallet => Box::new(EWalletConverter),
            Format::Csv => Box::new(CsvConverter),
        }
    }
}

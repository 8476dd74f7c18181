//! Error types for Keyring Desktop Core

use thiserror::Error;

/// Main error type for ring and converter operations
#[derive(Error, Debug)]
pub enum KeyringError {
    /// Wrong password, or an integrity check failed during decryption
    #[error("Authentication failed")]
    Authentication,

    /// Unrecognized, corrupt or unsupported container or record shape
    #[error("Format error: {0}")]
    Format(String),

    /// Converter-specific structural failure inside an otherwise valid container
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Ring is locked, authentication required before operation
    #[error("Ring is locked")]
    Locked,

    /// Encryption of the payload failed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failure while reading or writing a remote location
    #[error("Transfer error: {0}")]
    Transfer(String),
}

impl From<reqwest::Error> for KeyringError {
    fn from(err: reqwest::Error) -> Self {
        KeyringError::Transfer(err.to_string())
    }
}

impl From<serde_json::Error> for KeyringError {
    fn from(err: serde_json::Error) -> Self {
        KeyringError::Format(err.to_string())
    }
}

/// Result type alias for ring operations
pub type Result<T> = std::result::Result<T, KeyringError>;

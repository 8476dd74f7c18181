//! Store location abstraction
//!
//! A ring lives either in a local file or behind an HTTP(S) URL. Local
//! writes go through a temp file in the target directory and an atomic
//! rename so a failed save never clobbers the previous container.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{KeyringError, Result};

/// Where a ring container is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Path(PathBuf),
    Url(String),
}

impl Location {
    /// Classify a location string; anything starting with http:// or
    /// https:// is remote, everything else is a filesystem path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Location::Url(location.to_string())
        } else {
            Location::Path(PathBuf::from(location))
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Location::Path(path.to_path_buf())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Read the full container bytes
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            Location::Path(path) => {
                debug!("reading container from {}", path.display());
                Ok(std::fs::read(path)?)
            }
            Location::Url(url) => {
                debug!("fetching container from {}", url);
                let response = reqwest::blocking::get(url)?;
                if !response.status().is_success() {
                    return Err(KeyringError::Transfer(format!(
                        "GET {} returned {}",
                        url,
                        response.status()
                    )));
                }
                Ok(response.bytes()?.to_vec())
            }
        }
    }

    /// Write the full container bytes
    ///
    /// Local paths are written to a temporary file first and renamed into
    /// place; a half-written file is never visible under the final name.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        match self {
            Location::Path(path) => {
                debug!("writing container to {}", path.display());
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
                tmp.write_all(bytes)?;
                tmp.flush()?;
                tmp.persist(path).map_err(|e| KeyringError::Io(e.error))?;
                Ok(())
            }
            Location::Url(url) => {
                debug!("uploading container to {}", url);
                let client = reqwest::blocking::Client::new();
                let response = client.put(url).body(bytes.to_vec()).send()?;
                if !response.status().is_success() {
                    return Err(KeyringError::Transfer(format!(
                        "PUT {} returned {}",
                        url,
                        response.status()
                    )));
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{}", url),
        }
    }
}

//! # Keyring Desktop Core
//!
//! The non-presentational engine of a personal credential vault:
//! an encrypted, file- or URL-backed store of secret records organized
//! into named categories, protected by a master password, with a
//! session-lock timeout.
//!
//! ## Features
//!
//! - AES-256-CBC encrypted container with salted, iterated key derivation
//! - Local file and HTTP(S) URL backed storage with atomic local saves
//! - Category registry with stable ids and save-time pruning
//! - Import of legacy wallets: PalmOS Keyring, CodeWallet, eWallet, CSV
//! - Background session-lock timeout with autonomous expiry
//! - CSV export
//!
//! ## Example
//!
//! ```no_run
//! use krcore::{Location, Ring};
//!
//! let location = Location::parse("/home/user/keyring.dat");
//! let ring = Ring::load(&location, "master password").unwrap();
//! for item in ring.items().unwrap() {
//!     println!("{}: {}", item.title, item.username);
//! }
//! ```

pub mod convert;
pub mod crypto;
pub mod error;
pub mod model;
pub mod prefs;
pub mod ring;
pub mod session;
pub mod utils;

// Re-export main types
pub use convert::{Converter, Format};
pub use error::{KeyringError, Result};
pub use model::{Category, CategoryRegistry, Item};
pub use prefs::Preferences;
pub use ring::{Location, Ring};
pub use session::{SessionLock, SessionState};

/// Native container format version
pub const CONTAINER_VERSION: u16 = ring::container::FORMAT_VERSION;

/// Default key-derivation iteration count for new containers
pub const KDF_ITERATIONS_DEFAULT: u32 = ring::container::DEFAULT_ITERATIONS;

/// Default database filename
pub const DATABASE_FILENAME: &str = "keyring.dat";

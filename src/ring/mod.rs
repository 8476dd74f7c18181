//! The encrypted store
//!
//! A `Ring` owns the item set and the category registry, and is either
//! unauthenticated (no key material, items unreadable) or authenticated
//! (key retained for the session). Loading is all-or-nothing; saving
//! re-encrypts under the session key and replaces the container
//! atomically.

pub mod container;
mod csv;
pub mod location;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::crypto::{self, KEY_LENGTH};
use crate::error::{KeyringError, Result};
use crate::model::{CategoryRegistry, Item};
use crate::utils::{DATE_FORMAT, DATE_TIME_FORMAT};

pub use container::{ContainerHeader, Payload, DEFAULT_ITERATIONS};
pub use location::Location;

use container::SALT_SIZE;

/// The encrypted credential store
pub struct Ring {
    items: Vec<Item>,
    categories: CategoryRegistry,
    /// Session key; present only while authenticated
    key: Option<[u8; KEY_LENGTH]>,
    /// Key-check for the current password, kept so a locked ring can be
    /// re-validated without re-reading the container
    key_check: [u8; 32],
    salt: [u8; SALT_SIZE],
    iterations: u32,
    location: Option<Location>,
}

impl Ring {
    /// Create a fresh, empty, authenticated ring keyed from `password`
    ///
    /// This is the constructor used for new vaults and by converters.
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; SALT_SIZE];
        crate::utils::random_bytes(&mut salt);

        let key = crypto::derive_key(password, &salt, DEFAULT_ITERATIONS);
        let key_check = crypto::key_check(&key, &salt);

        Self {
            items: Vec::new(),
            categories: CategoryRegistry::new(),
            key: Some(key),
            key_check,
            salt,
            iterations: DEFAULT_ITERATIONS,
            location: None,
        }
    }

    /// Load and decrypt a ring from a location
    ///
    /// All-or-nothing: any failure leaves no partially populated ring
    /// behind. Errors map to `Io`/`Transfer` (unreachable), `Format`
    /// (not a recognized container) and `Authentication` (wrong
    /// password or corrupt payload).
    pub fn load(location: &Location, password: &str) -> Result<Ring> {
        info!("loading ring from {}", location);
        let bytes = location.read()?;

        let (header, ciphertext) = ContainerHeader::parse(&bytes)?;

        let key = header
            .check_password(password)
            .ok_or(KeyringError::Authentication)?;

        let payload = container::open(ciphertext, &key, &header)?;

        // Category references must be resolvable before the ring is handed out
        for item in &payload.items {
            if !payload.categories.contains_id(item.category_id) {
                return Err(KeyringError::Format(format!(
                    "Item '{}' references unknown category {}",
                    item.title, item.category_id
                )));
            }
        }

        debug!(
            "loaded {} items, {} categories",
            payload.items.len(),
            payload.categories.len()
        );

        Ok(Ring {
            items: payload.items,
            categories: payload.categories,
            key: Some(key),
            key_check: header.key_check,
            salt: header.salt,
            iterations: header.iterations,
            location: Some(location.clone()),
        })
    }

    /// Verify a candidate password against the ring's key-check
    ///
    /// On success the ring becomes (or stays) authenticated with the
    /// derived key retained; on failure nothing changes.
    pub fn validate_password(&mut self, candidate: &str) -> bool {
        let key = crypto::derive_key(candidate, &self.salt, self.iterations);
        if crypto::key_check(&key, &self.salt) == self.key_check {
            self.key = Some(key);
            true
        } else {
            false
        }
    }

    /// Serialize, encrypt and write the ring to a location
    ///
    /// A fresh IV is generated for every save; the salt and session key
    /// are unchanged. With `delete_empty_categories` set, categories
    /// with no referencing item are pruned from the persisted registry
    /// only - the in-memory registry is untouched.
    pub fn save(&self, location: &Location, delete_empty_categories: bool) -> Result<()> {
        let key = self.key.as_ref().ok_or(KeyringError::Locked)?;

        let mut categories = self.categories.clone();
        if delete_empty_categories {
            let in_use: HashSet<u16> = self.items.iter().map(|i| i.category_id).collect();
            categories.remove_empty(&in_use);
        }

        let payload = Payload {
            categories,
            items: self.items.clone(),
        };

        let mut header = ContainerHeader::generate(self.iterations, self.key_check);
        header.salt = self.salt;

        let bytes = container::seal(&payload, key, &header)?;
        location.write(&bytes)?;

        info!("saved {} items to {}", self.items.len(), location);
        Ok(())
    }

    /// Add an item; its category id must already be registered
    pub fn add_item(&mut self, item: Item) -> Result<()> {
        self.ensure_authenticated()?;

        if !self.categories.contains_id(item.category_id) {
            return Err(KeyringError::Format(format!(
                "Category id {} is not registered",
                item.category_id
            )));
        }

        self.items.push(item);
        Ok(())
    }

    /// Remove and return the item at `index`
    ///
    /// The item's category stays registered even if now empty; pruning
    /// happens only at save time.
    pub fn remove_item(&mut self, index: usize) -> Result<Item> {
        self.ensure_authenticated()?;

        if index >= self.items.len() {
            return Err(KeyringError::Format(format!(
                "No item at index {}",
                index
            )));
        }

        Ok(self.items.remove(index))
    }

    /// Get the id for a category name, creating it on first use
    pub fn category_id_for_name(&mut self, name: &str) -> Result<u16> {
        self.ensure_authenticated()?;
        Ok(self.categories.id_for_name(name))
    }

    /// Category names in creation order (the "All" filter is a caller
    /// concern and never stored)
    pub fn get_categories(&self) -> Vec<String> {
        self.categories.names()
    }

    pub fn category_name(&self, id: u16) -> Option<&str> {
        self.categories.name_for_id(id)
    }

    /// Read access to the items; requires an authenticated ring
    pub fn items(&self) -> Result<&[Item]> {
        self.ensure_authenticated()?;
        Ok(&self.items)
    }

    /// Mutable access to one item; requires an authenticated ring
    pub fn item_mut(&mut self, index: usize) -> Result<&mut Item> {
        self.ensure_authenticated()?;
        self.items
            .get_mut(index)
            .ok_or_else(|| KeyringError::Format(format!("No item at index {}", index)))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_authenticated(&self) -> bool {
        self.key.is_some()
    }

    /// Drop the session key; items stay in memory but become unreadable
    /// until the password is validated again
    pub fn lock(&mut self) {
        if let Some(mut key) = self.key.take() {
            crypto::wipe_key(&mut key);
        }
        debug!("ring locked");
    }

    /// Lock and discard all in-memory state
    pub fn close(&mut self) {
        self.lock();
        self.items.clear();
        self.categories = CategoryRegistry::new();
        self.location = None;
    }

    /// The location this ring was loaded from, if any
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Pure date formatting helper shared by the CSV export and callers
    pub fn format_date(ts: &DateTime<Utc>, with_time: bool) -> String {
        if with_time {
            ts.format(DATE_TIME_FORMAT).to_string()
        } else {
            ts.format(DATE_FORMAT).to_string()
        }
    }

    pub(crate) fn ensure_authenticated(&self) -> Result<()> {
        if self.key.is_none() {
            return Err(KeyringError::Locked);
        }
        Ok(())
    }
}

impl Drop for Ring {
    fn drop(&mut self) {
        self.lock();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    pub fn populated_ring(password: &str) -> Ring {
        let mut ring = Ring::new(password);
        let banking = ring.category_id_for_name("Banking").unwrap();
        let web = ring.category_id_for_name("Web").unwrap();

        ring.add_item(Item::new("Bank", "alice", "s3cret", "https://bank.example", "main", banking))
            .unwrap();
        ring.add_item(Item::new("Forum", "bob", "hunter2", "https://forum.example", "", web))
            .unwrap();
        ring
    }

    #[test]
    fn test_new_ring_is_authenticated_and_empty() {
        let ring = Ring::new("pw");
        assert!(ring.is_authenticated());
        assert_eq!(ring.item_count(), 0);
        assert!(ring.get_categories().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let loc = Location::from_path(&temp.path().join("keyring.dat"));

        let ring = populated_ring("master");
        ring.save(&loc, false).unwrap();

        let loaded = Ring::load(&loc, "master").unwrap();
        assert_eq!(loaded.items().unwrap(), ring.items().unwrap());
        assert_eq!(loaded.get_categories(), ring.get_categories());
    }

    #[test]
    fn test_load_wrong_password() {
        let temp = TempDir::new().unwrap();
        let loc = Location::from_path(&temp.path().join("keyring.dat"));
        populated_ring("master").save(&loc, false).unwrap();

        assert!(matches!(
            Ring::load(&loc, "not-master"),
            Err(KeyringError::Authentication)
        ));
    }

    #[test]
    fn test_load_garbage_is_format_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("garbage.dat");
        std::fs::write(&path, b"this is not a container").unwrap();

        assert!(matches!(
            Ring::load(&Location::from_path(&path), "pw"),
            Err(KeyringError::Format(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let loc = Location::parse("/nonexistent/keyring.dat");
        assert!(matches!(Ring::load(&loc, "pw"), Err(KeyringError::Io(_))));
    }

    #[test]
    fn test_validate_password() {
        let mut ring = populated_ring("master");
        assert!(ring.validate_password("master"));
        assert!(!ring.validate_password("wrong"));
        // Failed validation must not deauthenticate
        assert!(ring.is_authenticated());
    }

    #[test]
    fn test_lock_and_revalidate() {
        let mut ring = populated_ring("master");
        ring.lock();

        assert!(!ring.is_authenticated());
        assert!(matches!(ring.items(), Err(KeyringError::Locked)));
        assert!(matches!(
            ring.add_item(Item::new("x", "", "", "", "", 0)),
            Err(KeyringError::Locked)
        ));

        assert!(ring.validate_password("master"));
        assert!(ring.is_authenticated());
        assert_eq!(ring.items().unwrap().len(), 2);
    }

    #[test]
    fn test_add_item_unknown_category() {
        let mut ring = Ring::new("pw");
        let result = ring.add_item(Item::new("x", "", "", "", "", 42));
        assert!(matches!(result, Err(KeyringError::Format(_))));
    }

    #[test]
    fn test_remove_item_keeps_category() {
        let mut ring = populated_ring("master");
        let removed = ring.remove_item(0).unwrap();
        assert_eq!(removed.title, "Bank");
        assert_eq!(ring.item_count(), 1);
        // Banking is now empty but must survive until a pruning save
        assert!(ring.get_categories().contains(&"Banking".to_string()));
    }

    #[test]
    fn test_remove_item_bad_index() {
        let mut ring = populated_ring("master");
        assert!(ring.remove_item(10).is_err());
    }

    #[test]
    fn test_save_prunes_empty_categories_when_asked() {
        let temp = TempDir::new().unwrap();
        let loc = Location::from_path(&temp.path().join("keyring.dat"));

        let mut ring = populated_ring("master");
        ring.category_id_for_name("Empty").unwrap();

        ring.save(&loc, true).unwrap();

        // In-memory registry is untouched
        assert!(ring.get_categories().contains(&"Empty".to_string()));

        let loaded = Ring::load(&loc, "master").unwrap();
        assert!(!loaded.get_categories().contains(&"Empty".to_string()));
        assert!(loaded.get_categories().contains(&"Banking".to_string()));
    }

    #[test]
    fn test_save_keeps_empty_categories_by_default() {
        let temp = TempDir::new().unwrap();
        let loc = Location::from_path(&temp.path().join("keyring.dat"));

        let mut ring = populated_ring("master");
        ring.category_id_for_name("Empty").unwrap();
        ring.save(&loc, false).unwrap();

        let loaded = Ring::load(&loc, "master").unwrap();
        assert!(loaded.get_categories().contains(&"Empty".to_string()));
    }

    #[test]
    fn test_save_while_locked_fails() {
        let temp = TempDir::new().unwrap();
        let loc = Location::from_path(&temp.path().join("keyring.dat"));

        let mut ring = populated_ring("master");
        ring.lock();
        assert!(matches!(ring.save(&loc, false), Err(KeyringError::Locked)));
    }

    #[test]
    fn test_failed_save_preserves_previous_container() {
        let temp = TempDir::new().unwrap();
        let loc = Location::from_path(&temp.path().join("keyring.dat"));

        populated_ring("master").save(&loc, false).unwrap();

        // Writing into a directory that does not exist must fail without
        // touching the original file
        let bad = Location::parse("/nonexistent/dir/keyring.dat");
        assert!(populated_ring("other").save(&bad, false).is_err());

        assert!(Ring::load(&loc, "master").is_ok());
    }

    #[test]
    fn test_close_clears_everything() {
        let mut ring = populated_ring("master");
        ring.close();
        assert!(!ring.is_authenticated());
        assert_eq!(ring.item_count(), 0);
        assert!(ring.get_categories().is_empty());
    }

    #[test]
    fn test_format_date() {
        let ts = Utc.with_ymd_and_hms(2010, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(Ring::format_date(&ts, false), "2010-03-14");
        assert_eq!(Ring::format_date(&ts, true), "2010-03-14 15:09:26");
    }
}

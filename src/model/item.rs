//! Credential record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single credential record owned by a Ring
///
/// Timestamps are bookkeeping: `changed` moves on every field mutation,
/// `viewed` only when the caller explicitly displays the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    /// Id of the owning category in the ring's registry
    pub category_id: u16,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
    pub viewed: DateTime<Utc>,
}

impl Item {
    /// Create a new item; all three timestamps start at now
    pub fn new(title: &str, username: &str, password: &str, url: &str, notes: &str, category_id: u16) -> Self {
        let now = Utc::now();
        Self {
            title: title.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            url: url.to_string(),
            notes: notes.to_string(),
            category_id,
            created: now,
            changed: now,
            viewed: now,
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.touch_changed();
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = username.to_string();
        self.touch_changed();
    }

    pub fn set_password(&mut self, password: &str) {
        self.password = password.to_string();
        self.touch_changed();
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
        self.touch_changed();
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
        self.touch_changed();
    }

    pub fn set_category_id(&mut self, category_id: u16) {
        self.category_id = category_id;
        self.touch_changed();
    }

    /// Record that the item was displayed to the user
    pub fn touch_viewed(&mut self) {
        self.viewed = Utc::now();
    }

    fn touch_changed(&mut self) {
        self.changed = Utc::now();
    }
}

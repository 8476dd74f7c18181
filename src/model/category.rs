//! Category registry
//!
//! Bidirectional name/id mapping owned by the ring. Ids are small stable
//! integers allocated once and never reused while referenced. The "All"
//! filter is a view-layer concern and is not stored here.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One persisted category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u16,
    pub name: String,
}

/// Arena of (id, name) pairs with a stable id allocator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    next_id: u16,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the id for a name, creating the category on first use
    ///
    /// Names are case-sensitive and unique; repeated calls with the same
    /// name return the same id.
    pub fn id_for_name(&mut self, name: &str) -> u16 {
        if let Some(cat) = self.categories.iter().find(|c| c.name == name) {
            return cat.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn name_for_id(&self, id: u16) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    pub fn contains_id(&self, id: u16) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    /// Category names in id (creation) order
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Drop every category whose id is not in `in_use`
    ///
    /// Called only from `Ring::save` when the delete-empty-categories
    /// flag is set. The allocator position is kept so pruned ids are
    /// never handed out again.
    pub fn remove_empty(&mut self, in_use: &HashSet<u16>) {
        self.categories.retain(|c| in_use.contains(&c.id));
    }
}

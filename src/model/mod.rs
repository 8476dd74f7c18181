//! Data model: items and the category registry

pub mod category;
pub mod item;

pub use category::{Category, CategoryRegistry};
pub use item::Item;

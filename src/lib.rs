//! An ordered key-value index implemented with an AVL tree.
//!
//! [`AvlTreeMap`] keeps its nodes balanced after every insertion, so both
//! [`insert`](AvlTreeMap::insert) and [`search`](AvlTreeMap::search) are
//! O(log n) in the number of stored keys, also for keys that arrive in sorted order.
//!
//! ```
//! use avl_index::AvlTreeMap;
//! let mut catalog = AvlTreeMap::new();
//! catalog.insert(String::from("Introduction to Algorithms"), "978-0262046305");
//! catalog.insert(String::from("The C Programming Language"), "978-0131103627");
//! assert_eq!(catalog.search("Introduction to Algorithms"), Some(&"978-0262046305"));
//! assert_eq!(catalog.search("Nonexistent"), None);
//! ```
//!
//! Entries are never removed individually and an insert never replaces the
//! value of a key that is already present.
//!
//! The map itself is not synchronized. With the `shared` feature (on by
//! default), [`SharedAvlTreeMap`] wraps it in a readers-writer lock.

mod error;
mod index;
pub mod map;
#[cfg(feature = "shared")]
mod shared;

pub use error::{ConsistencyError, Result};
pub use index::SearchIndex;
pub use map::AvlTreeMap;
#[cfg(feature = "shared")]
pub use shared::SharedAvlTreeMap;

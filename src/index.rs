//! The insert/search contract shared by the catalog containers.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::AvlTreeMap;

/// A keyed store that can stand in for any other one.
///
/// `insert` never overwrites: a key that is already present keeps its value
/// and the call returns false. `search` returns `None` for unknown keys.
pub trait SearchIndex<K, V> {
    fn insert(&mut self, key: K, value: V) -> bool;

    /// Takes `&K` rather than a `Borrow<Q>` form so the trait stays object safe.
    /// Use [`AvlTreeMap::search`] directly to look up `String` keys by `&str`.
    fn search(&self, key: &K) -> Option<&V>;
}

impl<K: Ord, V> SearchIndex<K, V> for AvlTreeMap<K, V> {
    fn insert(&mut self, key: K, value: V) -> bool {
        AvlTreeMap::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        AvlTreeMap::search(self, key)
    }
}

impl<K: Ord, V> SearchIndex<K, V> for BTreeMap<K, V> {
    fn insert(&mut self, key: K, value: V) -> bool {
        use std::collections::btree_map::Entry;
        match self.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    fn search(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> SearchIndex<K, V> for HashMap<K, V, S> {
    fn insert(&mut self, key: K, value: V) -> bool {
        use std::collections::hash_map::Entry;
        match self.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    fn search(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

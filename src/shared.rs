//! A map that can be shared between threads.

use std::borrow::Borrow;
use std::fmt;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::AvlTreeMap;

/// An [`AvlTreeMap`] behind a single readers-writer lock.
///
/// Inserts take the lock exclusively for the whole descent and rebalance,
/// so readers never observe a tree in the middle of a rotation.
/// Lookups take it shared and may run in parallel with each other.
///
/// ```
/// use avl_index::SharedAvlTreeMap;
/// let map = SharedAvlTreeMap::new();
/// std::thread::scope(|scope| {
///     scope.spawn(|| map.insert(1, "one"));
///     scope.spawn(|| map.insert(2, "two"));
/// });
/// assert_eq!(map.search_cloned(&2), Some("two"));
/// ```
pub struct SharedAvlTreeMap<K, V> {
    tree: RwLock<AvlTreeMap<K, V>>,
}

impl<K: Ord, V> SharedAvlTreeMap<K, V> {
    /// Inserts a key-value pair, see [`AvlTreeMap::insert`].
    pub fn insert(&self, key: K, value: V) -> bool {
        self.tree.write().insert(key, value)
    }

    /// Returns a copy of the value corresponding to the key.
    pub fn search_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.tree.read().search(key).cloned()
    }

    /// Calls `f` with the value corresponding to the key while holding the read lock.
    pub fn with_value<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.tree.read().search(key).map(f)
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.read().contains_key(key)
    }
}

impl<K, V> SharedAvlTreeMap<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::from(AvlTreeMap::new())
    }

    /// Locks the map for reading until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, AvlTreeMap<K, V>> {
        self.tree.read()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// Returns the height of the tree, 0 for an empty map.
    pub fn height(&self) -> usize {
        self.tree.read().height()
    }

    /// Unwraps the inner map.
    pub fn into_inner(self) -> AvlTreeMap<K, V> {
        self.tree.into_inner()
    }
}

impl<K, V> From<AvlTreeMap<K, V>> for SharedAvlTreeMap<K, V> {
    fn from(tree: AvlTreeMap<K, V>) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }
}

impl<K, V> Default for SharedAvlTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SharedAvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedAvlTreeMap")
            .field("tree", &*self.tree.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SharedAvlTreeMap;

    const THREADS: u32 = 4;
    const PER_THREAD: u32 = 2_500;

    #[test]
    fn test_concurrent_insert() {
        let map = SharedAvlTreeMap::new();
        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let map = &map;
                scope.spawn(move || {
                    for i in 0..PER_THREAD {
                        assert!(map.insert(i * THREADS + t, t));
                    }
                });
            }
        });
        assert_eq!(map.len(), (THREADS * PER_THREAD) as usize);

        let tree = map.into_inner();
        assert_eq!(tree.check_consistency(), Ok(()));
        for (key, thread) in &tree {
            assert_eq!(key % THREADS, *thread);
        }
    }

    #[test]
    fn test_readers_with_writer() {
        let map = SharedAvlTreeMap::new();
        for i in 0..1_000u32 {
            map.insert(i, i.to_string());
        }

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 1_000..2_000u32 {
                    map.insert(i, i.to_string());
                    map.read().check_consistency().unwrap();
                }
            });
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for i in 0..1_000u32 {
                        assert_eq!(map.search_cloned(&i), Some(i.to_string()));
                        assert_eq!(map.with_value(&i, String::len), Some(i.to_string().len()));
                    }
                });
            }
        });

        assert_eq!(map.len(), 2_000);
        assert!(map.contains_key(&1_999));
        assert!(!map.contains_key(&2_000));
        assert!(!map.insert(0, String::from("zero")));
        assert_eq!(map.search_cloned(&0).as_deref(), Some("0"));
    }
}

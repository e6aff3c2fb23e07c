//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::collections::VecDeque;
use std::fmt;

use log::trace;

use crate::error::{ConsistencyError, Result};

/// An ordered map implemented with an AVL tree.
///
/// Inserting a key that is already present leaves the stored value untouched,
/// the first write wins.
///
/// ```
/// use avl_index::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(1, "uno");
/// assert_eq!(map.search(&1), Some(&"one"));
/// assert!(map.search(&2).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    root: Link<K, V>,
    num_nodes: usize,
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    height: usize,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

/// Where a new node was placed, seen from the subtree root that descended to it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Descent {
    Here,
    Left,
    Right,
}

/// An iterator over the entries of a map, sorted by key.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

/// An iterator over the keys of a map, in order.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

/// An iterator over the values of a map, in key order.
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

/// An owning iterator over the entries of a map, sorted by key.
pub struct IntoIter<K, V> {
    stack: Vec<Box<Node<K, V>>>,
    remaining: usize,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| &node.value)
    }

    /// Looks up the value stored under the key.
    /// `None` means the key was never inserted.
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| (&node.key, &node.value))
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    /// Returns false, leaving the stored value as is, if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let (root, inserted) = Self::insert_node(self.root.take(), key, value);
        self.root = Some(root);
        if inserted.is_some() {
            self.num_nodes += 1;
        } else {
            trace!("ignored insert of duplicate key");
        }

        #[cfg(feature = "consistency_check")]
        if let Err(err) = self.check_consistency() {
            panic!("inconsistent AVL tree after insert: {err}");
        }

        inserted.is_some()
    }

    /// Verifies every structural invariant of the tree:
    /// key order, cached heights, AVL balance and the node count.
    pub fn check_consistency(&self) -> Result<()> {
        let mut counted = 0;
        Self::check_subtree(&self.root, None, None, 0, &mut counted)?;
        if counted != self.num_nodes {
            return Err(ConsistencyError::LengthMismatch {
                recorded: self.num_nodes,
                counted,
            });
        }
        Ok(())
    }

    fn find<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            }
        }
        current
    }

    // Takes ownership of a subtree, inserts into it and hands back its (possibly new) root.
    // The descent is None if the key was already present.
    fn insert_node(link: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, Option<Descent>) {
        let mut node = match link {
            None => return (Node::create(key, value), Some(Descent::Here)),
            Some(node) => node,
        };

        let (descent, below) = match key.cmp(&node.key) {
            Ordering::Equal => return (node, None),
            Ordering::Less => {
                let (left, below) = Self::insert_node(node.left.take(), key, value);
                node.left = Some(left);
                (Descent::Left, below)
            }
            Ordering::Greater => {
                let (right, below) = Self::insert_node(node.right.take(), key, value);
                node.right = Some(right);
                (Descent::Right, below)
            }
        };

        match below {
            None => (node, None),
            Some(below) => (Self::rebalance_node(node, below), Some(descent)),
        }
    }

    fn check_subtree(
        link: &Link<K, V>,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        counted: &mut usize,
    ) -> Result<usize> {
        let node = match link {
            None => return Ok(0),
            Some(node) => node,
        };

        if lower.map_or(false, |lower| node.key <= *lower)
            || upper.map_or(false, |upper| node.key >= *upper)
        {
            return Err(ConsistencyError::Unordered { depth });
        }

        let left = Self::check_subtree(&node.left, lower, Some(&node.key), depth + 1, counted)?;
        let right = Self::check_subtree(&node.right, Some(&node.key), upper, depth + 1, counted)?;

        let computed = 1 + cmp::max(left, right);
        if node.height != computed {
            return Err(ConsistencyError::HeightMismatch {
                depth,
                recorded: node.height,
                computed,
            });
        }

        // Check AVL condition (nearly balance)
        if left > right + 1 || right > left + 1 {
            return Err(ConsistencyError::Unbalanced { depth, left, right });
        }

        *counted += 1;
        Ok(computed)
    }
}

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of nodes on the longest root-to-leaf path, 0 for an empty map.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::with_capacity(self.height()),
            remaining: self.num_nodes,
        };
        iter.push_left_edge(self.root.as_deref());
        iter
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { iter: self.iter() }
    }

    /// Visits all entries breadth first, starting at the root.
    pub fn traverse_level_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut queue = VecDeque::new();
        queue.extend(self.root.as_deref());
        while let Some(node) = queue.pop_front() {
            f(&node.key, &node.value);
            queue.extend(node.left.as_deref());
            queue.extend(node.right.as_deref());
        }
    }

    /// Restores the AVL condition at the given subtree root after an insert below it
    /// and returns the root of the rebalanced subtree.
    /// The descent tells on which side of the heavy child the new node went,
    /// which separates the single from the double rotation cases.
    fn rebalance_node(mut node: Box<Node<K, V>>, below: Descent) -> Box<Node<K, V>> {
        node.adjust_height();
        let balance = node.balance_factor();
        debug_assert!((-2..=2).contains(&balance));

        match (balance, below) {
            (2.., Descent::Left) => {
                trace!("left-left rotation at height {}", node.height);
                Self::rotate_right(node)
            }
            (..=-2, Descent::Right) => {
                trace!("right-right rotation at height {}", node.height);
                Self::rotate_left(node)
            }
            (2.., Descent::Right) => {
                trace!("left-right rotation at height {}", node.height);
                node.left = node.left.take().map(Self::rotate_left);
                Self::rotate_right(node)
            }
            (..=-2, Descent::Left) => {
                trace!("right-left rotation at height {}", node.height);
                node.right = node.right.take().map(Self::rotate_right);
                Self::rotate_left(node)
            }
            _ => node,
        }
    }

    //     y          x
    //    / \        / \
    //   x   C  ->  A   y
    //  / \            / \
    // A   B          B   C
    fn rotate_right(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        match node.left.take() {
            None => node,
            Some(mut left) => {
                node.left = left.right.take();
                node.adjust_height();
                left.right = Some(node);
                left.adjust_height();
                left
            }
        }
    }

    //   x              y
    //  / \            / \
    // A   y    ->    x   C
    //    / \        / \
    //   B   C      A   B
    fn rotate_left(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        match node.right.take() {
            None => node,
            Some(mut right) => {
                node.right = right.left.take();
                node.adjust_height();
                right.left = Some(node);
                right.adjust_height();
                right
            }
        }
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl<K, V> Node<K, V> {
    fn create(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

impl<K, V> Default for AvlTreeMap<K, V> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let mut iter = IntoIter {
            stack: Vec::with_capacity(self.height()),
            remaining: self.num_nodes,
        };
        iter.push_left_edge(self.root.take());
        iter
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_edge(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_edge(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> IntoIter<K, V> {
    fn push_left_edge(&mut self, mut link: Link<K, V>) {
        while let Some(mut node) = link {
            link = node.left.take();
            self.stack.push(node);
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let mut node = self.stack.pop()?;
        self.push_left_edge(node.right.take());
        self.remaining -= 1;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for AvlTreeMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
struct AvlTreeMapVisitor<K, V> {
    marker: std::marker::PhantomData<fn() -> AvlTreeMap<K, V>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for AvlTreeMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    type Value = AvlTreeMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        // Repeated keys keep their first value, same as insert.
        let mut map = AvlTreeMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for AvlTreeMap<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(AvlTreeMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

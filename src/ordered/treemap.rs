//! Ordered map based on a left-leaning red-black tree.
//!
//! This module provides [`OrderedMap`], a mutable ordered map whose nodes
//! exclusively own their children.
//!
//! # Overview
//!
//! `OrderedMap` keeps a left-leaning red-black tree (LLRB), the binary
//! encoding of a 2-3 tree in which red links glue a node to its left child
//! to form a 3-node.
//!
//! - O(log N) get
//! - O(log N) insert
//! - O(log N) delete, `delete_min`, `delete_max`
//! - O(log N) min/max
//! - O(log N + k) range enumeration where k is the number of results
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use climate_extremes::ordered::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.insert(5, "five").unwrap();
//! map.insert(3, "three").unwrap();
//! map.insert(8, "eight").unwrap();
//! map.insert(1, "one").unwrap();
//!
//! assert_eq!(map.min(), Ok(&1));
//! assert_eq!(map.max(), Ok(&8));
//! assert_eq!(map.get(&3), Ok(Some(&"three")));
//!
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &3, &5, &8]);
//!
//! map.delete(&5).unwrap();
//! assert_eq!(map.get(&5), Ok(None));
//! assert_eq!(map.len(), 3);
//! ```
//!
//! # Internal Structure
//!
//! The tree maintains the following invariants after every mutation:
//! 1. Keys are in strict symmetric order under the map's [`KeyOrder`]
//! 2. Red links lean left and no path has two consecutive red links
//! 3. Every path from the root to an empty link has the same number of black links
//! 4. Every node records the size of the subtree it roots
//! 5. The root is black
//!
//! Colors change only through rotations and color flips.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use smallvec::SmallVec;

use super::{KeyOrder, NaturalOrder, OrderedMapError};

/// Traversal stack entries kept inline before spilling to the heap.
///
/// An LLRB with N entries is at most `2 * log2(N)` deep, so 48 slots cover
/// maps of up to 2^24 entries without allocating.
const INLINE_STACK_DEPTH: usize = 48;

type TraversalStack<'a, K, V> = SmallVec<[&'a Node<K, V>; INLINE_STACK_DEPTH]>;

// =============================================================================
// Color Definition
// =============================================================================

/// The color of the link from a node to its parent.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    /// The node forms a 3-node with its parent.
    Red,
    /// An ordinary 2-3 tree link.
    Black,
}

impl Color {
    const fn flipped(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }
}

// =============================================================================
// Node Definition
// =============================================================================

pub(super) type Link<K, V> = Option<Box<Node<K, V>>>;

/// Internal node structure for the left-leaning red-black tree.
#[derive(Clone)]
pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) color: Color,
    /// Number of nodes in the subtree rooted here, including this one.
    pub(super) size: usize,
    pub(super) left: Link<K, V>,
    pub(super) right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    /// Creates a new red leaf.
    fn new_red(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            color: Color::Red,
            size: 1,
            left: None,
            right: None,
        })
    }

    pub(super) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    fn left_left_is_red(&self) -> bool {
        self.left
            .as_deref()
            .is_some_and(|left| is_red(left.left.as_deref()))
    }

    fn right_left_is_red(&self) -> bool {
        self.right
            .as_deref()
            .is_some_and(|right| is_red(right.left.as_deref()))
    }

    fn update_size(&mut self) {
        self.size = size(self.left.as_deref()) + size(self.right.as_deref()) + 1;
    }

    /// Makes a right-leaning red link lean to the left.
    ///
    /// ```text
    ///       node                 right
    ///       /  \\               //    \
    ///      a   right    =>    node     c
    ///          /   \          /  \
    ///         b     c        a    b
    /// ```
    fn rotate_left(mut node: Box<Self>) -> Box<Self> {
        let Some(mut right) = node.right.take() else {
            return node;
        };
        node.right = right.left.take();
        right.color = node.color;
        node.color = Color::Red;
        right.size = node.size;
        node.update_size();
        right.left = Some(node);
        right
    }

    /// Makes a left-leaning red link lean to the right.
    fn rotate_right(mut node: Box<Self>) -> Box<Self> {
        let Some(mut left) = node.left.take() else {
            return node;
        };
        node.left = left.right.take();
        left.color = node.color;
        node.color = Color::Red;
        left.size = node.size;
        node.update_size();
        left.right = Some(node);
        left
    }

    /// Inverts the color of this node and both of its children.
    fn flip_colors(&mut self) {
        self.color = self.color.flipped();
        if let Some(left) = self.left.as_deref_mut() {
            left.color = left.color.flipped();
        }
        if let Some(right) = self.right.as_deref_mut() {
            right.color = right.color.flipped();
        }
    }

    /// Restores the left-leaning shape on the way back up from a mutation.
    fn balance(mut node: Box<Self>) -> Box<Self> {
        if is_red(node.right.as_deref()) && !is_red(node.left.as_deref()) {
            node = Self::rotate_left(node);
        }
        if is_red(node.left.as_deref()) && node.left_left_is_red() {
            node = Self::rotate_right(node);
        }
        if is_red(node.left.as_deref()) && is_red(node.right.as_deref()) {
            node.flip_colors();
        }
        node.update_size();
        node
    }

    /// Assuming `node` is red and both `node.left` and `node.left.left` are
    /// black, makes `node.left` or one of its children red.
    fn move_red_left(mut node: Box<Self>) -> Box<Self> {
        node.flip_colors();
        if node.right_left_is_red() {
            node.right = node.right.take().map(Self::rotate_right);
            node = Self::rotate_left(node);
            node.flip_colors();
        }
        node
    }

    /// Assuming `node` is red and both `node.right` and `node.right.left` are
    /// black, makes `node.right` or one of its children red.
    fn move_red_right(mut node: Box<Self>) -> Box<Self> {
        node.flip_colors();
        if node.left_left_is_red() {
            node = Self::rotate_right(node);
            node.flip_colors();
        }
        node
    }

    /// Removes the minimum of the subtree, returning the new subtree and the
    /// detached node.
    fn delete_min(mut node: Box<Self>) -> (Link<K, V>, Option<Box<Self>>) {
        if node.left.is_none() {
            return (node.right.take(), Some(node));
        }
        if !is_red(node.left.as_deref()) && !node.left_left_is_red() {
            node = Self::move_red_left(node);
        }
        let (left, removed) = match node.left.take() {
            Some(left) => Self::delete_min(left),
            None => (None, None),
        };
        node.left = left;
        (Some(Self::balance(node)), removed)
    }

    /// Removes the maximum of the subtree, returning the new subtree and the
    /// detached node.
    fn delete_max(mut node: Box<Self>) -> (Link<K, V>, Option<Box<Self>>) {
        if is_red(node.left.as_deref()) {
            node = Self::rotate_right(node);
        }
        if node.right.is_none() {
            return (node.left.take(), Some(node));
        }
        if !is_red(node.right.as_deref()) && !node.right_left_is_red() {
            node = Self::move_red_right(node);
        }
        let (right, removed) = match node.right.take() {
            Some(right) => Self::delete_max(right),
            None => (None, None),
        };
        node.right = right;
        (Some(Self::balance(node)), removed)
    }
}

/// Helper function to check if an optional node is red.
pub(super) fn is_red<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.is_some_and(Node::is_red)
}

/// Number of nodes under an optional link.
pub(super) fn size<K, V>(node: Option<&Node<K, V>>) -> usize {
    node.map_or(0, |node| node.size)
}

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// A mutable ordered map based on a left-leaning red-black tree.
///
/// Keys are compared through the map's [`KeyOrder`] capability, which
/// defaults to [`NaturalOrder`]. Keys are unique: inserting an existing key
/// overwrites its value.
///
/// # Time Complexity
///
/// | Operation                 | Complexity        |
/// |---------------------------|-------------------|
/// | `new`                     | O(1)              |
/// | `get`                     | O(log N)          |
/// | `insert`                  | O(log N)          |
/// | `delete`                  | O(log N)          |
/// | `delete_min`/`delete_max` | O(log N)          |
/// | `contains`                | O(log N)          |
/// | `min`/`max`               | O(log N)          |
/// | `keys_in`                 | O(log N + k)      |
/// | `len`                     | O(1)              |
/// | `is_empty`                | O(1)              |
///
/// # Errors
///
/// Operations taking a key fail with [`OrderedMapError::InvalidArgument`]
/// when the ordering does not admit the key. Extremal operations fail with
/// [`OrderedMapError::Underflow`] on an empty map. A missing key is reported
/// as `None`, never as an error.
///
/// # Examples
///
/// ```rust
/// use climate_extremes::ordered::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert(3, "three").unwrap();
/// map.insert(1, "one").unwrap();
/// map.insert(2, "two").unwrap();
///
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&1, &2, &3]);
///
/// // Drain in ascending order
/// assert_eq!(map.delete_min(), Ok((1, "one")));
/// assert_eq!(map.delete_min(), Ok((2, "two")));
/// assert_eq!(map.delete_min(), Ok((3, "three")));
/// assert!(map.delete_min().is_err());
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V, O = NaturalOrder> {
    /// Root node of the tree
    pub(super) root: Link<K, V>,
    /// Ordering used for every key comparison
    pub(super) order: O,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates a new empty map ordered by `Ord`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let map: OrderedMap<i32, String> = OrderedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_order(NaturalOrder)
    }
}

impl<K, V, O> OrderedMap<K, V, O> {
    /// Creates a new empty map that compares keys with `order`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::{FloatOrder, OrderedMap};
    ///
    /// let map: OrderedMap<f64, &str, FloatOrder> = OrderedMap::with_order(FloatOrder);
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_order(order: O) -> Self {
        Self { root: None, order }
    }

    /// Returns the number of entries in the map.
    ///
    /// This is the subtree size recorded at the root.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        size(self.root.as_deref())
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the ordering used to compare keys.
    #[inline]
    pub const fn order(&self) -> &O {
        &self.order
    }

    /// Removes every entry.
    #[inline]
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Returns the entry with the minimum key, or `None` if the map is empty.
    #[must_use]
    pub fn min_entry(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the maximum key, or `None` if the map is empty.
    #[must_use]
    pub fn max_entry(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the minimum key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::Underflow`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert!(map.min().is_err());
    ///
    /// map.insert(3, "three").unwrap();
    /// map.insert(1, "one").unwrap();
    /// assert_eq!(map.min(), Ok(&1));
    /// ```
    pub fn min(&self) -> Result<&K, OrderedMapError> {
        self.min_entry()
            .map(|(key, _)| key)
            .ok_or(OrderedMapError::underflow("min"))
    }

    /// Returns the maximum key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::Underflow`] if the map is empty.
    pub fn max(&self) -> Result<&K, OrderedMapError> {
        self.max_entry()
            .map(|(key, _)| key)
            .ok_or(OrderedMapError::underflow("max"))
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// The iterator walks the tree lazily with an explicit stack; nothing is
    /// collected up front.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.len())
    }

    /// Returns an iterator over keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let map: OrderedMap<i32, ()> = [(3, ()), (1, ()), (2, ())].into_iter().collect();
    /// let keys: Vec<&i32> = map.keys().collect();
    /// assert_eq!(keys, vec![&1, &2, &3]);
    /// ```
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over values in ascending key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    fn blacken_root(&mut self) {
        if let Some(root) = self.root.as_deref_mut() {
            root.color = Color::Black;
        }
    }
}

impl<K, V, O: KeyOrder<K>> OrderedMap<K, V, O> {
    fn ensure_admitted(&self, key: &K, operation: &'static str) -> Result<(), OrderedMapError> {
        if self.order.admits(key) {
            Ok(())
        } else {
            Err(OrderedMapError::invalid_argument(operation))
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::InvalidArgument`] if the ordering does not
    /// admit `key`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert("hello".to_string(), 42).unwrap();
    ///
    /// assert_eq!(map.get(&"hello".to_string()), Ok(Some(&42)));
    /// assert_eq!(map.get(&"world".to_string()), Ok(None));
    /// ```
    pub fn get(&self, key: &K) -> Result<Option<&V>, OrderedMapError> {
        self.ensure_admitted(key, "get")?;
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            match self.order.compare(key, &current.key) {
                Ordering::Less => node = current.left.as_deref(),
                Ordering::Greater => node = current.right.as_deref(),
                Ordering::Equal => return Ok(Some(&current.value)),
            }
        }
        Ok(None)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::InvalidArgument`] if the ordering does not
    /// admit `key`.
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, OrderedMapError> {
        self.ensure_admitted(key, "get_mut")?;
        let order = &self.order;
        let mut node = self.root.as_deref_mut();
        while let Some(current) = node {
            match order.compare(key, &current.key) {
                Ordering::Less => node = current.left.as_deref_mut(),
                Ordering::Greater => node = current.right.as_deref_mut(),
                Ordering::Equal => return Ok(Some(&mut current.value)),
            }
        }
        Ok(None)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// A key the ordering does not admit is never contained.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains the key, its value is replaced in place
    /// and the tree shape is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::InvalidArgument`] if the ordering does not
    /// admit `key`. The map is unchanged in that case.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(1, "one").unwrap();
    /// map.insert(1, "ONE").unwrap();
    ///
    /// assert_eq!(map.get(&1), Ok(Some(&"ONE")));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<(), OrderedMapError> {
        self.ensure_admitted(&key, "insert")?;
        self.insert_admitted(key, value);
        Ok(())
    }

    fn insert_admitted(&mut self, key: K, value: V) {
        let root = self.root.take();
        self.root = Some(Self::insert_into_node(root, key, value, &self.order));
        self.blacken_root();
    }

    /// Recursive helper for insert.
    fn insert_into_node(node: Link<K, V>, key: K, value: V, order: &O) -> Box<Node<K, V>> {
        let Some(mut node) = node else {
            return Node::new_red(key, value);
        };
        match order.compare(&key, &node.key) {
            Ordering::Less => {
                node.left = Some(Self::insert_into_node(node.left.take(), key, value, order));
            }
            Ordering::Greater => {
                node.right = Some(Self::insert_into_node(node.right.take(), key, value, order));
            }
            Ordering::Equal => node.value = value,
        }
        Node::balance(node)
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// Deleting an absent key, or deleting from an empty map, is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::InvalidArgument`] if the ordering does not
    /// admit `key`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(1, "one").unwrap();
    /// map.insert(2, "two").unwrap();
    ///
    /// assert_eq!(map.delete(&1), Ok(Some("one")));
    /// assert_eq!(map.delete(&1), Ok(None));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn delete(&mut self, key: &K) -> Result<Option<V>, OrderedMapError> {
        self.ensure_admitted(key, "delete")?;
        if !self.contains(key) {
            return Ok(None);
        }
        let Some(mut root) = self.root.take() else {
            return Ok(None);
        };
        if !is_red(root.left.as_deref()) && !is_red(root.right.as_deref()) {
            root.color = Color::Red;
        }
        let (root, removed) = Self::delete_from_node(root, key, &self.order);
        self.root = root;
        self.blacken_root();
        Ok(removed)
    }

    /// Recursive helper for delete. `key` must be present under `node`.
    fn delete_from_node(mut node: Box<Node<K, V>>, key: &K, order: &O) -> (Link<K, V>, Option<V>) {
        let removed = if order.compare(key, &node.key) == Ordering::Less {
            if !is_red(node.left.as_deref()) && !node.left_left_is_red() {
                node = Node::move_red_left(node);
            }
            match node.left.take() {
                Some(left) => {
                    let (left, removed) = Self::delete_from_node(left, key, order);
                    node.left = left;
                    removed
                }
                None => None,
            }
        } else {
            if is_red(node.left.as_deref()) {
                node = Node::rotate_right(node);
            }
            if order.compare(key, &node.key) == Ordering::Equal && node.right.is_none() {
                let Node { left, value, .. } = *node;
                return (left, Some(value));
            }
            if !is_red(node.right.as_deref()) && !node.right_left_is_red() {
                node = Node::move_red_right(node);
            }
            if order.compare(key, &node.key) == Ordering::Equal {
                Self::replace_with_successor(&mut node)
            } else {
                match node.right.take() {
                    Some(right) => {
                        let (right, removed) = Self::delete_from_node(right, key, order);
                        node.right = right;
                        removed
                    }
                    None => None,
                }
            }
        };
        (Some(Node::balance(node)), removed)
    }

    /// Moves the in-order successor's entry into `node`, detaching the
    /// successor from the right subtree. Returns the value `node` held.
    fn replace_with_successor(node: &mut Node<K, V>) -> Option<V> {
        let right = node.right.take()?;
        let (right, successor) = Node::delete_min(right);
        node.right = right;
        successor.map(|successor| {
            let Node { key, value, .. } = *successor;
            node.key = key;
            mem::replace(&mut node.value, value)
        })
    }

    /// Removes and returns the entry with the minimum key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::Underflow`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(2, "two").unwrap();
    /// map.insert(1, "one").unwrap();
    ///
    /// assert_eq!(map.delete_min(), Ok((1, "one")));
    /// assert_eq!(map.min(), Ok(&2));
    /// ```
    pub fn delete_min(&mut self) -> Result<(K, V), OrderedMapError> {
        self.delete_extremal("delete_min", Node::delete_min)
    }

    /// Removes and returns the entry with the maximum key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::Underflow`] if the map is empty.
    pub fn delete_max(&mut self) -> Result<(K, V), OrderedMapError> {
        self.delete_extremal("delete_max", Node::delete_max)
    }

    fn delete_extremal(
        &mut self,
        operation: &'static str,
        remove: fn(Box<Node<K, V>>) -> (Link<K, V>, Option<Box<Node<K, V>>>),
    ) -> Result<(K, V), OrderedMapError> {
        let Some(mut root) = self.root.take() else {
            return Err(OrderedMapError::underflow(operation));
        };
        if !is_red(root.left.as_deref()) && !is_red(root.right.as_deref()) {
            root.color = Color::Red;
        }
        let (root, removed) = remove(root);
        self.root = root;
        self.blacken_root();
        removed
            .map(|node| (node.key, node.value))
            .ok_or(OrderedMapError::underflow(operation))
    }

    /// Returns the keys `k` with `lo <= k <= hi` in ascending order.
    ///
    /// The traversal is pruned: subtrees entirely below `lo` or above `hi`
    /// are never visited. If `lo > hi` the sequence is empty.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::InvalidArgument`] if the ordering does not
    /// admit either bound.
    ///
    /// # Complexity
    ///
    /// O(log N + k) where k is the number of keys in range
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let map: OrderedMap<i32, ()> = (1..=5).map(|key| (key, ())).collect();
    ///
    /// let range: Vec<&i32> = map.keys_in(&2, &4).unwrap().collect();
    /// assert_eq!(range, vec![&2, &3, &4]);
    ///
    /// assert_eq!(map.keys_in(&4, &2).unwrap().count(), 0);
    /// ```
    pub fn keys_in<'a>(&'a self, lo: &K, hi: &'a K) -> Result<RangeKeys<'a, K, V, O>, OrderedMapError> {
        self.ensure_admitted(lo, "keys_in")?;
        self.ensure_admitted(hi, "keys_in")?;
        Ok(RangeKeys::new(self.root.as_deref(), lo, hi, &self.order))
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of an [`OrderedMap`] in ascending key order.
pub struct Iter<'a, K, V> {
    stack: TraversalStack<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, length: usize) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            remaining: length,
        };
        iterator.push_left_spine(root);
        iterator
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<K, V>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// An iterator over the keys of an [`OrderedMap`] in ascending order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// An iterator over the values of an [`OrderedMap`] in ascending key order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// An iterator over the keys of an [`OrderedMap`] within `[lo, hi]`.
///
/// Created by [`OrderedMap::keys_in`].
pub struct RangeKeys<'a, K, V, O> {
    stack: TraversalStack<'a, K, V>,
    hi: &'a K,
    order: &'a O,
}

impl<'a, K, V, O: KeyOrder<K>> RangeKeys<'a, K, V, O> {
    fn new(root: Option<&'a Node<K, V>>, lo: &K, hi: &'a K, order: &'a O) -> Self {
        let mut stack = TraversalStack::new();
        let mut node = root;
        // Left subtrees are entered only while `lo` is below the current key.
        while let Some(current) = node {
            match order.compare(lo, &current.key) {
                Ordering::Less => {
                    stack.push(current);
                    node = current.left.as_deref();
                }
                Ordering::Equal => {
                    stack.push(current);
                    node = None;
                }
                Ordering::Greater => node = current.right.as_deref(),
            }
        }
        Self { stack, hi, order }
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<K, V>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, K, V, O: KeyOrder<K>> Iterator for RangeKeys<'a, K, V, O> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if self.order.compare(&node.key, self.hi) == Ordering::Greater {
            self.stack.clear();
            return None;
        }
        if self.order.compare(self.hi, &node.key) == Ordering::Greater {
            self.push_left_spine(node.right.as_deref());
        }
        Some(&node.key)
    }
}

impl<K, V, O: KeyOrder<K>> FusedIterator for RangeKeys<'_, K, V, O> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for OrderedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert_admitted(key, value);
        }
    }
}

impl<'a, K, V, O> IntoIterator for &'a OrderedMap<K, V, O> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq, O> PartialEq for OrderedMap<K, V, O> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, O> Eq for OrderedMap<K, V, O> {}

impl<K: fmt::Debug, V: fmt::Debug, O> fmt::Debug for OrderedMap<K, V, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, O> fmt::Display for OrderedMap<K, V, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

static_assertions::assert_impl_all!(OrderedMap<i32, String>: Send, Sync, Clone);
static_assertions::assert_impl_all!(OrderedMap<f64, String, super::FloatOrder>: Send, Sync);
static_assertions::assert_not_impl_any!(OrderedMap<std::rc::Rc<i32>, i32>: Send, Sync);

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, O> serde::Serialize for OrderedMap<K, V, O>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<K, V, O> {
    marker: std::marker::PhantomData<fn() -> OrderedMap<K, V, O>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, O> serde::de::Visitor<'de> for OrderedMapVisitor<K, V, O>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    O: KeyOrder<K> + Default,
{
    type Value = OrderedMap<K, V, O>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = OrderedMap::with_order(O::default());
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value).map_err(serde::de::Error::custom)?;
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, O> serde::Deserialize<'de> for OrderedMap<K, V, O>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    O: KeyOrder<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Multithread Tests
// =============================================================================

#[cfg(test)]
mod multithread_tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    #[rstest]
    fn test_map_shared_across_threads() {
        let map: Arc<OrderedMap<i32, &str>> =
            Arc::new([(1, "one"), (2, "two"), (3, "three")].into_iter().collect());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let map_clone = Arc::clone(&map);
                thread::spawn(move || {
                    assert_eq!(map_clone.get(&2), Ok(Some(&"two")));
                    assert_eq!(map_clone.keys_in(&1, &3).unwrap().count(), 3);
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }
    }

    #[rstest]
    fn test_map_moved_into_thread() {
        let mut map = OrderedMap::new();
        map.insert(1, "one".to_string()).unwrap();

        let handle = thread::spawn(move || {
            map.insert(2, "two".to_string()).unwrap();
            map
        });
        let map = handle.join().expect("Thread panicked");
        assert_eq!(map.len(), 2);
    }
}

//! Structural inspection of an [`OrderedMap`].
//!
//! These operations expose the red-black shape of the tree for tests and
//! debugging. They are compiled only with the `diagnostics` feature.

use std::cmp::Ordering;

use thiserror::Error;

use super::treemap::{Color, Link, Node, is_red};
use super::{KeyOrder, OrderedMap};

/// A broken red-black tree invariant, as found by
/// [`OrderedMap::check_invariants`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A key is not strictly between its ancestors' bounds.
    #[error("keys are not in strict symmetric order")]
    OutOfOrder,

    /// The root link is red.
    #[error("root is red")]
    RedRoot,

    /// A right child is red.
    #[error("red link leans right")]
    RightLeaningRed,

    /// A red node has a red left child.
    #[error("two consecutive red links")]
    ConsecutiveReds,

    /// The two subtrees of a node have different black heights.
    #[error("black height differs between subtrees: left {left}, right {right}")]
    BlackImbalance {
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },

    /// A node records the wrong subtree size.
    #[error("subtree size is {recorded} but holds {actual} nodes")]
    SizeMismatch {
        /// Size stored in the node.
        recorded: usize,
        /// Number of nodes actually present.
        actual: usize,
    },
}

impl<K, V, O> OrderedMap<K, V, O> {
    /// Returns the height of the tree, counting nodes on the longest path.
    ///
    /// An empty map has height 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::OrderedMap;
    ///
    /// let map: OrderedMap<i32, ()> = (0..7).map(|key| (key, ())).collect();
    /// assert!(map.height() <= 6);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        fn height_of<K, V>(node: Option<&Node<K, V>>) -> usize {
            node.map_or(0, |node| {
                1 + height_of(node.left.as_deref()).max(height_of(node.right.as_deref()))
            })
        }
        height_of(self.root.as_deref())
    }
}

impl<K, V, O: KeyOrder<K>> OrderedMap<K, V, O> {
    /// Returns the color of the link into the node holding `key`, or `None`
    /// if the key is absent or not admitted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::ordered::{Color, OrderedMap};
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(1, ()).unwrap();
    /// map.insert(2, ()).unwrap();
    ///
    /// assert_eq!(map.color_of(&2), Some(Color::Black));
    /// assert_eq!(map.color_of(&1), Some(Color::Red));
    /// assert_eq!(map.color_of(&3), None);
    /// ```
    #[must_use]
    pub fn color_of(&self, key: &K) -> Option<Color> {
        if !self.order.admits(key) {
            return None;
        }
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            match self.order.compare(key, &current.key) {
                Ordering::Less => node = current.left.as_deref(),
                Ordering::Greater => node = current.right.as_deref(),
                Ordering::Equal => return Some(current.color),
            }
        }
        None
    }

    /// Verifies every structural invariant of the tree.
    ///
    /// On success returns the black height of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found in a pre-order walk.
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        if is_red(self.root.as_deref()) {
            return Err(InvariantViolation::RedRoot);
        }
        let bounds = Bounds {
            lower: None,
            upper: None,
        };
        Ok(check_subtree(&self.root, &self.order, bounds)?.black_height)
    }
}

struct Bounds<'a, K> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

struct SubtreeShape {
    black_height: usize,
    size: usize,
}

fn check_subtree<K, V, O: KeyOrder<K>>(
    link: &Link<K, V>,
    order: &O,
    bounds: Bounds<'_, K>,
) -> Result<SubtreeShape, InvariantViolation> {
    let Some(node) = link.as_deref() else {
        return Ok(SubtreeShape {
            black_height: 0,
            size: 0,
        });
    };

    let above_lower = bounds
        .lower
        .is_none_or(|lower| order.compare(&node.key, lower) == Ordering::Greater);
    let below_upper = bounds
        .upper
        .is_none_or(|upper| order.compare(&node.key, upper) == Ordering::Less);
    if !above_lower || !below_upper {
        return Err(InvariantViolation::OutOfOrder);
    }
    if is_red(node.right.as_deref()) {
        return Err(InvariantViolation::RightLeaningRed);
    }
    if node.is_red() && is_red(node.left.as_deref()) {
        return Err(InvariantViolation::ConsecutiveReds);
    }

    let left = check_subtree(
        &node.left,
        order,
        Bounds {
            lower: bounds.lower,
            upper: Some(&node.key),
        },
    )?;
    let right = check_subtree(
        &node.right,
        order,
        Bounds {
            lower: Some(&node.key),
            upper: bounds.upper,
        },
    )?;

    if left.black_height != right.black_height {
        return Err(InvariantViolation::BlackImbalance {
            left: left.black_height,
            right: right.black_height,
        });
    }
    let actual = left.size + right.size + 1;
    if node.size != actual {
        return Err(InvariantViolation::SizeMismatch {
            recorded: node.size,
            actual,
        });
    }

    Ok(SubtreeShape {
        black_height: left.black_height + usize::from(node.color == Color::Black),
        size: actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_empty_map_is_valid() {
        let map: OrderedMap<i32, ()> = OrderedMap::new();
        assert_eq!(map.check_invariants(), Ok(0));
        assert_eq!(map.height(), 0);
    }

    #[rstest]
    fn test_black_height_grows_with_size() {
        let map: OrderedMap<i32, ()> = (0..255).map(|key| (key, ())).collect();
        let black_height = map.check_invariants().unwrap();
        assert!((4..=8).contains(&black_height));
    }

    #[rstest]
    fn test_detects_red_root() {
        let mut map: OrderedMap<i32, ()> = (0..3).map(|key| (key, ())).collect();
        if let Some(root) = map.root.as_deref_mut() {
            root.color = Color::Red;
        }
        assert_eq!(map.check_invariants(), Err(InvariantViolation::RedRoot));
    }

    #[rstest]
    fn test_detects_right_leaning_red() {
        let mut map: OrderedMap<i32, ()> = (0..3).map(|key| (key, ())).collect();
        if let Some(right) = map.root.as_deref_mut().and_then(|root| root.right.as_deref_mut()) {
            right.color = Color::Red;
        }
        assert_eq!(
            map.check_invariants(),
            Err(InvariantViolation::RightLeaningRed)
        );
    }

    #[rstest]
    fn test_detects_size_mismatch() {
        let mut map: OrderedMap<i32, ()> = (0..3).map(|key| (key, ())).collect();
        if let Some(root) = map.root.as_deref_mut() {
            root.size = 7;
        }
        assert_eq!(
            map.check_invariants(),
            Err(InvariantViolation::SizeMismatch {
                recorded: 7,
                actual: 3
            })
        );
    }

    #[rstest]
    fn test_detects_out_of_order_key() {
        let mut map: OrderedMap<i32, ()> = (0..3).map(|key| (key, ())).collect();
        if let Some(left) = map.root.as_deref_mut().and_then(|root| root.left.as_deref_mut()) {
            left.key = 10;
        }
        assert_eq!(map.check_invariants(), Err(InvariantViolation::OutOfOrder));
    }

    #[rstest]
    fn test_color_of_rejects_unadmitted_key() {
        let mut map = OrderedMap::with_order(crate::ordered::FloatOrder);
        map.insert(1.0, ()).unwrap();
        assert_eq!(map.color_of(&1.0), Some(Color::Black));
        assert_eq!(map.color_of(&f64::NAN), None);
    }
}

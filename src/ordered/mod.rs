//! Ordered associative containers.
//!
//! This module provides [`OrderedMap`], a mutable ordered map backed by a
//! left-leaning red-black tree, together with the [`KeyOrder`] capability
//! that decides how its keys compare.
//!
//! # Key Ordering
//!
//! The map never relies on `Ord` directly. Every comparison goes through a
//! [`KeyOrder`] value owned by the map, so key types without a total `Ord`
//! (such as `f64`) can be used as long as an ordering is supplied:
//!
//! - [`NaturalOrder`]: delegates to `Ord`, admits every key (the default)
//! - [`FloatOrder`]: numeric order on `f64`, rejects `NaN`
//! - [`ReverseOrder`]: inverts another ordering
//! - [`OrderBy`]: wraps a comparison closure
//!
//! A key the ordering does not [admit](KeyOrder::admits) is treated as an
//! undefined key and rejected with [`OrderedMapError::InvalidArgument`].
//!
//! # Examples
//!
//! ```rust
//! use climate_extremes::ordered::{FloatOrder, OrderedMap};
//!
//! let mut readings = OrderedMap::with_order(FloatOrder);
//! readings.insert(0.42, "2016").unwrap();
//! readings.insert(-0.18, "1909").unwrap();
//!
//! assert_eq!(readings.min(), Ok(&-0.18));
//! assert!(readings.insert(f64::NAN, "never").is_err());
//! ```

mod error;
mod treemap;

#[cfg(any(test, feature = "diagnostics"))]
mod diagnostics;

use std::cmp::Ordering;

pub use error::OrderedMapError;
pub use treemap::{Iter, Keys, OrderedMap, RangeKeys, Values};

#[cfg(any(test, feature = "diagnostics"))]
pub use diagnostics::InvariantViolation;
#[cfg(any(test, feature = "diagnostics"))]
pub use treemap::Color;

// =============================================================================
// KeyOrder Definition
// =============================================================================

/// A three-way comparison capability over keys of type `K`.
///
/// Implementations must describe a total order over the keys they admit:
/// `compare` has to be reflexive, antisymmetric and transitive on every pair
/// of admitted keys. Keys rejected by [`admits`](Self::admits) are never
/// passed to `compare` by [`OrderedMap`].
pub trait KeyOrder<K: ?Sized> {
    /// Compares two admitted keys.
    fn compare(&self, left: &K, right: &K) -> Ordering;

    /// Returns `true` if `key` is a defined, comparable key.
    #[inline]
    fn admits(&self, _key: &K) -> bool {
        true
    }
}

/// Orders keys by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyOrder<K> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Orders `f64` keys numerically.
///
/// `NaN` is not admitted. `-0.0` and `0.0` compare equal, so they address
/// the same entry.
///
/// # Examples
///
/// ```rust
/// use climate_extremes::ordered::{FloatOrder, KeyOrder};
/// use std::cmp::Ordering;
///
/// assert_eq!(FloatOrder.compare(&1.5, &2.0), Ordering::Less);
/// assert_eq!(FloatOrder.compare(&-0.0, &0.0), Ordering::Equal);
/// assert!(!FloatOrder.admits(&f64::NAN));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FloatOrder;

impl KeyOrder<f64> for FloatOrder {
    #[inline]
    fn compare(&self, left: &f64, right: &f64) -> Ordering {
        left.partial_cmp(right).unwrap_or_else(|| left.total_cmp(right))
    }

    #[inline]
    fn admits(&self, key: &f64) -> bool {
        !key.is_nan()
    }
}

/// Inverts the wrapped ordering.
///
/// # Examples
///
/// ```rust
/// use climate_extremes::ordered::{NaturalOrder, OrderedMap, ReverseOrder};
///
/// let mut map = OrderedMap::with_order(ReverseOrder(NaturalOrder));
/// for key in [1, 3, 2] {
///     map.insert(key, ()).unwrap();
/// }
/// let keys: Vec<&i32> = map.keys().collect();
/// assert_eq!(keys, vec![&3, &2, &1]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder<O>(pub O);

impl<K: ?Sized, O: KeyOrder<K>> KeyOrder<K> for ReverseOrder<O> {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self.0.compare(right, left)
    }

    #[inline]
    fn admits(&self, key: &K) -> bool {
        self.0.admits(key)
    }
}

/// Orders keys with a comparison closure.
///
/// # Examples
///
/// ```rust
/// use climate_extremes::ordered::{OrderBy, OrderedMap};
///
/// let by_length = OrderBy(|left: &String, right: &String| left.len().cmp(&right.len()));
/// let mut map = OrderedMap::with_order(by_length);
/// map.insert("ccc".to_string(), 3).unwrap();
/// map.insert("a".to_string(), 1).unwrap();
/// assert_eq!(map.min().map(String::as_str), Ok("a"));
/// ```
#[derive(Clone, Copy)]
pub struct OrderBy<F>(pub F);

impl<K: ?Sized, F> KeyOrder<K> for OrderBy<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        (self.0)(left, right)
    }
}

impl<F> std::fmt::Debug for OrderBy<F> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("OrderBy(..)")
    }
}

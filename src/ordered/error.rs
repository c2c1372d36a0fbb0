//! Errors reported by [`OrderedMap`](super::OrderedMap).

use thiserror::Error;

/// Errors that can occur when operating on an ordered map.
///
/// Both variants describe caller mistakes and are reported before the map is
/// touched, so a failed call never leaves a partial mutation behind. A missing
/// key is not an error: lookups report it as `None`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OrderedMapError {
    /// A key or range bound is not admitted by the map's ordering.
    #[error("argument to {operation}() is not a comparable key")]
    InvalidArgument {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// An extremal operation was invoked on an empty map.
    #[error("{operation}() called on an empty map")]
    Underflow {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

impl OrderedMapError {
    pub(crate) const fn invalid_argument(operation: &'static str) -> Self {
        Self::InvalidArgument { operation }
    }

    pub(crate) const fn underflow(operation: &'static str) -> Self {
        Self::Underflow { operation }
    }

    /// Returns `true` for [`OrderedMapError::Underflow`].
    #[must_use]
    pub const fn is_underflow(&self) -> bool {
        matches!(self, Self::Underflow { .. })
    }
}

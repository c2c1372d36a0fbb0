//! # climate-extremes
//!
//! A left-leaning red-black ordered map, and a climate time-series extremes
//! reporter built on top of it.
//!
//! ## Overview
//!
//! - **Ordered Map**: [`ordered::OrderedMap`], a self-balancing mutable map
//!   with O(log N) insert, delete, lookup and extremal access, plus lazy
//!   ordered and range iteration
//! - **Key Ordering**: [`ordered::KeyOrder`], an explicit comparison
//!   capability so keys such as `f64` can be ordered without `Ord`
//! - **Climate Extremes**: loading of temperature anomaly, sea level and CO2
//!   series, and a report of their lowest and highest readings with the
//!   other series' readings on the same date
//!
//! ## Feature Flags
//!
//! - `climate` (default): the climate series and report
//! - `serde`: `Serialize`/`Deserialize` for the map and `Serialize` for reports
//! - `diagnostics`: tree inspection (`color_of`, `height`, `check_invariants`)
//! - `cli`: the `climate-extremes` binary
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use climate_extremes::prelude::*;
//!
//! let mut map = OrderedMap::new();
//! map.insert("b", 2).unwrap();
//! map.insert("a", 1).unwrap();
//! assert_eq!(map.min(), Ok(&"a"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use climate_extremes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ordered::{FloatOrder, KeyOrder, NaturalOrder, OrderedMap, OrderedMapError};

    #[cfg(feature = "climate")]
    pub use crate::climate::{ClimateConfig, Report, SeriesIndex, SeriesKind};
}

pub mod ordered;

#[cfg(feature = "climate")]
pub mod climate;

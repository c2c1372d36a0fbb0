//! Climate time-series extremes.
//!
//! This module loads the temperature anomaly, sea level and CO2
//! concentration series, indexes each of them in two [`OrderedMap`]s and
//! reports the lowest and highest reading of every series together with the
//! readings the other series recorded on the same date.
//!
//! # Pipeline
//!
//! 1. [`parse_line`] turns a CSV row into a normalized [`Observation`]
//! 2. [`SeriesIndex`] stores observations by value and by date
//! 3. [`Report::build`] reads the extremes and the same-date readings
//!
//! # Examples
//!
//! ```rust
//! use climate_extremes::climate::{Report, SeriesIndex, SeriesKind};
//!
//! let csv = "Entity,Code,Day,Average\n\
//!            World,OWID_WRL,1959-03-15,315.98\n\
//!            World,OWID_WRL,2019-05-15,414.66\n";
//!
//! let mut co2 = SeriesIndex::new(SeriesKind::Co2);
//! co2.ingest(csv.as_bytes(), "World", false).unwrap();
//!
//! let report = Report::build(&[co2]).unwrap();
//! assert_eq!(
//!     report.to_string(),
//!     "Lowest average CO2 concentration: 315.98 on 15/03/1959\n\n\
//!      Highest average CO2 concentration: 414.66 on 15/05/2019"
//! );
//! ```
//!
//! [`OrderedMap`]: crate::ordered::OrderedMap

mod config;
mod error;
mod record;
mod report;
mod series;

pub use config::{ClimateConfig, ClimateConfigBuilder};
pub use error::{ConfigurationError, IngestError, RecordError, ReportError};
pub use record::{DISPLAY_DATE_FORMAT, Observation, SeriesKind, format_date, parse_date, parse_line};
pub use report::{Bound, Extreme, Report, SameDateValue, format_value};
pub use series::{IngestStats, SeriesIndex};

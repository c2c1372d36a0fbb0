//! Error types for ingestion, configuration and reporting.

use std::path::PathBuf;

use thiserror::Error;

use super::SeriesKind;
use crate::ordered::OrderedMapError;

/// A single CSV row that could not be turned into an observation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The row has fewer than the four `entity,code,date,value` columns.
    #[error("expected at least 4 columns, found {found}")]
    MissingColumns {
        /// Number of columns present.
        found: usize,
    },

    /// The date column is neither `YYYY-MM-DD` nor `MM/DD/YYYY`.
    #[error("unrecognized date '{0}'")]
    InvalidDate(String),

    /// The value column is not a finite number.
    #[error("invalid value '{0}'")]
    InvalidValue(String),
}

/// Errors that can occur while loading a series.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The series file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path of the series file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The series reader failed part way through.
    #[error("failed to read series: {0}")]
    Read(#[from] std::io::Error),

    /// A region row is malformed and strict mode is enabled.
    #[error("malformed {series} row at line {line}: {source}")]
    Malformed {
        /// Series being ingested.
        series: SeriesKind,
        /// One-based line number.
        line: usize,
        /// What was wrong with the row.
        #[source]
        source: RecordError,
    },

    /// The backing map rejected an observation.
    #[error("ordered map error: {0}")]
    Map(#[from] OrderedMapError),
}

/// Errors that can occur while assembling a [`ClimateConfig`](super::ClimateConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {message}")]
    Unreadable {
        /// Path of the configuration file.
        path: String,
        /// Underlying failure description.
        message: String,
    },

    /// The configuration file is not valid YAML for this schema.
    #[error("malformed configuration: {0}")]
    Malformed(String),

    /// The region filter is empty.
    #[error("region must not be empty")]
    EmptyRegion,

    /// A required path is empty.
    #[error("{0} path must not be empty")]
    EmptyPath(&'static str),

    /// A boolean override is not `true`/`false`/`1`/`0`.
    #[error("invalid boolean for {variable}: '{value}'")]
    InvalidBoolean {
        /// Name of the environment variable.
        variable: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Errors that can occur while computing a report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A series holds no observations, so it has no extremes.
    #[error("{series} series has no observations")]
    EmptySeries {
        /// The empty series.
        series: SeriesKind,
        /// The underflow reported by the value index.
        #[source]
        source: OrderedMapError,
    },
}

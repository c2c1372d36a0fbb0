//! CSV row parsing and unit normalization.
//!
//! Input rows follow the `entity,code,date,value` layout. Only rows whose
//! entity matches the configured region become observations; every other
//! row (including the header) is ignored.

use std::fmt;

use chrono::NaiveDate;

use super::RecordError;

/// Date layouts accepted in the date column.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Layout used when a date is displayed.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

const FAHRENHEIT_PER_CELSIUS: f64 = 1.8;

// =============================================================================
// SeriesKind
// =============================================================================

/// The climate series a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SeriesKind {
    /// Global temperature anomaly, stored in degrees Fahrenheit.
    Temperature,
    /// Average sea level rise.
    SeaLevel,
    /// Average CO2 concentration.
    Co2,
}

impl SeriesKind {
    /// Every series in report order.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::SeaLevel, Self::Co2];

    /// Machine-friendly name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::SeaLevel => "sea_level",
            Self::Co2 => "co2",
        }
    }

    /// Subject of a report headline, e.g. `Lowest <subject>: ...`.
    #[must_use]
    pub const fn headline_subject(self) -> &'static str {
        match self {
            Self::Temperature => "temperature anomaly (F)",
            Self::SeaLevel => "sea level rise",
            Self::Co2 => "average CO2 concentration",
        }
    }

    /// Subject of a same-date line, e.g. `On that same date, <subject> was ...`.
    #[must_use]
    pub const fn same_date_subject(self) -> &'static str {
        match self {
            Self::Temperature => "the temperature anomaly (F)",
            Self::SeaLevel => "the average sea level rise",
            Self::Co2 => "the average CO2 concentration",
        }
    }

    /// Converts a raw reading into the stored unit, rounded to two decimals.
    ///
    /// Temperature anomalies arrive in degrees Celsius and are stored in
    /// degrees Fahrenheit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climate_extremes::climate::SeriesKind;
    ///
    /// assert_eq!(SeriesKind::Temperature.normalize(0.5), 0.9);
    /// assert_eq!(SeriesKind::Co2.normalize(411.456), 411.46);
    /// ```
    #[must_use]
    pub fn normalize(self, raw: f64) -> f64 {
        match self {
            Self::Temperature => round_to_hundredths(raw * FAHRENHEIT_PER_CELSIUS),
            Self::SeaLevel | Self::Co2 => round_to_hundredths(raw),
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Rounds half up to two decimal places.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

// =============================================================================
// Observation
// =============================================================================

/// A normalized `(date, value)` reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Calendar date of the reading.
    pub date: NaiveDate,
    /// Reading in the series' stored unit.
    pub value: f64,
}

/// Parses a date in either `YYYY-MM-DD` or `MM/DD/YYYY` layout.
///
/// # Errors
///
/// Returns [`RecordError::InvalidDate`] if neither layout matches.
///
/// # Examples
///
/// ```rust
/// use climate_extremes::climate::parse_date;
///
/// assert_eq!(parse_date("2016-01-15"), parse_date("01/15/2016"));
/// assert!(parse_date("15.01.2016").is_err());
/// ```
pub fn parse_date(text: &str) -> Result<NaiveDate, RecordError> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .ok_or_else(|| RecordError::InvalidDate(text.to_string()))
}

/// Formats a date as `DD/MM/YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parses one CSV row for `kind`.
///
/// Returns `Ok(None)` when the row belongs to another region.
///
/// # Errors
///
/// Returns a [`RecordError`] when a row of `region` has missing columns, an
/// unrecognized date or a non-finite value.
pub fn parse_line(kind: SeriesKind, line: &str, region: &str) -> Result<Option<Observation>, RecordError> {
    let columns: Vec<&str> = line.split(',').collect();
    if columns.first().map(|entity| entity.trim()) != Some(region) {
        return Ok(None);
    }
    let [_, _, date, value, ..] = columns.as_slice() else {
        return Err(RecordError::MissingColumns {
            found: columns.len(),
        });
    };

    let date = parse_date(date)?;
    let raw = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|raw| raw.is_finite())
        .ok_or_else(|| RecordError::InvalidValue(value.trim().to_string()))?;

    Ok(Some(Observation {
        date,
        value: kind.normalize(raw),
    }))
}

//! Per-series indices over normalized observations.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;

use super::report::Bound;
use super::{IngestError, Observation, ReportError, SeriesKind, parse_line};
use crate::ordered::{FloatOrder, OrderedMap, OrderedMapError};

/// Counters collected while ingesting one series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Observations stored in the index.
    pub ingested: usize,
    /// Region rows dropped because their date was already present.
    pub duplicates: usize,
    /// Malformed region rows skipped in lenient mode.
    pub skipped: usize,
    /// Rows belonging to other regions, including the header.
    pub other_rows: usize,
}

/// Two ordered views over one climate series.
///
/// `by_value` maps a reading to the date it was observed and answers the
/// extremal queries. `by_date` maps a date to its reading and answers the
/// same-date lookups made from other series.
///
/// The first observation for a date wins: later rows with the same date are
/// counted as duplicates and leave both maps untouched. When two dates share
/// a reading, `by_value` keeps the later date.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use climate_extremes::climate::{Bound, Observation, SeriesIndex, SeriesKind};
///
/// let mut index = SeriesIndex::new(SeriesKind::Co2);
/// let date = NaiveDate::from_ymd_opt(2019, 5, 1).unwrap();
/// index.record(Observation { date, value: 414.7 }).unwrap();
///
/// assert_eq!(index.value_on(date), Some(414.7));
/// assert_eq!(index.extreme(Bound::Highest), Ok((414.7, date)));
/// ```
#[derive(Debug, Clone)]
pub struct SeriesIndex {
    kind: SeriesKind,
    by_value: OrderedMap<f64, NaiveDate, FloatOrder>,
    by_date: OrderedMap<NaiveDate, f64>,
}

impl SeriesIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new(kind: SeriesKind) -> Self {
        Self {
            kind,
            by_value: OrderedMap::with_order(FloatOrder),
            by_date: OrderedMap::new(),
        }
    }

    /// Returns the series this index holds.
    #[must_use]
    pub const fn kind(&self) -> SeriesKind {
        self.kind
    }

    /// Returns the number of distinct dates recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Records an observation unless its date is already present.
    ///
    /// Returns `Ok(false)` for a duplicate date.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::InvalidArgument`] if the value is `NaN`.
    pub fn record(&mut self, observation: Observation) -> Result<bool, OrderedMapError> {
        if self.by_date.contains(&observation.date) {
            return Ok(false);
        }
        self.by_value.insert(observation.value, observation.date)?;
        self.by_date.insert(observation.date, observation.value)?;
        Ok(true)
    }

    /// Returns the reading observed on `date`, if any.
    #[must_use]
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.by_date.get(&date).ok().flatten().copied()
    }

    /// Returns the lowest or highest reading with the date it was observed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::EmptySeries`] if nothing has been recorded.
    pub fn extreme(&self, bound: Bound) -> Result<(f64, NaiveDate), ReportError> {
        let entry = match bound {
            Bound::Lowest => self.by_value.min_entry(),
            Bound::Highest => self.by_value.max_entry(),
        };
        entry
            .map(|(value, date)| (*value, *date))
            .ok_or(ReportError::EmptySeries {
                series: self.kind,
                source: OrderedMapError::underflow(bound.operation()),
            })
    }

    /// Returns the observations dated within `[from, to]` in date order.
    ///
    /// # Errors
    ///
    /// Propagates the range error of the date index.
    pub fn observations_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Observation>, OrderedMapError> {
        let dates = self.by_date.keys_in(&from, &to)?;
        Ok(dates
            .filter_map(|date| {
                self.value_on(*date).map(|value| Observation { date: *date, value })
            })
            .collect())
    }

    /// Ingests every row of `reader` that belongs to `region`.
    ///
    /// Malformed region rows are logged and skipped, or abort ingestion when
    /// `strict` is set.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Read`] if the reader fails and
    /// [`IngestError::Malformed`] for the first malformed row in strict mode.
    pub fn ingest<R: BufRead>(&mut self, reader: R, region: &str, strict: bool) -> Result<IngestStats, IngestError> {
        let mut stats = IngestStats::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            match parse_line(self.kind, &line, region) {
                Ok(Some(observation)) => {
                    if self.record(observation)? {
                        stats.ingested += 1;
                    } else {
                        stats.duplicates += 1;
                    }
                }
                Ok(None) => stats.other_rows += 1,
                Err(source) if strict => {
                    return Err(IngestError::Malformed {
                        series: self.kind,
                        line: number,
                        source,
                    });
                }
                Err(error) => {
                    tracing::warn!(series = %self.kind, line = number, %error, "skipping malformed row");
                    stats.skipped += 1;
                }
            }
        }

        tracing::debug!(series = %self.kind, other_rows = stats.other_rows, region, "ignored rows outside region");
        tracing::info!(
            series = %self.kind,
            ingested = stats.ingested,
            duplicates = stats.duplicates,
            skipped = stats.skipped,
            "series ingested"
        );
        Ok(stats)
    }

    /// Opens `path` and ingests it into a fresh index.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] if the file cannot be opened or read, and
    /// otherwise whatever [`ingest`](Self::ingest) reports.
    pub fn from_path(
        kind: SeriesKind,
        path: &Path,
        region: &str,
        strict: bool,
    ) -> Result<(Self, IngestStats), IngestError> {
        let attach_path = |source: std::io::Error| IngestError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(attach_path)?;
        let mut index = Self::new(kind);
        let stats = index
            .ingest(BufReader::new(file), region, strict)
            .map_err(|error| match error {
                IngestError::Read(source) => attach_path(source),
                other => other,
            })?;
        Ok((index, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const SEA_LEVEL_CSV: &str = "\
Entity,Code,Day,Global sea level
World,OWID_WRL,1993-01-15,-3.45
Northern Hemisphere,,1993-01-15,-2.00
World,OWID_WRL,1993-02-15,1.27
World,OWID_WRL,02/15/1993,9.99
World,OWID_WRL,1993-03-15,not-a-number
World,OWID_WRL,1993-04-15,1.27
";

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[fixture]
    fn sea_level() -> (SeriesIndex, IngestStats) {
        let mut index = SeriesIndex::new(SeriesKind::SeaLevel);
        let stats = index.ingest(SEA_LEVEL_CSV.as_bytes(), "World", false).unwrap();
        (index, stats)
    }

    #[rstest]
    fn test_ingest_counts(sea_level: (SeriesIndex, IngestStats)) {
        let (index, stats) = sea_level;
        assert_eq!(
            stats,
            IngestStats {
                ingested: 3,
                duplicates: 1,
                skipped: 1,
                other_rows: 2,
            }
        );
        assert_eq!(index.len(), 3);
    }

    #[rstest]
    fn test_first_observation_for_date_wins(sea_level: (SeriesIndex, IngestStats)) {
        let (index, _) = sea_level;
        assert_eq!(index.value_on(date(1993, 2, 15)), Some(1.27));
    }

    #[rstest]
    fn test_equal_values_keep_later_date(sea_level: (SeriesIndex, IngestStats)) {
        let (index, _) = sea_level;
        assert_eq!(index.extreme(Bound::Highest), Ok((1.27, date(1993, 4, 15))));
        assert_eq!(index.extreme(Bound::Lowest), Ok((-3.45, date(1993, 1, 15))));
    }

    #[rstest]
    fn test_strict_mode_reports_line() {
        let mut index = SeriesIndex::new(SeriesKind::SeaLevel);
        let error = index.ingest(SEA_LEVEL_CSV.as_bytes(), "World", true).unwrap_err();
        assert!(matches!(
            error,
            IngestError::Malformed {
                series: SeriesKind::SeaLevel,
                line: 6,
                ..
            }
        ));
        assert_eq!(index.len(), 2);
    }

    #[rstest]
    fn test_extreme_of_empty_series() {
        let index = SeriesIndex::new(SeriesKind::Co2);
        let error = index.extreme(Bound::Lowest).unwrap_err();
        assert_eq!(
            error,
            ReportError::EmptySeries {
                series: SeriesKind::Co2,
                source: OrderedMapError::underflow("min"),
            }
        );
    }

    #[rstest]
    fn test_observations_between(sea_level: (SeriesIndex, IngestStats)) {
        let (index, _) = sea_level;
        let observations = index
            .observations_between(date(1993, 2, 1), date(1993, 12, 31))
            .unwrap();
        let dates: Vec<NaiveDate> = observations.iter().map(|observation| observation.date).collect();
        assert_eq!(dates, vec![date(1993, 2, 15), date(1993, 4, 15)]);
    }

    #[rstest]
    fn test_record_rejects_nan_without_mutation() {
        let mut index = SeriesIndex::new(SeriesKind::Temperature);
        let observation = Observation {
            date: date(2000, 1, 15),
            value: f64::NAN,
        };
        assert!(index.record(observation).is_err());
        assert!(index.is_empty());
        assert_eq!(index.value_on(date(2000, 1, 15)), None);
    }

    #[rstest]
    fn test_from_path_missing_file() {
        let error = SeriesIndex::from_path(
            SeriesKind::Temperature,
            Path::new("definitely/not/here.csv"),
            "World",
            false,
        )
        .unwrap_err();
        assert!(matches!(error, IngestError::Io { .. }));
    }
}

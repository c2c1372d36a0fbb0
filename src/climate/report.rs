//! Extremes report across the climate series.

use std::fmt;

use chrono::NaiveDate;

use super::{ReportError, SeriesIndex, SeriesKind, format_date};

/// Which end of a series an [`Extreme`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Bound {
    /// The minimum reading.
    Lowest,
    /// The maximum reading.
    Highest,
}

impl Bound {
    /// Both bounds in report order.
    pub const BOTH: [Self; 2] = [Self::Lowest, Self::Highest];

    /// Headline prefix.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lowest => "Lowest",
            Self::Highest => "Highest",
        }
    }

    pub(crate) const fn operation(self) -> &'static str {
        match self {
            Self::Lowest => "min",
            Self::Highest => "max",
        }
    }
}

/// A reading from another series taken on the date of an extreme.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SameDateValue {
    /// Series the reading comes from.
    pub series: SeriesKind,
    /// The reading.
    pub value: f64,
}

/// The lowest or highest reading of one series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Extreme {
    /// Series the extreme belongs to.
    pub series: SeriesKind,
    /// Whether this is the minimum or the maximum.
    pub bound: Bound,
    /// The extremal reading.
    pub value: f64,
    /// Date the reading was observed.
    pub date: NaiveDate,
    /// Readings of the other series on the same date, in report order.
    pub same_date: Vec<SameDateValue>,
}

impl fmt::Display for Extreme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} {}: {} on {}",
            self.bound.label(),
            self.series.headline_subject(),
            format_value(self.value),
            format_date(self.date)
        )?;
        for other in &self.same_date {
            write!(
                formatter,
                "\nOn that same date, {} was {}",
                other.series.same_date_subject(),
                format_value(other.value)
            )?;
        }
        Ok(())
    }
}

/// Lowest and highest readings of every series.
///
/// Rendered as text, each extreme is one block and blocks are separated by a
/// blank line:
///
/// ```text
/// Lowest temperature anomaly (F): -1.33 on 15/01/1893
/// On that same date, the average CO2 concentration was 294.2
///
/// Highest temperature anomaly (F): 2.3 on 15/02/2016
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    /// Extremes in report order.
    pub extremes: Vec<Extreme>,
}

impl Report {
    /// Computes the extremes of every index in `series`.
    ///
    /// Blocks follow the order of `series`, lowest before highest. Same-date
    /// readings are looked up in every other index, also in the order of
    /// `series`, and only present when that index has a reading on the date.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::EmptySeries`] if any index is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use climate_extremes::climate::{Observation, Report, SeriesIndex, SeriesKind};
    ///
    /// let date = NaiveDate::from_ymd_opt(2016, 2, 15).unwrap();
    /// let mut temperature = SeriesIndex::new(SeriesKind::Temperature);
    /// temperature.record(Observation { date, value: 2.3 }).unwrap();
    /// let mut co2 = SeriesIndex::new(SeriesKind::Co2);
    /// co2.record(Observation { date, value: 404.0 }).unwrap();
    ///
    /// let report = Report::build(&[temperature, co2]).unwrap();
    /// assert_eq!(
    ///     report.extremes[0].to_string(),
    ///     "Lowest temperature anomaly (F): 2.3 on 15/02/2016\n\
    ///      On that same date, the average CO2 concentration was 404.0"
    /// );
    /// ```
    pub fn build(series: &[SeriesIndex]) -> Result<Self, ReportError> {
        let mut extremes = Vec::with_capacity(series.len() * Bound::BOTH.len());
        for index in series {
            for bound in Bound::BOTH {
                let (value, date) = index.extreme(bound)?;
                let same_date: Vec<SameDateValue> = series
                    .iter()
                    .filter(|other| other.kind() != index.kind())
                    .filter_map(|other| {
                        other.value_on(date).map(|value| SameDateValue {
                            series: other.kind(),
                            value,
                        })
                    })
                    .collect();
                tracing::debug!(
                    series = %index.kind(),
                    bound = ?bound,
                    value,
                    %date,
                    same_date = same_date.len(),
                    "extreme computed"
                );
                extremes.push(Extreme {
                    series: index.kind(),
                    bound,
                    value,
                    date,
                    same_date,
                });
            }
        }
        Ok(Self { extremes })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, extreme) in self.extremes.iter().enumerate() {
            if position > 0 {
                formatter.write_str("\n\n")?;
            }
            write!(formatter, "{extreme}")?;
        }
        Ok(())
    }
}

/// Formats a reading the way report readers expect: whole numbers keep one
/// decimal place (`280.0`), everything else uses the shortest exact form.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::Observation;
    use rstest::{fixture, rstest};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn index(kind: SeriesKind, readings: &[(NaiveDate, f64)]) -> SeriesIndex {
        let mut index = SeriesIndex::new(kind);
        for &(date, value) in readings {
            index.record(Observation { date, value }).unwrap();
        }
        index
    }

    #[fixture]
    fn series() -> Vec<SeriesIndex> {
        vec![
            index(
                SeriesKind::Temperature,
                &[(date(1993, 1, 15), -0.5), (date(2016, 2, 15), 2.3)],
            ),
            index(
                SeriesKind::SeaLevel,
                &[(date(1993, 1, 15), -3.45), (date(2016, 2, 15), 80.12)],
            ),
            index(
                SeriesKind::Co2,
                &[(date(1960, 1, 15), 316.0), (date(2016, 2, 15), 404.28)],
            ),
        ]
    }

    #[rstest]
    #[case(0.57, "0.57")]
    #[case(-1.2, "-1.2")]
    #[case(280.0, "280.0")]
    #[case(0.0, "0.0")]
    fn test_format_value(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_value(value), expected);
    }

    #[rstest]
    fn test_block_order(series: Vec<SeriesIndex>) {
        let report = Report::build(&series).unwrap();
        let order: Vec<(SeriesKind, Bound)> = report
            .extremes
            .iter()
            .map(|extreme| (extreme.series, extreme.bound))
            .collect();
        assert_eq!(
            order,
            vec![
                (SeriesKind::Temperature, Bound::Lowest),
                (SeriesKind::Temperature, Bound::Highest),
                (SeriesKind::SeaLevel, Bound::Lowest),
                (SeriesKind::SeaLevel, Bound::Highest),
                (SeriesKind::Co2, Bound::Lowest),
                (SeriesKind::Co2, Bound::Highest),
            ]
        );
    }

    #[rstest]
    fn test_same_date_skips_missing_series(series: Vec<SeriesIndex>) {
        let report = Report::build(&series).unwrap();
        let lowest_co2 = &report.extremes[4];
        assert_eq!(lowest_co2.date, date(1960, 1, 15));
        assert!(lowest_co2.same_date.is_empty());

        let lowest_temperature = &report.extremes[0];
        assert_eq!(
            lowest_temperature.same_date,
            vec![SameDateValue {
                series: SeriesKind::SeaLevel,
                value: -3.45
            }]
        );
    }

    #[rstest]
    fn test_render_text(series: Vec<SeriesIndex>) {
        let report = Report::build(&series).unwrap();
        let expected = "\
Lowest temperature anomaly (F): -0.5 on 15/01/1993
On that same date, the average sea level rise was -3.45

Highest temperature anomaly (F): 2.3 on 15/02/2016
On that same date, the average sea level rise was 80.12
On that same date, the average CO2 concentration was 404.28

Lowest sea level rise: -3.45 on 15/01/1993
On that same date, the temperature anomaly (F) was -0.5

Highest sea level rise: 80.12 on 15/02/2016
On that same date, the temperature anomaly (F) was 2.3
On that same date, the average CO2 concentration was 404.28

Lowest average CO2 concentration: 316.0 on 15/01/1960

Highest average CO2 concentration: 404.28 on 15/02/2016
On that same date, the temperature anomaly (F) was 2.3
On that same date, the average sea level rise was 80.12";
        assert_eq!(report.to_string(), expected);
    }

    #[rstest]
    fn test_empty_series_fails(mut series: Vec<SeriesIndex>) {
        series.push(SeriesIndex::new(SeriesKind::Co2));
        series.swap(2, 3);
        let error = Report::build(&series).unwrap_err();
        assert!(matches!(
            error,
            ReportError::EmptySeries {
                series: SeriesKind::Co2,
                ..
            }
        ));
    }
}

//! Date range filtering and axis bounds

use crate::core::series::Series;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A `[from, to)` calendar interval. `from` may be after `to`, in which case
/// nothing falls inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateInterval {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Lower bound inclusive, upper bound exclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date < self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

impl Display for DateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

/// Min and max of a series' values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn as_range(&self) -> [f64; 2] {
        [self.min, self.max]
    }
}

/// Returns the observations of `series` whose date lies in `[from, to)`.
pub fn filter(series: &Series, interval: DateInterval) -> Series {
    if interval.is_empty() {
        return Series::default();
    }

    let points = series.points();
    let start = points.partition_point(|p| p.date < interval.from);
    let end = points.partition_point(|p| p.date < interval.to);
    Series::from_sorted(points[start..end].to_vec())
}

/// Min/max of the values, skipping missing (NaN) entries. `None` when there
/// is nothing to measure.
pub fn bounds(series: &Series) -> Option<Bounds> {
    series
        .values()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<Bounds>, v| match acc {
            None => Some(Bounds { min: v, max: v }),
            Some(b) => Some(Bounds {
                min: b.min.min(v),
                max: b.max.max(v),
            }),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::Observation;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_prices() -> Series {
        Series::from_points(vec![
            Observation::new(date("2019-01-30"), 100.0),
            Observation::new(date("2019-01-31"), 102.0),
            Observation::new(date("2019-02-01"), 98.0),
        ])
    }

    #[test]
    fn test_filter_half_open_interval() {
        let series = sample_prices();
        let interval = DateInterval::new(date("2019-01-31"), date("2019-02-01"));

        let subset = filter(&series, interval);

        assert_eq!(
            subset.points(),
            &[Observation::new(date("2019-01-31"), 102.0)]
        );
        assert_eq!(
            bounds(&subset),
            Some(Bounds {
                min: 102.0,
                max: 102.0
            })
        );
    }

    #[test]
    fn test_filter_respects_interval_for_every_point() {
        let start = date("2019-01-01");
        let series = Series::from_points(
            (0..60).map(|i| Observation::new(start + chrono::Duration::days(i), i as f64)),
        );
        let interval = DateInterval::new(date("2019-01-10"), date("2019-02-05"));

        let subset = filter(&series, interval);

        assert_eq!(subset.len(), 26);
        assert!(subset.dates().all(|d| interval.contains(d)));
        let outside = series.dates().filter(|d| !interval.contains(*d)).count();
        assert_eq!(outside + subset.len(), series.len());
    }

    #[test]
    fn test_filter_equal_bounds_is_empty() {
        let series = sample_prices();
        let d = date("2019-01-31");

        let subset = filter(&series, DateInterval::new(d, d));

        assert!(subset.is_empty());
        assert_eq!(bounds(&subset), None);
    }

    #[test]
    fn test_filter_inverted_interval_is_empty() {
        let series = sample_prices();
        let interval = DateInterval::new(date("2019-02-01"), date("2019-01-30"));

        assert!(interval.is_empty());
        assert!(filter(&series, interval).is_empty());
    }

    #[test]
    fn test_filter_out_of_range_is_empty() {
        let series = sample_prices();
        let interval = DateInterval::new(date("2021-01-01"), date("2022-01-01"));

        assert!(filter(&series, interval).is_empty());
    }

    #[test]
    fn test_bounds_skips_missing_values() {
        let series = Series::from_points(vec![
            Observation::new(date("2019-01-30"), f64::NAN),
            Observation::new(date("2019-01-31"), -4.5),
            Observation::new(date("2019-02-01"), 12.0),
        ]);

        assert_eq!(
            bounds(&series),
            Some(Bounds {
                min: -4.5,
                max: 12.0
            })
        );

        let all_missing =
            Series::from_points(vec![Observation::new(date("2019-01-30"), f64::NAN)]);
        assert_eq!(bounds(&all_missing), None);
    }
}

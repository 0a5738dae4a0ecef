//! Date normalization, range bounds and range application.
//!
//! Shaping never touches the store again and never mutates a result set in
//! place: every filter step returns a new [`ShapedRecords`].

use chrono::NaiveDate;
use rcm_db::models::ObservationRecord;
use rcm_utils::dates::{parse_date, parse_timestamp_date};
use serde::Serialize;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateBounds {
    /// Build a range from two endpoints given in any order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersection with `extent`, or `None` when they do not overlap.
    pub fn clamp_to(&self, extent: &DateBounds) -> Option<DateBounds> {
        let start = self.start.max(extent.start);
        let end = self.end.min(extent.end);
        (start <= end).then_some(DateBounds { start, end })
    }
}

/// An observation together with its calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRecord {
    pub date: NaiveDate,
    pub record: ObservationRecord,
}

/// A query result keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedRecords {
    rows: Vec<DatedRecord>,
}

impl ShapedRecords {
    /// Attach a calendar date to every row, keeping the query order.
    ///
    /// Rows whose timestamp cannot be read as a date are dropped.
    pub fn from_records(records: Vec<ObservationRecord>) -> Self {
        let total = records.len();
        let rows: Vec<DatedRecord> = records
            .into_iter()
            .filter_map(|record| {
                let parsed = match record.date.as_deref() {
                    Some(date) => parse_date(date),
                    None => parse_timestamp_date(&record.datetime),
                };
                match parsed {
                    Ok(date) => Some(DatedRecord { date, record }),
                    Err(e) => {
                        log::warn!(
                            "[RCM Debug] shaper: dropping row with unreadable timestamp '{}': {}",
                            record.datetime,
                            e
                        );
                        None
                    }
                }
            })
            .collect();
        if rows.len() < total {
            log::warn!(
                "[RCM Debug] shaper: kept {} of {} rows",
                rows.len(),
                total
            );
        }
        Self { rows }
    }

    /// Earliest and latest date, or `None` for an empty set.
    pub fn date_bounds(&self) -> Option<DateBounds> {
        let start = self.rows.iter().map(|r| r.date).min()?;
        let end = self.rows.iter().map(|r| r.date).max()?;
        Some(DateBounds { start, end })
    }

    /// Rows whose date lies inside `range` (both ends inclusive).
    pub fn apply_range(&self, range: DateBounds) -> ShapedRecords {
        self.filtered(|r| range.contains(r.date))
    }

    /// Rows for one parameter (VV, VH, NDVI, ...).
    pub fn partition(&self, parameter: &str) -> ShapedRecords {
        self.filtered(|r| r.record.parameter == parameter)
    }

    fn filtered<F: Fn(&DatedRecord) -> bool>(&self, keep: F) -> ShapedRecords {
        ShapedRecords {
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[DatedRecord] {
        &self.rows
    }

    /// The underlying observations in their original order.
    pub fn records(&self) -> impl Iterator<Item = &ObservationRecord> {
        self.rows.iter().map(|r| &r.record)
    }

    /// `(date, value)` pairs for plotting.
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|r| (r.date, r.record.value)).collect()
    }
}

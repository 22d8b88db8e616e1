use serde::{Deserialize, Serialize};

use crate::reading::Reading;
use crate::time_bucket::{Period, TimeBucket};

const SECONDS_PER_DAY: i64 = 86_400;

/// Row as persisted: the reading plus the calendar fields it was filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: u64,
    pub time_stamp: i64,
    pub time_year: i32,
    pub time_month: u32,
    pub time_day: u32,
    pub reading: Reading,
}

impl StoredRow {
    pub fn new(id: u64, bucket: &TimeBucket, reading: Reading) -> Self {
        Self {
            id,
            time_stamp: bucket.timestamp,
            time_year: bucket.year,
            time_month: bucket.month,
            time_day: bucket.day,
            reading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Max,
    Min,
}

impl AggregateOp {
    pub fn apply(self, values: impl IntoIterator<Item = f64>) -> Option<f64> {
        values.into_iter().reduce(|current, value| match self {
            Self::Max => current.max(value),
            Self::Min => current.min(value),
        })
    }
}

/// Row selection. Calendar fields are matched against the values stored with
/// each row; `start..end` bounds the key scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub start: i64,
    pub end: i64,
}

impl RowFilter {
    /// Filter for the `period` containing `bucket`. Year, month and day match
    /// on stored calendar fields with a scan range padded by a day either
    /// side; weeks match on their time range alone.
    pub fn for_period(bucket: &TimeBucket, period: Period) -> Option<Self> {
        let (start, end) = bucket.period_range(period)?;

        let filter = match period {
            Period::Week => Self {
                year: None,
                month: None,
                day: None,
                start,
                end,
            },
            Period::Year => Self {
                year: Some(bucket.year),
                ..Self::padded(start, end)
            },
            Period::Month => Self {
                year: Some(bucket.year),
                month: Some(bucket.month),
                ..Self::padded(start, end)
            },
            Period::Day => Self {
                year: Some(bucket.year),
                month: Some(bucket.month),
                day: Some(bucket.day),
                ..Self::padded(start, end)
            },
        };
        Some(filter)
    }

    fn padded(start: i64, end: i64) -> Self {
        Self {
            year: None,
            month: None,
            day: None,
            start: start.saturating_sub(SECONDS_PER_DAY),
            end: end.saturating_add(SECONDS_PER_DAY),
        }
    }

    pub fn matches(&self, row: &StoredRow) -> bool {
        row.time_stamp >= self.start
            && row.time_stamp < self.end
            && self.year.is_none_or(|year| row.time_year == year)
            && self.month.is_none_or(|month| row.time_month == month)
            && self.day.is_none_or(|day| row.time_day == day)
    }
}

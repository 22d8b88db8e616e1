use std::fmt;

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Aggregation granularity. Days nest in months and months in years; weeks
/// also subdivide the year but sit beside months rather than inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Periods an extremum update walks through, starting with `self`.
    /// Week is its own axis and never feeds month or year.
    pub fn cascade(self) -> &'static [Period] {
        match self {
            Self::Day => &[Period::Day, Period::Month, Period::Year],
            Self::Month => &[Period::Month, Period::Year],
            Self::Year => &[Period::Year],
            Self::Week => &[Period::Week],
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete period a statistic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    Year { year: i32 },
    Month { year: i32, month: u32 },
    Week { start: NaiveDate },
    Day { year: i32, month: u32, day: u32 },
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year { year } => write!(f, "{}", year),
            Self::Month { year, month } => write!(f, "{}-{:02}", year, month),
            Self::Week { start } => write!(f, "week-{}", start.format("%Y-%m-%d")),
            Self::Day { year, month, day } => write!(f, "{}-{:02}-{:02}", year, month, day),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucket {
    pub timestamp: i64,
    pub offset: FixedOffset,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// ISO week number of the date.
    pub week: u32,
    /// Sunday on or before the date.
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

impl TimeBucket {
    /// Splits a unix timestamp into calendar fields as seen from `offset`.
    /// Returns `None` only for timestamps chrono cannot represent.
    pub fn from_timestamp(timestamp: i64, offset: FixedOffset) -> Option<Self> {
        let local = DateTime::from_timestamp(timestamp, 0)?.with_timezone(&offset);
        let date = local.date_naive();

        let back = (date.weekday().num_days_from_monday() + 1) % 7;
        let week_start = date.checked_sub_days(Days::new(u64::from(back)))?;
        let week_end = week_start.checked_add_days(Days::new(6))?;

        Some(Self {
            timestamp,
            offset,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            week: date.iso_week().week(),
            week_start,
            week_end,
        })
    }

    /// Day of month of the week's first day. Ambiguous when the week spans a
    /// month boundary; use `week_start` when the full date matters.
    pub fn week_start_day(&self) -> u32 {
        self.week_start.day()
    }

    pub fn week_end_day(&self) -> u32 {
        self.week_end.day()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn period_key(&self, period: Period) -> PeriodKey {
        match period {
            Period::Year => PeriodKey::Year { year: self.year },
            Period::Month => PeriodKey::Month {
                year: self.year,
                month: self.month,
            },
            Period::Week => PeriodKey::Week {
                start: self.week_start,
            },
            Period::Day => PeriodKey::Day {
                year: self.year,
                month: self.month,
                day: self.day,
            },
        }
    }

    /// Half-open `[start, end)` unix range covering `period`, with both
    /// boundaries at local midnight.
    pub fn period_range(&self, period: Period) -> Option<(i64, i64)> {
        let (first, next) = match period {
            Period::Day => {
                let date = self.date()?;
                (date, date.checked_add_days(Days::new(1))?)
            }
            Period::Week => (self.week_start, self.week_start.checked_add_days(Days::new(7))?),
            Period::Month => {
                let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
                (first, first.checked_add_months(Months::new(1))?)
            }
            Period::Year => {
                let first = NaiveDate::from_ymd_opt(self.year, 1, 1)?;
                (first, NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?)
            }
        };

        Some((self.local_midnight(first)?, self.local_midnight(next)?))
    }

    fn local_midnight(&self, date: NaiveDate) -> Option<i64> {
        let naive = date.and_hms_opt(0, 0, 0)?;
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|moment| moment.timestamp())
    }
}

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use super::defaults::*;
use crate::time_bucket::Period;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub trend: TrendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

/// Where cached statistics live. `sled` shares them across processes through
/// the record database; `memory` keeps them for the life of one process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Sled,
    Memory,
}

/// Expiry applied to every cache entry, by period granularity.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "default_year_ttl_secs")]
    pub year_ttl_secs: u64,
    #[serde(default = "default_month_ttl_secs")]
    pub month_ttl_secs: u64,
    #[serde(default = "default_week_ttl_secs")]
    pub week_ttl_secs: u64,
    #[serde(default = "default_day_ttl_secs")]
    pub day_ttl_secs: u64,
    #[serde(default = "default_latest_ttl_secs")]
    pub latest_ttl_secs: u64,
}

impl CacheConfig {
    pub fn period_ttl(&self, period: Period) -> Duration {
        let secs = match period {
            Period::Year => self.year_ttl_secs,
            Period::Month => self.month_ttl_secs,
            Period::Week => self.week_ttl_secs,
            Period::Day => self.day_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn latest_ttl(&self) -> Duration {
        Duration::from_secs(self.latest_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeConfig {
    /// Offset of the deployment's local time from UTC. Readings are bucketed
    /// into year/month/day in this offset.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl TimeConfig {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendConfig {
    #[serde(default = "default_trend_raw_limit")]
    pub raw_limit: usize,
    #[serde(default = "default_trend_bucket_size")]
    pub bucket_size: usize,
}

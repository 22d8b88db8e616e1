use super::schema::{CacheBackend, CacheConfig, StoreConfig, TimeConfig, TrendConfig};

pub(super) fn default_store_path() -> String {
    "data/solarweather".to_string()
}

pub(super) fn default_year_ttl_secs() -> u64 {
    3600
}

pub(super) fn default_month_ttl_secs() -> u64 {
    3600
}

pub(super) fn default_week_ttl_secs() -> u64 {
    1800
}

pub(super) fn default_day_ttl_secs() -> u64 {
    600
}

pub(super) fn default_latest_ttl_secs() -> u64 {
    3600
}

pub(super) fn default_utc_offset_minutes() -> i32 {
    0
}

pub(super) fn default_trend_raw_limit() -> usize {
    250
}

pub(super) fn default_trend_bucket_size() -> usize {
    50
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            year_ttl_secs: default_year_ttl_secs(),
            month_ttl_secs: default_month_ttl_secs(),
            week_ttl_secs: default_week_ttl_secs(),
            day_ttl_secs: default_day_ttl_secs(),
            latest_ttl_secs: default_latest_ttl_secs(),
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            raw_limit: default_trend_raw_limit(),
            bucket_size: default_trend_bucket_size(),
        }
    }
}

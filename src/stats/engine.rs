use std::sync::{Arc, PoisonError};
use std::time::Duration;

use chrono::FixedOffset;

use super::StatsError;
use super::accumulate::accumulate;
use super::locks::KeyLocks;
use crate::cache::{CacheKey, ExtremumStore, StatKind};
use crate::config::{CacheConfig, Config};
use crate::metric::{Domain, Metric};
use crate::reading::Reading;
use crate::record_store::{AggregateOp, RecordStore, RowFilter};
use crate::series::SeriesPoint;
use crate::time_bucket::{Period, TimeBucket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

impl Extremum {
    pub const ALL: [Extremum; 2] = [Extremum::Max, Extremum::Min];

    fn kind(self) -> StatKind {
        match self {
            Self::Max => StatKind::Max,
            Self::Min => StatKind::Min,
        }
    }

    fn op(self) -> AggregateOp {
        match self {
            Self::Max => AggregateOp::Max,
            Self::Min => AggregateOp::Min,
        }
    }

    /// Strictly better than `current`; ties and NaN never win.
    fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Self::Max => candidate > current,
            Self::Min => candidate < current,
        }
    }
}

/// Cache-backed statistics over one domain's record store.
///
/// Every cache failure is logged and treated as a miss, so the store stays
/// the source of truth. Extremum updates hold a per-key lock across their
/// read-compare-write.
pub struct StatsEngine {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn ExtremumStore>,
    ttl: CacheConfig,
    offset: FixedOffset,
    locks: KeyLocks,
}

impl StatsEngine {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn ExtremumStore>, config: &Config) -> Self {
        Self {
            store,
            cache,
            ttl: config.cache.clone(),
            offset: config.time.offset(),
            locks: KeyLocks::default(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.store.domain()
    }

    pub fn bucket(&self, time_stamp: i64) -> Result<TimeBucket, StatsError> {
        TimeBucket::from_timestamp(time_stamp, self.offset)
            .ok_or(StatsError::InvalidTimestamp(time_stamp))
    }

    /// Resolves a metric name, rejecting names outside this domain's
    /// allow-list.
    pub fn metric(&self, name: &str) -> Result<Metric, StatsError> {
        let metric = name.parse::<Metric>()?;
        self.check_metric(metric)?;
        Ok(metric)
    }

    pub fn insert(&self, reading: &Reading) -> Result<u64, StatsError> {
        Ok(self.store.insert(reading)?)
    }

    /// Max or min of `metric` over the period containing `bucket`. A period
    /// without rows yields 0. The resolved value is written back to the cache.
    pub fn get_extremum(
        &self,
        metric: Metric,
        extremum: Extremum,
        period: Period,
        bucket: &TimeBucket,
        use_cache: bool,
    ) -> Result<f64, StatsError> {
        self.check_metric(metric)?;
        let key = CacheKey::extremum(extremum.kind(), metric, bucket.period_key(period));
        let lock = self.locks.lock_for(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.resolve_extremum(key, extremum, period, bucket, use_cache)
    }

    /// Offers `value` as a new extremum for the period containing `bucket`,
    /// then for each enclosing period in turn until one is not improved.
    /// Returns whether the first period changed.
    pub fn set_extremum(
        &self,
        metric: Metric,
        extremum: Extremum,
        period: Period,
        bucket: &TimeBucket,
        value: f64,
    ) -> Result<bool, StatsError> {
        self.check_metric(metric)?;

        let mut first_updated = false;
        for (depth, step) in period.cascade().iter().copied().enumerate() {
            let updated = self.offer_extremum(metric, extremum, step, bucket, value)?;
            if depth == 0 {
                first_updated = updated;
            }
            if !updated {
                break;
            }
        }
        Ok(first_updated)
    }

    pub fn get_latest(&self, metric: Metric) -> Result<Option<f64>, StatsError> {
        self.check_metric(metric)?;
        Ok(self.cached(&CacheKey::latest(metric)))
    }

    /// Last write wins, regardless of the reading's timestamp.
    pub fn set_latest(&self, metric: Metric, value: f64) -> Result<(), StatsError> {
        self.check_metric(metric)?;
        self.remember(CacheKey::latest(metric), value, self.ttl.latest_ttl());
        Ok(())
    }

    /// Newest stored point of `metric`, read straight from the store.
    pub fn latest_row(&self, metric: Metric) -> Result<Option<SeriesPoint>, StatsError> {
        self.check_metric(metric)?;
        Ok(self.store.latest(metric)?)
    }

    pub fn get_accumulated(
        &self,
        metric: Metric,
        period: Period,
        bucket: &TimeBucket,
        use_cache: bool,
    ) -> Result<f64, StatsError> {
        self.check_metric(metric)?;
        let key = CacheKey::accumulated(metric, bucket.period_key(period));
        if use_cache && let Some(value) = self.cached(&key) {
            return Ok(value);
        }

        let series = self.store.query(&self.filter(bucket, period)?, metric)?;
        let value = accumulate(&series);
        self.remember(key, value, self.ttl.period_ttl(period));
        Ok(value)
    }

    /// Raw, ascending series for the period. Never cached.
    pub fn get_trend(
        &self,
        metric: Metric,
        period: Period,
        bucket: &TimeBucket,
    ) -> Result<Vec<SeriesPoint>, StatsError> {
        self.check_metric(metric)?;
        Ok(self.store.query(&self.filter(bucket, period)?, metric)?)
    }

    pub fn clear_cache(&self) -> Result<(), StatsError> {
        Ok(self.cache.clear_all()?)
    }

    fn offer_extremum(
        &self,
        metric: Metric,
        extremum: Extremum,
        period: Period,
        bucket: &TimeBucket,
        value: f64,
    ) -> Result<bool, StatsError> {
        let key = CacheKey::extremum(extremum.kind(), metric, bucket.period_key(period));
        let lock = self.locks.lock_for(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.resolve_extremum(key, extremum, period, bucket, true)?;
        if !extremum.improves(value, current) {
            return Ok(false);
        }

        self.remember(key, value, self.ttl.period_ttl(period));
        tracing::debug!(
            target: "stats",
            key = %key,
            previous = current,
            value,
            "extremum_updated"
        );
        Ok(true)
    }

    fn resolve_extremum(
        &self,
        key: CacheKey,
        extremum: Extremum,
        period: Period,
        bucket: &TimeBucket,
        use_cache: bool,
    ) -> Result<f64, StatsError> {
        if use_cache && let Some(value) = self.cached(&key) {
            return Ok(value);
        }

        let value = self
            .store
            .aggregate(&self.filter(bucket, period)?, extremum.op(), key.metric)?
            .unwrap_or(0.0);
        self.remember(key, value, self.ttl.period_ttl(period));
        Ok(value)
    }

    fn filter(&self, bucket: &TimeBucket, period: Period) -> Result<RowFilter, StatsError> {
        RowFilter::for_period(bucket, period).ok_or(StatsError::InvalidTimestamp(bucket.timestamp))
    }

    fn check_metric(&self, metric: Metric) -> Result<(), StatsError> {
        if metric.domain() == self.domain() {
            Ok(())
        } else {
            Err(StatsError::InvalidMetric(metric.name().to_string()))
        }
    }

    fn cached(&self, key: &CacheKey) -> Option<f64> {
        match self.cache.get(key) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("cache_read_failed key={} error={}", key, error);
                None
            }
        }
    }

    fn remember(&self, key: CacheKey, value: f64, ttl: Duration) {
        if let Err(error) = self.cache.set(key, value, ttl) {
            log::warn!("cache_write_failed key={} error={}", key, error);
        }
    }
}

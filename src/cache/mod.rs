use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::metric::Metric;
use crate::time_bucket::PeriodKey;

mod memory;
mod sled_cache;

pub use memory::MemoryCache;
pub use sled_cache::SledCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend failed: {0}")]
    Sled(#[from] sled::Error),
    #[error("cache entry unreadable: {0}")]
    Codec(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Max,
    Min,
    Latest,
    Accum,
}

impl StatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Latest => "latest",
            Self::Accum => "accum",
        }
    }
}

/// Identity of one cached statistic. Latest values carry no period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: StatKind,
    pub metric: Metric,
    pub period: Option<PeriodKey>,
}

impl CacheKey {
    pub fn extremum(kind: StatKind, metric: Metric, period: PeriodKey) -> Self {
        Self {
            kind,
            metric,
            period: Some(period),
        }
    }

    pub fn latest(metric: Metric) -> Self {
        Self {
            kind: StatKind::Latest,
            metric,
            period: None,
        }
    }

    pub fn accumulated(metric: Metric, period: PeriodKey) -> Self {
        Self {
            kind: StatKind::Accum,
            metric,
            period: Some(period),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.as_str(), self.metric)?;
        if let Some(period) = &self.period {
            write!(f, "_{}", period)?;
        }
        Ok(())
    }
}

/// Key-value store with per-entry expiry, shared by every statistics engine.
/// Callers treat failures as cache misses.
pub trait ExtremumStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<f64>, CacheError>;

    fn set(&self, key: CacheKey, value: f64, ttl: Duration) -> Result<(), CacheError>;

    fn clear_all(&self) -> Result<(), CacheError>;
}

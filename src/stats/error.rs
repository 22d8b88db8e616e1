use thiserror::Error;

use crate::cache::CacheError;
use crate::metric::UnknownMetric;
use crate::record_store::StoreError;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

impl From<UnknownMetric> for StatsError {
    fn from(error: UnknownMetric) -> Self {
        Self::InvalidMetric(error.0)
    }
}

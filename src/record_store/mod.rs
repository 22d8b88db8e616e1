use thiserror::Error;

use crate::metric::{Domain, Metric};
use crate::reading::Reading;
use crate::series::SeriesPoint;

mod model;
mod sled_store;

pub use model::{AggregateOp, RowFilter, StoredRow};
pub use sled_store::SledRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("row codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
    #[error("{found} reading sent to the {expected} store")]
    DomainMismatch { expected: Domain, found: Domain },
}

/// Append-only persistence for one domain's readings. Queries return points
/// in ascending `time_stamp` order.
pub trait RecordStore: Send + Sync {
    fn domain(&self) -> Domain;

    fn insert(&self, reading: &Reading) -> Result<u64, StoreError>;

    fn query(&self, filter: &RowFilter, metric: Metric) -> Result<Vec<SeriesPoint>, StoreError>;

    /// `None` when no row matches.
    fn aggregate(
        &self,
        filter: &RowFilter,
        op: AggregateOp,
        metric: Metric,
    ) -> Result<Option<f64>, StoreError>;

    /// Value of `metric` in the most recent row.
    fn latest(&self, metric: Metric) -> Result<Option<SeriesPoint>, StoreError>;
}

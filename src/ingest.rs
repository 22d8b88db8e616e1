use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::task::JoinSet;

use crate::metric::Domain;
use crate::reading::{DecodeError, Reading};
use crate::stats::{Extremum, StatsEngine, StatsError};
use crate::time_bucket::Period;

const EXTREMUM_AXES: [Period; 2] = [Period::Day, Period::Week];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("payload rejected: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("{found} reading sent to the {expected} ingestor")]
    DomainMismatch { expected: Domain, found: Domain },
}

/// Write path for one domain: extremum caches first, then the row, then the
/// latest values in the background.
#[derive(Clone)]
pub struct Ingestor {
    engine: Arc<StatsEngine>,
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl Ingestor {
    pub fn new(engine: Arc<StatsEngine>) -> Self {
        Self {
            engine,
            pending: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn engine(&self) -> &Arc<StatsEngine> {
        &self.engine
    }

    /// Returns once the row is persisted. Latest-value updates run on a
    /// background task and only log their failures; `flush` waits for them.
    pub async fn store(&self, reading: Reading) -> Result<u64, IngestError> {
        let expected = self.engine.domain();
        if reading.domain() != expected {
            return Err(IngestError::DomainMismatch {
                expected,
                found: reading.domain(),
            });
        }

        let bucket = self.engine.bucket(reading.time_stamp())?;
        let values = reading.metric_values();

        let mut records = 0usize;
        for (metric, value) in &values {
            for period in EXTREMUM_AXES {
                for extremum in Extremum::ALL {
                    if self
                        .engine
                        .set_extremum(*metric, extremum, period, &bucket, *value)?
                    {
                        records += 1;
                    }
                }
            }
        }

        let id = self.engine.insert(&reading)?;

        tracing::info!(
            target: "ingest",
            domain = expected.as_str(),
            id,
            time_stamp = reading.time_stamp(),
            metrics = values.len(),
            new_records = records,
            "reading_stored"
        );

        let engine = Arc::clone(&self.engine);
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while pending.try_join_next().is_some() {}
        pending.spawn(async move {
            for (metric, value) in values {
                if let Err(error) = engine.set_latest(metric, value) {
                    log::warn!("latest_update_failed metric={} error={}", metric, error);
                }
            }
        });

        Ok(id)
    }

    /// Waits for every latest-value task spawned so far.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        while let Some(joined) = pending.join_next().await {
            if let Err(error) = joined {
                log::warn!(
                    "latest_update_aborted domain={} error={}",
                    self.engine.domain(),
                    error
                );
            }
        }
    }
}

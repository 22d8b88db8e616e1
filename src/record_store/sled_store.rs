use chrono::FixedOffset;

use super::{AggregateOp, RecordStore, RowFilter, StoreError, StoredRow};
use crate::metric::{Domain, Metric};
use crate::reading::Reading;
use crate::series::SeriesPoint;
use crate::time_bucket::TimeBucket;

/// Rows keyed by `time_stamp` (sign bit flipped, big endian) then row id, so
/// tree order is chronological.
#[derive(Clone)]
pub struct SledRecordStore {
    db: sled::Db,
    rows: sled::Tree,
    domain: Domain,
    offset: FixedOffset,
}

impl SledRecordStore {
    pub fn open(db: &sled::Db, domain: Domain, offset: FixedOffset) -> Result<Self, StoreError> {
        let rows = db.open_tree(format!("{}_rows", domain.as_str()))?;
        Ok(Self {
            db: db.clone(),
            rows,
            domain,
            offset,
        })
    }

    fn scan<'a>(
        &'a self,
        filter: &'a RowFilter,
    ) -> impl Iterator<Item = Result<StoredRow, StoreError>> + 'a {
        let start = time_prefix(filter.start).to_vec();
        let end = time_prefix(filter.end).to_vec();

        self.rows
            .range(start..end)
            .map(|item| -> Result<StoredRow, StoreError> {
                let (_, value) = item?;
                Ok(serde_json::from_slice::<StoredRow>(&value)?)
            })
            .filter(move |row| match row {
                Ok(row) => filter.matches(row),
                Err(_) => true,
            })
    }
}

impl RecordStore for SledRecordStore {
    fn domain(&self) -> Domain {
        self.domain
    }

    fn insert(&self, reading: &Reading) -> Result<u64, StoreError> {
        if reading.domain() != self.domain {
            return Err(StoreError::DomainMismatch {
                expected: self.domain,
                found: reading.domain(),
            });
        }

        let time_stamp = reading.time_stamp();
        let bucket = TimeBucket::from_timestamp(time_stamp, self.offset)
            .ok_or(StoreError::InvalidTimestamp(time_stamp))?;
        let id = self.db.generate_id()?;

        let row = StoredRow::new(id, &bucket, reading.clone());
        let value = serde_json::to_vec(&row)?;
        self.rows.insert(row_key(time_stamp, id), value)?;

        Ok(id)
    }

    fn query(&self, filter: &RowFilter, metric: Metric) -> Result<Vec<SeriesPoint>, StoreError> {
        let mut points = Vec::new();
        for row in self.scan(filter) {
            let row = row?;
            if let Some(value) = row.reading.value(metric) {
                points.push(SeriesPoint::new(row.time_stamp, value));
            }
        }
        Ok(points)
    }

    fn aggregate(
        &self,
        filter: &RowFilter,
        op: AggregateOp,
        metric: Metric,
    ) -> Result<Option<f64>, StoreError> {
        let values = self.query(filter, metric)?;
        Ok(op.apply(values.into_iter().map(|point| point.value)))
    }

    fn latest(&self, metric: Metric) -> Result<Option<SeriesPoint>, StoreError> {
        let Some((_, value)) = self.rows.last()? else {
            return Ok(None);
        };
        let row = serde_json::from_slice::<StoredRow>(&value)?;
        Ok(row
            .reading
            .value(metric)
            .map(|value| SeriesPoint::new(row.time_stamp, value)))
    }
}

fn time_prefix(time_stamp: i64) -> [u8; 8] {
    ((time_stamp as u64) ^ (1 << 63)).to_be_bytes()
}

fn row_key(time_stamp: i64, id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&time_prefix(time_stamp));
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{CacheError, CacheKey, ExtremumStore};

const PRUNE_EVERY: u32 = 256;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredEntry {
    value: f64,
    expires_at_ms: i64,
}

/// Cache kept in a sled tree so entries outlive the process that wrote them.
/// Expiry is stored as wall-clock milliseconds.
#[derive(Clone)]
pub struct SledCache {
    entries: sled::Tree,
    writes: Arc<AtomicU32>,
}

impl SledCache {
    pub fn open(db: &sled::Db) -> Result<Self, CacheError> {
        Ok(Self {
            entries: db.open_tree("stat_cache")?,
            writes: Arc::new(AtomicU32::new(0)),
        })
    }

    fn prune_expired(&self, now_ms: i64) -> Result<(), CacheError> {
        let expired = self
            .entries
            .iter()
            .filter_map(|item| item.ok())
            .filter(|(_, value)| {
                serde_json::from_slice::<StoredEntry>(value)
                    .map(|entry| entry.expires_at_ms <= now_ms)
                    .unwrap_or(true)
            })
            .map(|(key, _)| key)
            .collect::<Vec<_>>();

        for key in expired {
            self.entries.remove(key)?;
        }
        Ok(())
    }
}

impl ExtremumStore for SledCache {
    fn get(&self, key: &CacheKey) -> Result<Option<f64>, CacheError> {
        let name = key.to_string();
        let Some(raw) = self.entries.get(name.as_bytes())? else {
            return Ok(None);
        };

        let entry = serde_json::from_slice::<StoredEntry>(&raw)?;
        if entry.expires_at_ms > Utc::now().timestamp_millis() {
            return Ok(Some(entry.value));
        }

        self.entries.remove(name.as_bytes())?;
        Ok(None)
    }

    fn set(&self, key: CacheKey, value: f64, ttl: Duration) -> Result<(), CacheError> {
        let now_ms = Utc::now().timestamp_millis();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let entry = StoredEntry {
            value,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
        };
        self.entries
            .insert(key.to_string().as_bytes(), serde_json::to_vec(&entry)?)?;

        let seq = self.writes.fetch_add(1, Ordering::Relaxed);
        if seq.is_multiple_of(PRUNE_EVERY) {
            self.prune_expired(now_ms)?;
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<(), CacheError> {
        self.entries.clear()?;
        Ok(())
    }
}

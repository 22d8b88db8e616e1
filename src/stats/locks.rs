use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::CacheKey;

const PRUNE_THRESHOLD: usize = 1024;

/// One mutex per cache key, handed out on demand. Entries nobody holds are
/// pruned once the table grows past a threshold.
#[derive(Default)]
pub(crate) struct KeyLocks {
    locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub(crate) fn lock_for(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.len() >= PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Arc::clone(locks.entry(*key).or_default())
    }
}

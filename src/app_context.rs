use std::sync::Arc;

use thiserror::Error;

use crate::cache::{CacheError, ExtremumStore, MemoryCache, SledCache};
use crate::config::{CacheBackend, Config};
use crate::dashboard::DashboardAssembler;
use crate::ingest::Ingestor;
use crate::metric::Domain;
use crate::record_store::{SledRecordStore, StoreError};
use crate::stats::{RebuildReport, StatsEngine, StatsError, rebuild_cache};

#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cache open failed: {0}")]
    Cache(#[from] CacheError),
}

/// Everything a command needs, wired once from config. Both engines share one
/// cache.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub dashboard: Arc<DashboardAssembler>,
    solar: Ingestor,
    weather: Ingestor,
}

impl AppContext {
    pub fn open(config: Config) -> Result<Self, OpenError> {
        let db = sled::open(&config.store.path).map_err(StoreError::from)?;
        Self::with_db(config, &db)
    }

    pub fn with_db(config: Config, db: &sled::Db) -> Result<Self, OpenError> {
        let cache: Arc<dyn ExtremumStore> = match config.cache.backend {
            CacheBackend::Sled => Arc::new(SledCache::open(db)?),
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
        };
        let offset = config.time.offset();

        let engine = |domain| -> Result<Arc<StatsEngine>, StoreError> {
            let store = SledRecordStore::open(db, domain, offset)?;
            Ok(Arc::new(StatsEngine::new(Arc::new(store), cache.clone(), &config)))
        };
        let solar = engine(Domain::Solar)?;
        let weather = engine(Domain::Weather)?;

        let dashboard = Arc::new(DashboardAssembler::new(
            solar.clone(),
            weather.clone(),
            config.trend.clone(),
        ));

        Ok(Self {
            config,
            dashboard,
            solar: Ingestor::new(solar),
            weather: Ingestor::new(weather),
        })
    }

    pub fn ingestor(&self, domain: Domain) -> &Ingestor {
        match domain {
            Domain::Solar => &self.solar,
            Domain::Weather => &self.weather,
        }
    }

    pub fn engine(&self, domain: Domain) -> &Arc<StatsEngine> {
        self.ingestor(domain).engine()
    }

    /// Waits for background latest-value writes of both ingestors.
    pub async fn flush(&self) {
        self.solar.flush().await;
        self.weather.flush().await;
    }

    pub fn rebuild_cache(&self, now: i64) -> Result<RebuildReport, StatsError> {
        rebuild_cache(&[self.weather.engine().as_ref(), self.solar.engine().as_ref()], now)
    }
}

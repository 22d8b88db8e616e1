pub mod app_context;
pub mod cache;
pub mod config;
pub mod conversion;
pub mod dashboard;
pub mod ingest;
pub mod metric;
pub mod reading;
pub mod record_store;
pub mod series;
pub mod stats;
pub mod time_bucket;

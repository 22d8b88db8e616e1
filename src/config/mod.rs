mod defaults;
mod io;
mod schema;
mod validate;

pub use io::load_config;
pub use schema::{CacheBackend, CacheConfig, Config, StoreConfig, TimeConfig, TrendConfig};
pub use validate::ConfigError;

//! Extremum, latest-value, accumulation and trend statistics.

mod accumulate;
pub mod derived;
mod engine;
mod error;
mod locks;
mod rebuild;
mod trend;

pub use accumulate::accumulate;
pub use engine::{Extremum, StatsEngine};
pub use error::StatsError;
pub use rebuild::{RebuildReport, rebuild_cache};
pub use trend::{display_series, downsample};

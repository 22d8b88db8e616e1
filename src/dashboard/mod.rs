//! Per-domain summaries the dashboard renders.

mod assembler;
mod model;

pub use assembler::DashboardAssembler;
pub use model::{DashboardData, MetricSummary};

use std::time::{Duration, Instant};

use super::{Extremum, StatsEngine, StatsError};
use crate::metric::Domain;
use crate::time_bucket::Period;

const EXTREMUM_PERIODS: [Period; 3] = [Period::Day, Period::Month, Period::Year];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildReport {
    pub extrema: usize,
    pub accumulations: usize,
    pub latest: usize,
    pub elapsed: Duration,
}

/// Clears the shared cache and recomputes what the dashboard reads around
/// `now` straight from the stores: weather extrema, solar accumulations and
/// the latest value of every metric.
pub fn rebuild_cache(engines: &[&StatsEngine], now: i64) -> Result<RebuildReport, StatsError> {
    let started = Instant::now();
    let mut report = RebuildReport::default();

    let Some(first) = engines.first() else {
        return Ok(report);
    };
    first.clear_cache()?;
    log::info!("cache_cleared engines={}", engines.len());

    for engine in engines {
        let domain_started = Instant::now();
        let bucket = engine.bucket(now)?;
        let domain = engine.domain();

        for metric in domain.metrics().iter().copied() {
            match domain {
                Domain::Weather => {
                    for period in EXTREMUM_PERIODS {
                        for extremum in Extremum::ALL {
                            engine.get_extremum(metric, extremum, period, &bucket, false)?;
                            report.extrema += 1;
                        }
                    }
                }
                Domain::Solar => {
                    for period in Period::ALL {
                        engine.get_accumulated(metric, period, &bucket, false)?;
                        report.accumulations += 1;
                    }
                }
            }

            if let Some(point) = engine.latest_row(metric)? {
                engine.set_latest(metric, point.value)?;
                report.latest += 1;
            }
        }

        tracing::info!(
            target: "rebuild",
            domain = domain.as_str(),
            elapsed_ms = domain_started.elapsed().as_millis() as u64,
            "cache_rebuilt"
        );
    }

    report.elapsed = started.elapsed();
    Ok(report)
}

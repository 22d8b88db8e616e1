use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use solarweather_stats::app_context::{AppContext, OpenError};
use solarweather_stats::config::{Config, ConfigError, load_config};
use solarweather_stats::ingest::IngestError;
use solarweather_stats::metric::Domain;
use solarweather_stats::reading::{DecodeError, SolarReading, WeatherReading, parse_station_query};
use solarweather_stats::stats::{Extremum, StatsError, display_series};
use solarweather_stats::time_bucket::Period;

fn init_json_logging() {
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!(
            "logging bridge initialization failed (continuing with existing logger): {}",
            error
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(io::stderr)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

const CONFIG_PATH: &str = "config.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file; defaults apply when it does not exist
    #[arg(short, long, value_name = "FILE", default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Clear the cache and recompute it from stored rows
    RebuildCache {
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Print the current dashboard view as JSON
    Dashboard {
        #[arg(long, value_parser = parse_domain)]
        domain: Domain,
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Print the peak-oriented view of a past moment as JSON
    History {
        #[arg(long, value_parser = parse_domain)]
        domain: Domain,
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Print one statistic for a metric
    Stat {
        #[arg(long, value_parser = parse_domain)]
        domain: Domain,
        #[arg(long)]
        metric: String,
        #[arg(long, value_enum)]
        kind: StatArg,
        #[arg(long, value_parser = parse_period, default_value = "day")]
        period: Period,
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Store weather station uploads, one query string per stdin line
    IngestWeather {
        /// Single upload instead of reading stdin
        #[arg(long)]
        query: Option<String>,
    },
    /// Store one solar reading from meter and inverter JSON files
    IngestSolar {
        #[arg(long, value_name = "FILE")]
        grid: PathBuf,
        #[arg(long, value_name = "FILE")]
        inverter: PathBuf,
        #[arg(long)]
        timestamp: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatArg {
    Max,
    Min,
    Latest,
    Accumulated,
    Trend,
}

#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("payload rejected: {0}")]
    Decode(#[from] DecodeError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_domain(input: &str) -> Result<Domain, String> {
    Domain::parse(input).ok_or_else(|| format!("unknown domain: {}", input))
}

fn parse_period(input: &str) -> Result<Period, String> {
    Period::parse(input).ok_or_else(|| format!("unknown period: {}", input))
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("store open failed: {0}")]
    Open(#[from] OpenError),
}

fn open_context(config_path: &Path) -> Result<AppContext, StartupError> {
    let config = if config_path.exists() {
        load_config(config_path)?
    } else {
        log::warn!("config_missing path={} using=defaults", config_path.display());
        Config::default()
    };
    Ok(AppContext::open(config)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command, context: &AppContext) -> Result<(), CommandError> {
    let now = Utc::now().timestamp();

    match command {
        Command::RebuildCache { timestamp } => {
            let report = context.rebuild_cache(timestamp.unwrap_or(now))?;
            log::info!(
                "cache_rebuild_done extrema={} accumulations={} latest={} elapsed_ms={}",
                report.extrema,
                report.accumulations,
                report.latest,
                report.elapsed.as_millis()
            );
        }
        Command::Dashboard { domain, timestamp } => {
            let data = context.dashboard.get_data(domain, timestamp.unwrap_or(now))?;
            print_json(&data)?;
        }
        Command::History { domain, timestamp } => {
            let data = context
                .dashboard
                .get_history(domain, timestamp.unwrap_or(now))?;
            print_json(&data)?;
        }
        Command::Stat {
            domain,
            metric,
            kind,
            period,
            timestamp,
        } => {
            let engine = context.engine(domain);
            let metric = engine.metric(&metric)?;
            let bucket = engine.bucket(timestamp.unwrap_or(now))?;

            match kind {
                StatArg::Max => {
                    print_json(&engine.get_extremum(metric, Extremum::Max, period, &bucket, true)?)?
                }
                StatArg::Min => {
                    print_json(&engine.get_extremum(metric, Extremum::Min, period, &bucket, true)?)?
                }
                StatArg::Latest => print_json(&engine.get_latest(metric)?)?,
                StatArg::Accumulated => {
                    print_json(&engine.get_accumulated(metric, period, &bucket, true)?)?
                }
                StatArg::Trend => {
                    let series = engine.get_trend(metric, period, &bucket)?;
                    print_json(&display_series(&series, &context.config.trend))?
                }
            }
        }
        Command::IngestWeather { query } => {
            let ingestor = context.ingestor(Domain::Weather);
            let offset = context.config.time.offset();

            match query {
                Some(query) => {
                    let reading =
                        WeatherReading::from_station_params(&parse_station_query(&query), offset)?;
                    let id = ingestor.store(reading.into()).await?;
                    println!("{}", id);
                }
                None => {
                    for line in io::stdin().lock().lines() {
                        let line = line?;
                        if line.trim().is_empty() {
                            continue;
                        }
                        let stored = match WeatherReading::from_station_params(
                            &parse_station_query(&line),
                            offset,
                        ) {
                            Ok(reading) => ingestor.store(reading.into()).await,
                            Err(error) => Err(error.into()),
                        };
                        match stored {
                            Ok(id) => println!("{}", id),
                            Err(error) => log::warn!("weather_upload_rejected error={}", error),
                        }
                    }
                }
            }
        }
        Command::IngestSolar {
            grid,
            inverter,
            timestamp,
        } => {
            let grid: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(grid)?)?;
            let inverter: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(inverter)?)?;
            let reading =
                SolarReading::from_inverter_payloads(&grid, &inverter, timestamp.unwrap_or(now))?;
            let id = context.ingestor(Domain::Solar).store(reading.into()).await?;
            println!("{}", id);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_json_logging();
    let cli = Cli::parse();

    let context = match open_context(&cli.config) {
        Ok(context) => context,
        Err(error) => {
            log::error!("startup_failed error={}", error);
            std::process::exit(1);
        }
    };

    let outcome = run(cli.command, &context).await;
    context.flush().await;

    if let Err(error) = outcome {
        log::error!("command_failed error={}", error);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{StartupError, open_context};

    #[test]
    fn invalid_config_fails_startup() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[trend]\nbucket_size = 0\n").expect("write config");

        let error = open_context(&path).err().expect("startup must fail");
        assert!(matches!(error, StartupError::Config(_)));
    }

    #[test]
    fn unopenable_store_fails_startup() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").expect("write blocker");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            format!("[store]\npath = {:?}\n", blocker.join("db").display().to_string()),
        )
        .expect("write config");

        let error = open_context(&path).err().expect("startup must fail");
        assert!(matches!(error, StartupError::Open(_)));
    }

    #[test]
    fn valid_config_opens_the_store() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            format!("[store]\npath = {:?}\n", dir.path().join("db").display().to_string()),
        )
        .expect("write config");

        let context = open_context(&path).expect("startup");
        assert_eq!(context.config.store.path, dir.path().join("db").display().to_string());
    }
}

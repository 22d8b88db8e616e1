mod solar;
mod weather;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metric::{Domain, Metric};

pub use solar::{GridData, InverterData, SolarReading};
pub use weather::{WeatherReading, parse_station_query};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid value for {field}: {value}")]
    InvalidField { field: String, value: String },
}

/// A stored telemetry row. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum Reading {
    Solar(SolarReading),
    Weather(WeatherReading),
}

impl Reading {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Solar(_) => Domain::Solar,
            Self::Weather(_) => Domain::Weather,
        }
    }

    pub fn time_stamp(&self) -> i64 {
        match self {
            Self::Solar(reading) => reading.time_stamp,
            Self::Weather(reading) => reading.time_stamp,
        }
    }

    /// Value of an allow-listed metric, `None` when the metric belongs to the
    /// other domain.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match self {
            Self::Solar(reading) => reading.value(metric),
            Self::Weather(reading) => reading.value(metric),
        }
    }

    pub fn metric_values(&self) -> Vec<(Metric, f64)> {
        self.domain()
            .metrics()
            .iter()
            .filter_map(|metric| self.value(*metric).map(|value| (*metric, value)))
            .collect()
    }
}

impl From<SolarReading> for Reading {
    fn from(reading: SolarReading) -> Self {
        Self::Solar(reading)
    }
}

impl From<WeatherReading> for Reading {
    fn from(reading: WeatherReading) -> Self {
        Self::Weather(reading)
    }
}

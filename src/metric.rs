use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Solar,
    Weather,
}

impl Domain {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "solar" => Some(Self::Solar),
            "weather" => Some(Self::Weather),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Weather => "weather",
        }
    }

    /// Metrics the statistics engine may read or write for this domain.
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            Self::Solar => &Metric::SOLAR,
            Self::Weather => &Metric::WEATHER,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

/// Allow-listed numeric columns. A name that does not map to a variant is not
/// a metric as far as the cache and statistics APIs are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    InverterAcPower,
    GridPowerUsageReal,
    PowerConsumption,
    IndoorTemp,
    OutdoorTemp,
    IndoorFeelsTemp,
    OutdoorFeelsTemp,
    IndoorDewTemp,
    OutdoorDewTemp,
    DewPoint,
    WindChill,
    IndoorHumidity,
    OutdoorHumidity,
    WindSpeed,
    WindGust,
    WindDirection,
    AbsolutePressure,
    Pressure,
    Rain,
    DailyRain,
    WeeklyRain,
    MonthlyRain,
    SolarRadiation,
    UvIndex,
}

impl Metric {
    pub const SOLAR: [Metric; 3] = [
        Metric::InverterAcPower,
        Metric::GridPowerUsageReal,
        Metric::PowerConsumption,
    ];

    pub const WEATHER: [Metric; 21] = [
        Metric::IndoorTemp,
        Metric::OutdoorTemp,
        Metric::IndoorFeelsTemp,
        Metric::OutdoorFeelsTemp,
        Metric::IndoorDewTemp,
        Metric::OutdoorDewTemp,
        Metric::DewPoint,
        Metric::WindChill,
        Metric::IndoorHumidity,
        Metric::OutdoorHumidity,
        Metric::WindSpeed,
        Metric::WindGust,
        Metric::WindDirection,
        Metric::AbsolutePressure,
        Metric::Pressure,
        Metric::Rain,
        Metric::DailyRain,
        Metric::WeeklyRain,
        Metric::MonthlyRain,
        Metric::SolarRadiation,
        Metric::UvIndex,
    ];

    pub fn domain(self) -> Domain {
        match self {
            Self::InverterAcPower | Self::GridPowerUsageReal | Self::PowerConsumption => {
                Domain::Solar
            }
            _ => Domain::Weather,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::InverterAcPower => "inverter_ac_power",
            Self::GridPowerUsageReal => "grid_power_usage_real",
            Self::PowerConsumption => "power_consumption",
            Self::IndoorTemp => "indoor_temp",
            Self::OutdoorTemp => "outdoor_temp",
            Self::IndoorFeelsTemp => "indoor_feels_temp",
            Self::OutdoorFeelsTemp => "outdoor_feels_temp",
            Self::IndoorDewTemp => "indoor_dew_temp",
            Self::OutdoorDewTemp => "outdoor_dew_temp",
            Self::DewPoint => "dew_point",
            Self::WindChill => "wind_chill",
            Self::IndoorHumidity => "indoor_humidity",
            Self::OutdoorHumidity => "outdoor_humidity",
            Self::WindSpeed => "wind_speed",
            Self::WindGust => "wind_gust",
            Self::WindDirection => "wind_direction",
            Self::AbsolutePressure => "absolute_pressure",
            Self::Pressure => "pressure",
            Self::Rain => "rain",
            Self::DailyRain => "daily_rain",
            Self::WeeklyRain => "weekly_rain",
            Self::MonthlyRain => "monthly_rain",
            Self::SolarRadiation => "solar_radiation",
            Self::UvIndex => "uv_index",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::SOLAR
            .iter()
            .chain(Self::WEATHER.iter())
            .copied()
            .find(|metric| metric.name() == input)
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input).ok_or_else(|| UnknownMetric(input.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{Domain, Metric};

    #[test]
    fn names_round_trip_through_parse() {
        for metric in Metric::SOLAR.iter().chain(Metric::WEATHER.iter()) {
            assert_eq!(Metric::parse(metric.name()), Some(*metric));
        }
    }

    #[test]
    fn rejects_columns_outside_allow_list() {
        assert!(Metric::parse("radio_freq").is_none());
        assert!(Metric::parse("time_stamp").is_none());
        let error = "real_time".parse::<Metric>().expect_err("not a metric");
        assert_eq!(error.to_string(), "unknown metric: real_time");
    }

    #[test]
    fn domains_partition_the_allow_list() {
        assert!(Domain::Solar.metrics().iter().all(|m| m.domain() == Domain::Solar));
        assert!(Domain::Weather.metrics().iter().all(|m| m.domain() == Domain::Weather));
        assert_eq!(Domain::Solar.metrics().len(), 3);
        assert_eq!(Domain::Weather.metrics().len(), 21);
    }

    #[test]
    fn serializes_as_column_name() {
        let json = serde_json::to_string(&Metric::UvIndex).expect("serialize");
        assert_eq!(json, "\"uv_index\"");
    }
}

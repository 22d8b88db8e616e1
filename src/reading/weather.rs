use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::DecodeError;
use crate::conversion::{DEFAULT_PLACES, f_to_c, in_to_cm, inhg_to_hpa, mph_to_kmh};
use crate::metric::Metric;
use crate::stats::derived::{apparent_temperature, dew_point};

const STATION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Weather station observation in metric units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub indoor_temp: f64,
    pub outdoor_temp: f64,
    pub indoor_feels_temp: f64,
    pub outdoor_feels_temp: f64,
    pub indoor_dew_temp: f64,
    pub outdoor_dew_temp: f64,
    pub dew_point: f64,
    pub wind_chill: f64,
    pub indoor_humidity: f64,
    pub outdoor_humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub wind_direction: f64,
    pub absolute_pressure: f64,
    pub pressure: f64,
    pub rain: f64,
    pub daily_rain: f64,
    pub weekly_rain: f64,
    pub monthly_rain: f64,
    pub solar_radiation: f64,
    pub uv_index: i64,
    pub software_type: String,
    pub action: String,
    pub real_time: i64,
    pub radio_freq: i64,
    pub time_stamp: i64,
}

impl WeatherReading {
    /// Decodes the imperial query parameters a station uploads. `dateutc` is
    /// read as wall time in `offset`.
    pub fn from_station_params(
        params: &HashMap<String, String>,
        offset: FixedOffset,
    ) -> Result<Self, DecodeError> {
        let params = StationParams(params);

        let time_stamp = params.time_stamp("dateutc", offset)?;
        let indoor_temp = f_to_c(params.number("indoortempf")?, DEFAULT_PLACES);
        let outdoor_temp = f_to_c(params.number("tempf")?, DEFAULT_PLACES);
        let indoor_humidity = params.humidity("indoorhumidity")?;
        let outdoor_humidity = params.humidity("humidity")?;
        let wind_speed = mph_to_kmh(params.number("windspeedmph")?, DEFAULT_PLACES);
        let solar_radiation = params.number("solarradiation")?;

        Ok(Self {
            indoor_temp,
            outdoor_temp,
            indoor_feels_temp: apparent_temperature(indoor_temp, indoor_humidity, 0.0, 0.0),
            outdoor_feels_temp: apparent_temperature(
                outdoor_temp,
                outdoor_humidity,
                wind_speed,
                solar_radiation,
            ),
            indoor_dew_temp: dew_point(indoor_temp, indoor_humidity),
            outdoor_dew_temp: dew_point(outdoor_temp, outdoor_humidity),
            dew_point: f_to_c(params.number("dewptf")?, DEFAULT_PLACES),
            wind_chill: f_to_c(params.number("windchillf")?, DEFAULT_PLACES),
            indoor_humidity,
            outdoor_humidity,
            wind_speed,
            wind_gust: mph_to_kmh(params.number("windgustmph")?, DEFAULT_PLACES),
            wind_direction: params.number("winddir")?,
            absolute_pressure: inhg_to_hpa(params.number("absbaromin")?, DEFAULT_PLACES),
            pressure: inhg_to_hpa(params.number("baromin")?, DEFAULT_PLACES),
            rain: in_to_cm(params.number("rainin")?, DEFAULT_PLACES),
            daily_rain: in_to_cm(params.number("dailyrainin")?, DEFAULT_PLACES),
            weekly_rain: in_to_cm(params.number("weeklyrainin")?, DEFAULT_PLACES),
            monthly_rain: in_to_cm(params.number("monthlyrainin")?, DEFAULT_PLACES),
            solar_radiation,
            uv_index: params.integer("UV")?,
            software_type: params.text("softwaretype")?.to_string(),
            action: params.text("action")?.to_string(),
            real_time: params.integer("realtime")?,
            radio_freq: params.integer("rtfreq")?,
            time_stamp,
        })
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        let value = match metric {
            Metric::IndoorTemp => self.indoor_temp,
            Metric::OutdoorTemp => self.outdoor_temp,
            Metric::IndoorFeelsTemp => self.indoor_feels_temp,
            Metric::OutdoorFeelsTemp => self.outdoor_feels_temp,
            Metric::IndoorDewTemp => self.indoor_dew_temp,
            Metric::OutdoorDewTemp => self.outdoor_dew_temp,
            Metric::DewPoint => self.dew_point,
            Metric::WindChill => self.wind_chill,
            Metric::IndoorHumidity => self.indoor_humidity,
            Metric::OutdoorHumidity => self.outdoor_humidity,
            Metric::WindSpeed => self.wind_speed,
            Metric::WindGust => self.wind_gust,
            Metric::WindDirection => self.wind_direction,
            Metric::AbsolutePressure => self.absolute_pressure,
            Metric::Pressure => self.pressure,
            Metric::Rain => self.rain,
            Metric::DailyRain => self.daily_rain,
            Metric::WeeklyRain => self.weekly_rain,
            Metric::MonthlyRain => self.monthly_rain,
            Metric::SolarRadiation => self.solar_radiation,
            Metric::UvIndex => self.uv_index as f64,
            Metric::InverterAcPower | Metric::GridPowerUsageReal | Metric::PowerConsumption => {
                return None;
            }
        };
        Some(value)
    }
}

struct StationParams<'a>(&'a HashMap<String, String>);

impl StationParams<'_> {
    fn text(&self, key: &str) -> Result<&str, DecodeError> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .ok_or_else(|| DecodeError::MissingField(key.to_string()))
    }

    fn number(&self, key: &str) -> Result<f64, DecodeError> {
        let raw = self.text(key)?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| invalid(key, raw))
    }

    fn integer(&self, key: &str) -> Result<i64, DecodeError> {
        let raw = self.text(key)?;
        raw.parse::<i64>().map_err(|_| invalid(key, raw))
    }

    /// Relative humidity feeds a logarithm, so zero is rejected with the rest.
    fn humidity(&self, key: &str) -> Result<f64, DecodeError> {
        let value = self.number(key)?;
        if value > 0.0 && value <= 100.0 {
            Ok(value)
        } else {
            Err(invalid(key, self.text(key)?))
        }
    }

    fn time_stamp(&self, key: &str, offset: FixedOffset) -> Result<i64, DecodeError> {
        let raw = self.text(key)?;
        let normalized = raw.replace("%20", " ").replace('+', " ");
        let naive = NaiveDateTime::parse_from_str(&normalized, STATION_DATE_FORMAT)
            .map_err(|_| invalid(key, raw))?;
        offset
            .from_local_datetime(&naive)
            .single()
            .map(|moment| moment.timestamp())
            .ok_or_else(|| invalid(key, raw))
    }
}

fn invalid(field: &str, value: &str) -> DecodeError {
    DecodeError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Splits a raw `a=1&b=2` station upload into parameters. Values keep their
/// encoding apart from `%20`/`+` in dates, which the decoder handles.
pub fn parse_station_query(raw: &str) -> HashMap<String, String> {
    raw.trim()
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::FixedOffset;

    use super::{WeatherReading, parse_station_query};
    use crate::metric::Metric;
    use crate::reading::DecodeError;

    const UPLOAD: &str = "ID=IVCTMERN2&PASSWORD=secret&indoortempf=68.0&tempf=52.5\
        &dewptf=45.5&windchillf=52.5&indoorhumidity=52&humidity=77&windspeedmph=0.7\
        &windgustmph=1.1&winddir=338&absbaromin=29.318&baromin=29.714&rainin=0.000\
        &dailyrainin=0.000&weeklyrainin=0.181&monthlyrainin=3.098&solarradiation=71.56\
        &UV=0&dateutc=2021-06-17%2005:08:28&softwaretype=EasyWeatherV1.5.9\
        &action=updateraw&realtime=1&rtfreq=5";

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).expect("utc offset")
    }

    fn params() -> HashMap<String, String> {
        parse_station_query(UPLOAD)
    }

    #[test]
    fn converts_station_units_to_metric() {
        let reading = WeatherReading::from_station_params(&params(), utc()).expect("reading");

        assert_eq!(reading.time_stamp, 1_623_906_508);
        assert_eq!(reading.indoor_temp, 20.0);
        assert_eq!(reading.outdoor_temp, 11.389);
        assert_eq!(reading.dew_point, 7.5);
        assert_eq!(reading.wind_speed, 1.127);
        assert_eq!(reading.wind_gust, 1.77);
        assert_eq!(reading.pressure, 1006.232);
        assert_eq!(reading.absolute_pressure, 992.822);
        assert_eq!(reading.weekly_rain, 0.46);
        assert_eq!(reading.uv_index, 0);
        assert_eq!(reading.software_type, "EasyWeatherV1.5.9");
        assert_eq!(reading.radio_freq, 5);
    }

    #[test]
    fn derives_feels_like_and_dew_temperatures() {
        let reading = WeatherReading::from_station_params(&params(), utc()).expect("reading");

        assert_eq!(reading.indoor_feels_temp, 20.22);
        assert_eq!(reading.outdoor_feels_temp, 15.38);
        assert_eq!(reading.indoor_dew_temp, 9.845);
        assert_eq!(reading.outdoor_dew_temp, 7.5);
        assert_eq!(reading.value(Metric::UvIndex), Some(0.0));
        assert_eq!(reading.value(Metric::PowerConsumption), None);
    }

    #[test]
    fn date_is_read_in_configured_offset() {
        let brisbane = FixedOffset::east_opt(10 * 3600).expect("offset");
        let reading = WeatherReading::from_station_params(&params(), brisbane).expect("reading");

        assert_eq!(reading.time_stamp, 1_623_906_508 - 10 * 3600);
    }

    #[test]
    fn reports_missing_field() {
        let mut params = params();
        params.remove("baromin");

        let error = WeatherReading::from_station_params(&params, utc()).expect_err("missing");
        assert!(matches!(error, DecodeError::MissingField(ref field) if field == "baromin"));
    }

    #[test]
    fn rejects_zero_humidity() {
        let mut params = params();
        params.insert("humidity".to_string(), "0".to_string());

        let error = WeatherReading::from_station_params(&params, utc()).expect_err("invalid");
        assert_eq!(error.to_string(), "invalid value for humidity: 0");
    }

    #[test]
    fn rejects_unparseable_date() {
        let mut params = params();
        params.insert("dateutc".to_string(), "now".to_string());

        assert!(WeatherReading::from_station_params(&params, utc()).is_err());
    }
}

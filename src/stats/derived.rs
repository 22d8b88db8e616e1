//! Metrics computed from other metrics at ingestion time.

use crate::conversion::{DEFAULT_PLACES, round_places};

/// House load from inverter output and signed grid flow (export negative,
/// import positive). Zero grid flow takes the export branch.
pub fn power_consumption(inverter_power: f64, grid_power: f64) -> f64 {
    if grid_power <= 0.0 {
        (inverter_power - grid_power.abs()).abs()
    } else {
        inverter_power + grid_power
    }
}

/// Australian apparent temperature in °C. `wind_kmh` is converted to m/s;
/// the radiation term only applies while `solar_radiation` is positive.
pub fn apparent_temperature(temp: f64, humidity: f64, wind_kmh: f64, solar_radiation: f64) -> f64 {
    let vapour = (humidity / 100.0) * 6.105 * ((17.27 * temp) / (237.7 + temp)).exp();
    let wind_ms = wind_kmh / 3.6;

    let apparent = if solar_radiation > 0.0 {
        temp + 0.348 * vapour - 0.70 * wind_ms + 0.70 * solar_radiation / (wind_ms + 10.0) - 4.25
    } else {
        temp + 0.348 * vapour - 0.70 * wind_ms - 4.00
    };
    round_places(apparent, DEFAULT_PLACES)
}

/// Magnus dew point in °C. Undefined for non-positive humidity.
pub fn dew_point(temp: f64, humidity: f64) -> f64 {
    let ln_h = (humidity / 100.0).ln();
    let k = 243.04 + temp;
    let dew = 243.04 * (ln_h + 17.625 * temp / k) / (17.625 - ln_h - 17.625 * temp / k);
    round_places(dew, DEFAULT_PLACES)
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DecodeError;
use crate::metric::Metric;
use crate::stats::derived::power_consumption;

/// Smart meter values, as reported under `Body.Data."0"`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridData {
    pub power_usage_real: f64,
    pub power_factor: f64,
    pub power_apparent: f64,
    pub power_reactive: f64,
    pub ac_voltage: f64,
    pub ac_current: f64,
}

impl GridData {
    pub fn from_payload(payload: &Value) -> Result<Self, DecodeError> {
        let data = payload
            .pointer("/Body/Data/0")
            .ok_or_else(|| DecodeError::MissingField("Body.Data.0".to_string()))?;
        let field = |name: &str| data.get(name).and_then(Value::as_f64).unwrap_or(0.0);

        Ok(Self {
            power_usage_real: field("PowerReal_P_Sum"),
            power_factor: field("PowerFactor_Sum"),
            power_apparent: field("PowerApparent_S_Sum"),
            power_reactive: field("PowerReactive_Q_Sum"),
            ac_voltage: field("Voltage_AC_Phase_1"),
            ac_current: field("Current_AC_Sum"),
        })
    }
}

/// Inverter values. Channels are missing from the payload while the inverter
/// sleeps and read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InverterData {
    pub ac_frequency: f64,
    pub ac_current: f64,
    pub ac_voltage: f64,
    pub ac_power: f64,
    pub dc_current: f64,
    pub dc_voltage: f64,
}

impl InverterData {
    pub fn from_payload(payload: &Value) -> Result<Self, DecodeError> {
        let data = payload
            .pointer("/Body/Data")
            .ok_or_else(|| DecodeError::MissingField("Body.Data".to_string()))?;
        let channel = |name: &str| {
            data.get(name)
                .and_then(|entry| entry.get("Value"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };

        Ok(Self {
            ac_frequency: channel("FAC"),
            ac_current: channel("IAC"),
            ac_voltage: channel("UAC"),
            ac_power: channel("PAC"),
            dc_current: channel("IDC"),
            dc_voltage: channel("UDC"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarReading {
    pub grid_power_usage_real: f64,
    pub grid_power_factor: f64,
    pub grid_power_apparent: f64,
    pub grid_power_reactive: f64,
    pub grid_ac_voltage: f64,
    pub grid_ac_current: f64,
    pub inverter_ac_frequency: f64,
    pub inverter_ac_current: f64,
    pub inverter_ac_voltage: f64,
    pub inverter_ac_power: f64,
    pub inverter_dc_current: f64,
    pub inverter_dc_voltage: f64,
    pub power_consumption: f64,
    pub time_stamp: i64,
}

impl SolarReading {
    pub fn from_parts(grid: GridData, inverter: InverterData, time_stamp: i64) -> Self {
        Self {
            grid_power_usage_real: grid.power_usage_real,
            grid_power_factor: grid.power_factor,
            grid_power_apparent: grid.power_apparent,
            grid_power_reactive: grid.power_reactive,
            grid_ac_voltage: grid.ac_voltage,
            grid_ac_current: grid.ac_current,
            inverter_ac_frequency: inverter.ac_frequency,
            inverter_ac_current: inverter.ac_current,
            inverter_ac_voltage: inverter.ac_voltage,
            inverter_ac_power: inverter.ac_power,
            inverter_dc_current: inverter.dc_current,
            inverter_dc_voltage: inverter.dc_voltage,
            power_consumption: power_consumption(inverter.ac_power, grid.power_usage_real),
            time_stamp,
        }
    }

    pub fn from_inverter_payloads(
        grid_payload: &Value,
        inverter_payload: &Value,
        time_stamp: i64,
    ) -> Result<Self, DecodeError> {
        let grid = GridData::from_payload(grid_payload)?;
        let inverter = InverterData::from_payload(inverter_payload)?;
        Ok(Self::from_parts(grid, inverter, time_stamp))
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::InverterAcPower => Some(self.inverter_ac_power),
            Metric::GridPowerUsageReal => Some(self.grid_power_usage_real),
            Metric::PowerConsumption => Some(self.power_consumption),
            _ => None,
        }
    }
}

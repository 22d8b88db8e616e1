use serde::{Deserialize, Serialize};

/// One `(time_stamp, value)` observation of a metric. Serialized as a
/// two-element array, the shape trend charts consume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "(i64, f64)", from = "(i64, f64)")]
pub struct SeriesPoint {
    pub time_stamp: i64,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time_stamp: i64, value: f64) -> Self {
        Self { time_stamp, value }
    }
}

impl From<SeriesPoint> for (i64, f64) {
    fn from(point: SeriesPoint) -> Self {
        (point.time_stamp, point.value)
    }
}

impl From<(i64, f64)> for SeriesPoint {
    fn from((time_stamp, value): (i64, f64)) -> Self {
        Self { time_stamp, value }
    }
}

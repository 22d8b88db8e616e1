use std::collections::BTreeMap;

use serde::Serialize;

use crate::metric::Metric;
use crate::series::SeriesPoint;

/// Statistics for one metric. Absent fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_trend: Option<Vec<SeriesPoint>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DashboardData {
    pub metrics: BTreeMap<Metric, MetricSummary>,
}

impl DashboardData {
    pub fn get(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.get(&metric)
    }

    pub(crate) fn entry(&mut self, metric: Metric) -> &mut MetricSummary {
        self.metrics.entry(metric).or_default()
    }
}

use std::sync::Arc;

use super::{DashboardData, MetricSummary};
use crate::config::TrendConfig;
use crate::metric::{Domain, Metric};
use crate::series::SeriesPoint;
use crate::stats::{Extremum, StatsEngine, StatsError, display_series};
use crate::time_bucket::{Period, TimeBucket};

/// Weather metrics the solar view shows alongside the inverter.
const SOLAR_VIEW_WEATHER: [Metric; 2] = [Metric::UvIndex, Metric::SolarRadiation];

pub struct DashboardAssembler {
    solar: Arc<StatsEngine>,
    weather: Arc<StatsEngine>,
    trend: TrendConfig,
}

impl DashboardAssembler {
    pub fn new(solar: Arc<StatsEngine>, weather: Arc<StatsEngine>, trend: TrendConfig) -> Self {
        Self {
            solar,
            weather,
            trend,
        }
    }

    /// Current view: latest values plus accumulation (solar) or
    /// extrema (weather) for the periods containing `time_stamp`.
    pub fn get_data(&self, domain: Domain, time_stamp: i64) -> Result<DashboardData, StatsError> {
        let mut data = DashboardData::default();

        match domain {
            Domain::Solar => {
                let bucket = self.solar.bucket(time_stamp)?;
                for metric in Metric::SOLAR {
                    let summary = data.entry(metric);
                    summary.latest = self.solar.get_latest(metric)?;
                    self.fill_accumulation(summary, metric, &bucket)?;
                    summary.daily_trend = Some(self.daily_trend(&self.solar, metric, &bucket)?);
                }
                for metric in SOLAR_VIEW_WEATHER {
                    data.entry(metric).latest = self.weather.get_latest(metric)?;
                }
            }
            Domain::Weather => {
                let bucket = self.weather.bucket(time_stamp)?;
                for metric in Metric::WEATHER {
                    let summary = data.entry(metric);
                    summary.latest = self.weather.get_latest(metric)?;
                    self.fill_extrema(summary, metric, &bucket)?;
                }
            }
        }

        Ok(data)
    }

    /// Same shape as `get_data` for a past moment: peaks instead of latest
    /// values, and every metric gets its daily trend.
    pub fn get_history(&self, domain: Domain, time_stamp: i64) -> Result<DashboardData, StatsError> {
        let mut data = DashboardData::default();

        match domain {
            Domain::Solar => {
                let bucket = self.solar.bucket(time_stamp)?;
                for metric in Metric::SOLAR {
                    let summary = data.entry(metric);
                    summary.daily_max = Some(self.solar.get_extremum(
                        metric,
                        Extremum::Max,
                        Period::Day,
                        &bucket,
                        true,
                    )?);
                    self.fill_accumulation(summary, metric, &bucket)?;
                    summary.daily_trend = Some(self.daily_trend(&self.solar, metric, &bucket)?);
                }
            }
            Domain::Weather => {
                let bucket = self.weather.bucket(time_stamp)?;
                for metric in Metric::WEATHER {
                    let summary = data.entry(metric);
                    self.fill_extrema(summary, metric, &bucket)?;
                    summary.daily_trend = Some(self.daily_trend(&self.weather, metric, &bucket)?);
                }
            }
        }

        Ok(data)
    }

    fn fill_extrema(
        &self,
        summary: &mut MetricSummary,
        metric: Metric,
        bucket: &TimeBucket,
    ) -> Result<(), StatsError> {
        let get = |extremum, period| self.weather.get_extremum(metric, extremum, period, bucket, true);

        summary.daily_max = Some(get(Extremum::Max, Period::Day)?);
        summary.daily_min = Some(get(Extremum::Min, Period::Day)?);
        summary.monthly_max = Some(get(Extremum::Max, Period::Month)?);
        summary.monthly_min = Some(get(Extremum::Min, Period::Month)?);
        summary.yearly_max = Some(get(Extremum::Max, Period::Year)?);
        summary.yearly_min = Some(get(Extremum::Min, Period::Year)?);
        Ok(())
    }

    fn fill_accumulation(
        &self,
        summary: &mut MetricSummary,
        metric: Metric,
        bucket: &TimeBucket,
    ) -> Result<(), StatsError> {
        let get = |period| self.solar.get_accumulated(metric, period, bucket, true);

        summary.day = Some(get(Period::Day)?);
        summary.week = Some(get(Period::Week)?);
        summary.month = Some(get(Period::Month)?);
        Ok(())
    }

    fn daily_trend(
        &self,
        engine: &StatsEngine,
        metric: Metric,
        bucket: &TimeBucket,
    ) -> Result<Vec<SeriesPoint>, StatsError> {
        let series = engine.get_trend(metric, Period::Day, bucket)?;
        Ok(display_series(&series, &self.trend))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::FixedOffset;

    use super::DashboardAssembler;
    use crate::cache::{ExtremumStore, MemoryCache};
    use crate::config::{Config, TrendConfig};
    use crate::metric::{Domain, Metric};
    use crate::reading::{GridData, InverterData, SolarReading, WeatherReading};
    use crate::record_store::SledRecordStore;
    use crate::stats::StatsEngine;

    const NOW: i64 = 1_631_858_701;

    fn assembler(db: &sled::Db) -> (DashboardAssembler, Arc<StatsEngine>, Arc<StatsEngine>) {
        let offset = FixedOffset::east_opt(0).expect("utc offset");
        let cache: Arc<dyn ExtremumStore> = Arc::new(MemoryCache::new());
        let config = Config::default();
        let engine = |domain| {
            let store = SledRecordStore::open(db, domain, offset).expect("open store");
            Arc::new(StatsEngine::new(Arc::new(store), cache.clone(), &config))
        };
        let solar = engine(Domain::Solar);
        let weather = engine(Domain::Weather);
        let assembler =
            DashboardAssembler::new(solar.clone(), weather.clone(), TrendConfig::default());
        (assembler, solar, weather)
    }

    fn seed(solar: &StatsEngine, weather: &StatsEngine) {
        for (offset, power, temp) in [(0, 1200.0, 14.0), (1800, 800.0, 18.5), (3600, 1000.0, 16.0)] {
            let inverter = InverterData {
                ac_power: power,
                ..InverterData::default()
            };
            let reading = SolarReading::from_parts(GridData::default(), inverter, NOW + offset);
            solar.insert(&reading.into()).expect("insert solar");

            let reading = WeatherReading {
                outdoor_temp: temp,
                uv_index: 3,
                time_stamp: NOW + offset,
                ..WeatherReading::default()
            };
            weather.insert(&reading.into()).expect("insert weather");
        }
    }

    #[test]
    fn weather_view_has_extrema_for_every_metric() {
        let temp = tempfile::tempdir().expect("temp dir");
        let db = sled::open(temp.path()).expect("open db");
        let (assembler, solar, weather) = assembler(&db);
        seed(&solar, &weather);
        weather.set_latest(Metric::OutdoorTemp, 16.0).expect("latest");

        let data = assembler.get_data(Domain::Weather, NOW).expect("data");

        assert_eq!(data.metrics.len(), 21);
        let outdoor = data.get(Metric::OutdoorTemp).expect("outdoor temp");
        assert_eq!(outdoor.latest, Some(16.0));
        assert_eq!(outdoor.daily_max, Some(18.5));
        assert_eq!(outdoor.daily_min, Some(14.0));
        assert_eq!(outdoor.yearly_max, Some(18.5));
        assert!(outdoor.daily_trend.is_none());
    }

    #[test]
    fn solar_view_accumulates_and_borrows_weather_latest() {
        let temp = tempfile::tempdir().expect("temp dir");
        let db = sled::open(temp.path()).expect("open db");
        let (assembler, solar, weather) = assembler(&db);
        seed(&solar, &weather);
        weather.set_latest(Metric::UvIndex, 3.0).expect("latest");

        let data = assembler.get_data(Domain::Solar, NOW).expect("data");

        assert_eq!(data.metrics.len(), 5);
        let power = data.get(Metric::InverterAcPower).expect("inverter power");
        assert_eq!(power.day, Some(850.0));
        assert_eq!(power.week, power.day);
        assert_eq!(power.daily_trend.as_ref().map(Vec::len), Some(3));
        assert_eq!(data.get(Metric::UvIndex).and_then(|uv| uv.latest), Some(3.0));
        assert!(data.get(Metric::SolarRadiation).expect("radiation").latest.is_none());
    }

    #[test]
    fn history_is_peak_oriented() {
        let temp = tempfile::tempdir().expect("temp dir");
        let db = sled::open(temp.path()).expect("open db");
        let (assembler, solar, weather) = assembler(&db);
        seed(&solar, &weather);

        let solar_history = assembler.get_history(Domain::Solar, NOW).expect("history");
        let power = solar_history.get(Metric::InverterAcPower).expect("inverter power");
        assert_eq!(power.daily_max, Some(1200.0));
        assert!(power.latest.is_none());

        let weather_history = assembler.get_history(Domain::Weather, NOW).expect("history");
        let outdoor = weather_history.get(Metric::OutdoorTemp).expect("outdoor temp");
        assert_eq!(outdoor.monthly_min, Some(14.0));
        assert_eq!(outdoor.daily_trend.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn serializes_only_present_fields() {
        let temp = tempfile::tempdir().expect("temp dir");
        let db = sled::open(temp.path()).expect("open db");
        let (assembler, solar, weather) = assembler(&db);
        seed(&solar, &weather);

        let data = assembler.get_data(Domain::Solar, NOW).expect("data");
        let json = serde_json::to_value(&data).expect("serialize");

        assert!(json["uv_index"].as_object().expect("uv entry").is_empty());
        assert_eq!(json["inverter_ac_power"]["daily_trend"][0][0], NOW);
        assert_eq!(json["inverter_ac_power"]["daily_trend"][0][1], 1200.0);
        assert!(json["inverter_ac_power"].get("latest").is_none());
    }
}

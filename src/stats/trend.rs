use crate::config::TrendConfig;
use crate::series::SeriesPoint;

/// Collapses consecutive runs of `bucket_size` points (the last run may be
/// shorter) into one point at the mean timestamp, rounded, and mean value.
pub fn downsample(series: &[SeriesPoint], bucket_size: usize) -> Vec<SeriesPoint> {
    if bucket_size == 0 {
        return series.to_vec();
    }

    series
        .chunks(bucket_size)
        .map(|chunk| {
            let count = chunk.len() as f64;
            let time_sum: f64 = chunk.iter().map(|point| point.time_stamp as f64).sum();
            let value_sum: f64 = chunk.iter().map(|point| point.value).sum();
            SeriesPoint::new((time_sum / count).round() as i64, value_sum / count)
        })
        .collect()
}

/// Series as charted: raw up to `raw_limit` points, bucketed beyond that.
pub fn display_series(series: &[SeriesPoint], trend: &TrendConfig) -> Vec<SeriesPoint> {
    if series.len() <= trend.raw_limit {
        series.to_vec()
    } else {
        downsample(series, trend.bucket_size)
    }
}

#[cfg(test)]
mod tests {
    use super::{display_series, downsample};
    use crate::config::TrendConfig;
    use crate::series::SeriesPoint;

    fn evenly_spaced(count: usize) -> Vec<SeriesPoint> {
        (0..count)
            .map(|index| SeriesPoint::new(1_631_858_701 + 20 * index as i64, 10.0 * (index + 1) as f64))
            .collect()
    }

    #[test]
    fn single_bucket_averages_time_and_value() {
        let reduced = downsample(&evenly_spaced(10), 10);
        assert_eq!(reduced, vec![SeriesPoint::new(1_631_858_791, 55.0)]);
    }

    #[test]
    fn keeps_final_partial_bucket() {
        let reduced = downsample(&evenly_spaced(5), 2);

        assert_eq!(reduced.len(), 3);
        assert_eq!(reduced[2], SeriesPoint::new(1_631_858_781, 50.0));
    }

    #[test]
    fn zero_bucket_size_is_identity() {
        let series = evenly_spaced(7);
        assert_eq!(downsample(&series, 0), series);
    }

    #[test]
    fn short_series_are_displayed_raw() {
        let trend = TrendConfig::default();
        let series = evenly_spaced(trend.raw_limit);

        assert_eq!(display_series(&series, &trend), series);
        assert!(display_series(&[], &trend).is_empty());
    }

    #[test]
    fn long_series_are_bucketed_by_fifty() {
        let trend = TrendConfig::default();
        let series = evenly_spaced(trend.raw_limit + 1);

        let displayed = display_series(&series, &trend);
        assert_eq!(displayed.len(), 6);
        assert_eq!(displayed[5], series[250]);
    }
}

use crate::series::SeriesPoint;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Area under a time-ordered series in `value × hours`. Each step adds the
/// rectangle under the newer point, then the signed triangle back to the
/// older one. Fewer than two points accumulate to 0.
pub fn accumulate(series: &[SeriesPoint]) -> f64 {
    let mut total = 0.0;
    for pair in series.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        let dt_hours = (current.time_stamp - previous.time_stamp) as f64 / SECONDS_PER_HOUR;

        total += current.value * dt_hours;
        total += (current.value - previous.value) * dt_hours * 0.5;
    }
    total
}

//! Unit conversions applied to raw station values before they are stored.

pub const DEFAULT_PLACES: u32 = 3;

const HPA_PER_INHG: f64 = 33.8639;
const HPA_PER_MMHG: f64 = 1.33322;
const KMH_PER_MPH: f64 = 1.60934;
const CM_PER_INCH: f64 = 2.54;

pub fn round_places(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

pub fn f_to_c(deg_f: f64, places: u32) -> f64 {
    round_places((deg_f - 32.0) * (5.0 / 9.0), places)
}

pub fn inhg_to_hpa(in_hg: f64, places: u32) -> f64 {
    round_places(in_hg * HPA_PER_INHG, places)
}

pub fn mmhg_to_hpa(mm_hg: f64, places: u32) -> f64 {
    round_places(mm_hg * HPA_PER_MMHG, places)
}

pub fn mph_to_kmh(mph: f64, places: u32) -> f64 {
    round_places(mph * KMH_PER_MPH, places)
}

pub fn in_to_cm(inch: f64, places: u32) -> f64 {
    round_places(inch * CM_PER_INCH, places)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_point_is_zero_celsius() {
        assert_eq!(f_to_c(32.0, DEFAULT_PLACES), 0.0);
    }

    #[test]
    fn fahrenheit_rounds_to_requested_places() {
        assert_eq!(f_to_c(100.0, DEFAULT_PLACES), 37.778);
        assert_eq!(f_to_c(100.0, 2), 37.78);
        assert_eq!(f_to_c(100.0, 4), 37.7778);
    }

    #[test]
    fn converts_pressure_units() {
        assert_eq!(inhg_to_hpa(29.714, DEFAULT_PLACES), 1006.232);
        assert_eq!(mmhg_to_hpa(760.0, DEFAULT_PLACES), 1013.247);
    }

    #[test]
    fn converts_speed_and_length() {
        assert_eq!(mph_to_kmh(100.0, DEFAULT_PLACES), 160.934);
        assert_eq!(in_to_cm(100.0, DEFAULT_PLACES), 254.0);
    }
}

use thiserror::Error;

use super::schema::Config;

const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.path must not be empty".to_string(),
            ));
        }
        for (name, value) in [
            ("cache.year_ttl_secs", self.cache.year_ttl_secs),
            ("cache.month_ttl_secs", self.cache.month_ttl_secs),
            ("cache.week_ttl_secs", self.cache.week_ttl_secs),
            ("cache.day_ttl_secs", self.cache.day_ttl_secs),
            ("cache.latest_ttl_secs", self.cache.latest_ttl_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&self.time.utc_offset_minutes) {
            return Err(ConfigError::Validation(format!(
                "time.utc_offset_minutes must be between -{0} and {0}",
                MAX_OFFSET_MINUTES
            )));
        }
        if self.trend.bucket_size == 0 {
            return Err(ConfigError::Validation(
                "trend.bucket_size must be greater than 0".to_string(),
            ));
        }
        if self.trend.raw_limit == 0 {
            return Err(ConfigError::Validation(
                "trend.raw_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.week_ttl_secs, 1800);
        assert_eq!(config.trend.bucket_size, 50);
    }

    #[test]
    fn rejects_zero_ttl() {
        let mut config = Config::default();
        config.cache.day_ttl_secs = 0;

        let error = config.validate().expect_err("zero ttl must fail");
        assert!(matches!(error, ConfigError::Validation(ref message) if message.contains("day_ttl_secs")));
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let mut config = Config::default();
        config.time.utc_offset_minutes = 24 * 60;

        assert!(config.validate().is_err());

        config.time.utc_offset_minutes = -600;
        assert!(config.validate().is_ok());
        assert_eq!(config.time.offset().local_minus_utc(), -600 * 60);
    }
}

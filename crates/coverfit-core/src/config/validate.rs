//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.artwork.max_width == 0 {
            return Err(ConfigError::ValidationError(
                "artwork.max_width must be > 0".into(),
            ));
        }
        if self.artwork.max_height == 0 {
            return Err(ConfigError::ValidationError(
                "artwork.max_height must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.artwork.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "artwork.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.processing.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "processing.extensions must list at least one extension".into(),
            ));
        }
        if self.pipeline.event_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.event_buffer must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let mut config = Config::default();
        config.artwork.max_width = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_width"));

        let mut config = Config::default();
        config.artwork.max_height = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_height"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let mut config = Config::default();
        config.artwork.jpeg_quality = 0;
        assert!(config.validate().is_err());

        config.artwork.jpeg_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));

        config.artwork.jpeg_quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.processing.extensions = vec![];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("extensions"));

        config.processing.extensions = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let mut config = Config::default();
        config.pipeline.event_buffer = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("event_buffer"));
    }
}

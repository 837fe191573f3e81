//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_body_bytes must be > 0".into(),
            ));
        }
        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "upstream.timeout_ms must be > 0".into(),
            ));
        }
        if self.upstream.provider != "vision" && self.upstream.provider != "caption" {
            return Err(ConfigError::ValidationError(format!(
                "upstream.provider must be \"vision\" or \"caption\", got \"{}\"",
                self.upstream.provider
            )));
        }
        if self.upstream.vision.max_labels == 0 {
            return Err(ConfigError::ValidationError(
                "upstream.vision.max_labels must be > 0".into(),
            ));
        }
        if self.upstream.vision.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "upstream.vision.endpoint must not be empty".into(),
            ));
        }
        if self.upstream.caption.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "upstream.caption.endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}

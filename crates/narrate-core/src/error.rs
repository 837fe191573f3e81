//! Error types for the image narration gateway.
//!
//! Per-request errors carry enough context to produce a useful JSON error
//! body without ever echoing the upstream credential back to the caller.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-request error taxonomy for the gateway pipeline.
///
/// Every variant maps to exactly one HTTP status; the server layer renders
/// the display form as a `{"error": "..."}` JSON body. A request produces
/// either one success body or one of these, never both, never neither.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Required credential or provider configuration is missing.
    /// No upstream call is attempted.
    #[error("{0}")]
    Config(String),

    /// Request body is missing, empty, or not in the expected shape.
    #[error("{0}")]
    MalformedInput(String),

    /// The upstream service failed: non-2xx status, connection error,
    /// or timeout. Includes the upstream error body when available.
    #[error("{message}")]
    Upstream {
        message: String,
        status_code: Option<u16>,
    },

    /// The upstream response parsed as JSON but lacks the expected fields.
    #[error("{0}")]
    UpstreamShape(String),
}

impl GatewayError {
    /// HTTP status the gateway surfaces for this error.
    pub fn status(&self) -> u16 {
        match self {
            GatewayError::MalformedInput(_) => 400,
            GatewayError::Config(_)
            | GatewayError::Upstream { .. }
            | GatewayError::UpstreamShape(_) => 500,
        }
    }
}

/// Convenience type alias for gateway results.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_maps_to_400() {
        let err = GatewayError::MalformedInput("no image field".to_string());
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_config_error_maps_to_500() {
        let err = GatewayError::Config("API key is not configured.".to_string());
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_upstream_error_maps_to_500_regardless_of_upstream_status() {
        let err = GatewayError::Upstream {
            message: "vision HTTP 403: forbidden".to_string(),
            status_code: Some(403),
        };
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_shape_error_maps_to_500() {
        let err = GatewayError::UpstreamShape("no responses".to_string());
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_display_is_the_bare_message() {
        let err = GatewayError::Upstream {
            message: "caption HTTP 503: model loading".to_string(),
            status_code: Some(503),
        };
        assert_eq!(err.to_string(), "caption HTTP 503: model loading");
    }
}

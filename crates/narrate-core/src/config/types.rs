//! Sub-configuration structs with service defaults.

use serde::{Deserialize, Serialize};

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Upstream provider selection and call limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Which narrator handles requests ("vision" or "caption")
    pub provider: String,

    /// Upstream call timeout in milliseconds
    pub timeout_ms: u64,

    /// Vision label-detection settings
    pub vision: VisionConfig,

    /// Hosted captioning settings
    pub caption: CaptionConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: Self::DEFAULT_PROVIDER.to_string(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            vision: VisionConfig::default(),
            caption: CaptionConfig::default(),
        }
    }
}

/// Vision label-detection service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Annotation endpoint; the API key is appended as a query parameter
    pub endpoint: String,

    /// API key, or a `${ENV_VAR}` reference resolved at startup
    pub api_key: String,

    /// Maximum labels requested per image
    pub max_labels: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: "${GOOGLE_API_KEY}".to_string(),
            max_labels: 10,
        }
    }
}

/// Hosted image-captioning service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Model inference endpoint; receives raw image bytes
    pub endpoint: String,

    /// Bearer token, or a `${ENV_VAR}` reference resolved at startup
    pub api_token: String,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            endpoint:
                "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-large"
                    .to_string(),
            api_token: "${HF_TOKEN}".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Default provider name used when the config omits one.
    pub const DEFAULT_PROVIDER: &'static str = "vision";

    /// Default upstream timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
}

//! Narrator trait and normalized result types.
//!
//! Defines the interface both upstream clients implement, plus the
//! factory that creates the configured one from the upstream config.

use crate::config::UpstreamConfig;
use crate::error::GatewayError;
use crate::payload::{ImagePayload, PayloadKind};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Normalized narration result returned to the caller.
///
/// Serializes as `{"labels": [...]}` or `{"caption": "..."}` — exactly one
/// data field, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Narration {
    /// Ordered label descriptions from the vision service
    Labels { labels: Vec<String> },
    /// Single natural-language caption
    Caption { caption: String },
}

/// Trait both upstream clients implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn ImageNarrator>` for dynamic dispatch).
#[async_trait]
pub trait ImageNarrator: Send + Sync {
    /// Narrator name for logging and health reporting.
    fn name(&self) -> &str;

    /// Which request body shape this narrator consumes.
    fn payload_kind(&self) -> PayloadKind;

    /// Send the image upstream and normalize the result.
    async fn narrate(&self, image: &ImagePayload) -> Result<Narration, GatewayError>;

    /// Per-request timeout for this narrator.
    fn timeout(&self) -> Duration;
}

impl std::fmt::Debug for dyn ImageNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageNarrator")
            .field("name", &self.name())
            .finish()
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the configured narrator.
pub struct NarratorFactory;

impl NarratorFactory {
    /// Create a narrator from the upstream config section.
    ///
    /// Resolves the credential at construction time; a missing credential
    /// is a `GatewayError::Config`, and no client is built.
    pub fn create(config: &UpstreamConfig) -> Result<Box<dyn ImageNarrator>, GatewayError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        match config.provider.as_str() {
            "vision" => {
                let api_key = resolve_env_var(&config.vision.api_key).ok_or_else(|| {
                    GatewayError::Config(
                        "Vision API key not set. Set GOOGLE_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::vision::VisionNarrator::new(
                    &config.vision.endpoint,
                    &api_key,
                    config.vision.max_labels,
                    timeout,
                )))
            }
            "caption" => {
                let api_token = resolve_env_var(&config.caption.api_token).ok_or_else(|| {
                    GatewayError::Config(
                        "Caption API token not set. Set HF_TOKEN env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::caption::CaptionNarrator::new(
                    &config.caption.endpoint,
                    &api_token,
                    timeout,
                )))
            }
            other => Err(GatewayError::Config(format!(
                "Unknown narrator provider: {other}"
            ))),
        }
    }
}

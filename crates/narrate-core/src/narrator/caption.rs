//! Hosted image-captioning narrator.
//!
//! POSTs the raw image bytes to a model inference endpoint with a bearer
//! token and extracts the generated caption from the response array.

use super::provider::{ImageNarrator, Narration};
use crate::error::GatewayError;
use crate::payload::{ImagePayload, PayloadKind};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Fallback caption when the model returns an entry without text.
const NO_DESCRIPTION: &str = "No description found.";

/// Hosted captioning narrator.
pub struct CaptionNarrator {
    endpoint: String,
    api_token: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl CaptionNarrator {
    pub fn new(endpoint: &str, api_token: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

/// One element of the inference response array.
#[derive(Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

/// First element's text, or the fixed placeholder when absent.
///
/// An empty response array is a shape error.
fn extract_caption(items: Vec<GeneratedText>) -> Result<String, GatewayError> {
    let first = items.into_iter().next().ok_or_else(|| {
        GatewayError::UpstreamShape("caption response contained no results".to_string())
    })?;
    Ok(first
        .generated_text
        .unwrap_or_else(|| NO_DESCRIPTION.to_string()))
}

#[async_trait]
impl ImageNarrator for CaptionNarrator {
    fn name(&self) -> &str {
        "caption"
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::RawBytes
    }

    async fn narrate(&self, image: &ImagePayload) -> Result<Narration, GatewayError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_token),
            )
            .body(image.bytes().to_vec())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream {
                message: format!("caption request failed: {}", e.without_url()),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                message: format!("caption HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let items: Vec<GeneratedText> = resp.json().await.map_err(|e| {
            GatewayError::UpstreamShape(format!(
                "failed to parse caption response: {}",
                e.without_url()
            ))
        })?;

        let caption = extract_caption(items)?;
        tracing::debug!(len = caption.len(), "caption received");
        Ok(Narration::Caption { caption })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_caption_takes_first_element() {
        let items: Vec<GeneratedText> = serde_json::from_str(
            r#"[{"generated_text":"a dog running on grass"},{"generated_text":"second"}]"#,
        )
        .unwrap();
        assert_eq!(extract_caption(items).unwrap(), "a dog running on grass");
    }

    #[test]
    fn test_missing_text_falls_back_to_placeholder() {
        let items: Vec<GeneratedText> = serde_json::from_str(r#"[{}]"#).unwrap();
        assert_eq!(extract_caption(items).unwrap(), "No description found.");
    }

    #[test]
    fn test_empty_array_is_shape_error() {
        let items: Vec<GeneratedText> = serde_json::from_str("[]").unwrap();
        assert!(matches!(
            extract_caption(items),
            Err(GatewayError::UpstreamShape(_))
        ));
    }
}

//! Vision label-detection narrator.
//!
//! Sends the base64 image to an images:annotate endpoint with the API key
//! as a query parameter, and projects the label annotations into an
//! ordered list of descriptions.

use super::provider::{ImageNarrator, Narration};
use crate::error::GatewayError;
use crate::payload::{ImagePayload, PayloadKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vision label-detection narrator.
pub struct VisionNarrator {
    endpoint: String,
    api_key: String,
    max_labels: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl VisionNarrator {
    pub fn new(endpoint: &str, api_key: &str, max_labels: u32, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_labels,
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateItem>,
}

#[derive(Serialize)]
struct AnnotateItem {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

// --- Response types ---

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Deserialize)]
struct AnnotateResult {
    #[serde(rename = "labelAnnotations", default)]
    label_annotations: Vec<LabelAnnotation>,
}

#[derive(Deserialize)]
struct LabelAnnotation {
    description: String,
}

/// Project the annotate response to the ordered label descriptions.
///
/// An empty `responses` sequence is a shape error; a missing or empty
/// `labelAnnotations` list is a valid empty result.
fn project_labels(resp: AnnotateResponse) -> Result<Vec<String>, GatewayError> {
    let first = resp.responses.into_iter().next().ok_or_else(|| {
        GatewayError::UpstreamShape("vision response contained no results".to_string())
    })?;
    Ok(first
        .label_annotations
        .into_iter()
        .map(|l| l.description)
        .collect())
}

#[async_trait]
impl ImageNarrator for VisionNarrator {
    fn name(&self) -> &str {
        "vision"
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::DataUrlJson
    }

    async fn narrate(&self, image: &ImagePayload) -> Result<Narration, GatewayError> {
        let body = AnnotateRequest {
            requests: vec![AnnotateItem {
                image: ImageContent {
                    content: image.base64().to_string(),
                },
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION".to_string(),
                    max_results: self.max_labels,
                }],
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream {
                // reqwest errors can carry the request URL, and ours
                // carries the key as a query parameter
                message: format!("vision request failed: {}", e.without_url()),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                message: format!("vision HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let annotate: AnnotateResponse = resp.json().await.map_err(|e| {
            GatewayError::UpstreamShape(format!(
                "failed to parse vision response: {}",
                e.without_url()
            ))
        })?;

        let labels = project_labels(annotate)?;
        tracing::debug!(count = labels.len(), "vision labels received");
        Ok(Narration::Labels { labels })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

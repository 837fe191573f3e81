//! The request pipeline: credential check, payload extraction, upstream
//! call, result normalization.
//!
//! A [`Gateway`] is built once per process from the loaded configuration
//! and shared across requests; everything else is request-scoped.

use crate::config::Config;
use crate::error::GatewayError;
use crate::narrator::{ImageNarrator, Narration, NarratorFactory};
use crate::payload;
use std::sync::Arc;

/// Narrator slot inside the gateway.
///
/// A missing credential degrades the gateway instead of failing startup:
/// every request is answered with the recorded configuration error and the
/// upstream is never contacted.
enum NarratorState {
    Ready(Arc<dyn ImageNarrator>),
    Unconfigured(String),
}

/// Process-lifetime gateway state.
pub struct Gateway {
    state: NarratorState,
}

impl Gateway {
    /// Build the gateway, constructing the configured narrator once.
    pub fn from_config(config: &Config) -> Self {
        let state = match NarratorFactory::create(&config.upstream) {
            Ok(narrator) => {
                tracing::info!(provider = narrator.name(), "narrator ready");
                NarratorState::Ready(Arc::from(narrator))
            }
            Err(e) => {
                tracing::error!("narrator unavailable: {e}");
                NarratorState::Unconfigured(e.to_string())
            }
        };
        Self { state }
    }

    /// Build a gateway around an explicit narrator.
    pub fn with_narrator(narrator: Arc<dyn ImageNarrator>) -> Self {
        Self {
            state: NarratorState::Ready(narrator),
        }
    }

    /// Name of the configured narrator, if one was built.
    pub fn provider(&self) -> Option<&str> {
        match &self.state {
            NarratorState::Ready(narrator) => Some(narrator.name()),
            NarratorState::Unconfigured(_) => None,
        }
    }

    /// Handle one request body.
    ///
    /// Stages run strictly in order: credential check, payload extraction,
    /// one bounded upstream call. The narrator normalizes the upstream
    /// response, so a success here is already in wire shape.
    pub async fn handle(&self, body: &[u8]) -> Result<Narration, GatewayError> {
        let narrator = match &self.state {
            NarratorState::Ready(narrator) => narrator,
            NarratorState::Unconfigured(message) => {
                return Err(GatewayError::Config(message.clone()));
            }
        };

        let image = payload::extract(narrator.payload_kind(), body)?;

        // The reqwest client enforces the same bound per request; this
        // outer timeout also covers connect/DNS stalls before send.
        let bound = narrator.timeout();
        match tokio::time::timeout(bound, narrator.narrate(&image)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Upstream {
                message: format!("upstream call timed out after {}ms", bound.as_millis()),
                status_code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ImagePayload, PayloadKind};
    use async_trait::async_trait;
    use base64::Engine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted narrator that counts upstream calls.
    struct MockNarrator {
        kind: PayloadKind,
        result: Narration,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl MockNarrator {
        fn labels(labels: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                kind: PayloadKind::DataUrlJson,
                result: Narration::Labels {
                    labels: labels.iter().map(|s| s.to_string()).collect(),
                },
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow_caption(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                kind: PayloadKind::RawBytes,
                result: Narration::Caption {
                    caption: "never returned".to_string(),
                },
                delay: Some(delay),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageNarrator for MockNarrator {
        fn name(&self) -> &str {
            "mock"
        }

        fn payload_kind(&self) -> PayloadKind {
            self.kind
        }

        async fn narrate(&self, _image: &ImagePayload) -> Result<Narration, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.result.clone())
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }
    }

    fn data_url_body(bytes: &[u8]) -> Vec<u8> {
        let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        format!(r#"{{"image": "data:image/jpeg;base64,{b64}"}}"#).into_bytes()
    }

    fn unconfigured_gateway() -> Gateway {
        let mut config = Config::default();
        config.upstream.vision.api_key = "${NARRATE_TEST_UNSET_GATEWAY_KEY}".to_string();
        Gateway::from_config(&config)
    }

    #[tokio::test]
    async fn test_success_passes_narration_through() {
        let mock = MockNarrator::labels(&["cat", "indoor"]);
        let gateway = Gateway::with_narrator(mock.clone());

        let narration = gateway.handle(&data_url_body(b"fake jpeg")).await.unwrap();
        assert_eq!(
            narration,
            Narration::Labels {
                labels: vec!["cat".to_string(), "indoor".to_string()],
            }
        );
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_reports_config_error_without_upstream_call() {
        let gateway = unconfigured_gateway();
        assert_eq!(gateway.provider(), None);

        // Even a well-formed body must not reach any upstream
        let err = gateway.handle(&data_url_body(b"fake jpeg")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert_eq!(err.status(), 500);
    }

    #[tokio::test]
    async fn test_missing_credential_wins_over_malformed_body() {
        // Stage order: the credential check runs before the body is parsed
        let gateway = unconfigured_gateway();
        let err = gateway.handle(b"not json at all").await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_never_calls_upstream() {
        let mock = MockNarrator::labels(&["cat"]);
        let gateway = Gateway::with_narrator(mock.clone());

        let err = gateway.handle(br#"{"no_image": true}"#).await.unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_upstream_times_out() {
        let mock = MockNarrator::slow_caption(Duration::from_secs(60));
        let gateway = Gateway::with_narrator(mock.clone());

        let err = gateway.handle(b"raw image bytes").await.unwrap_err();
        match err {
            GatewayError::Upstream { message, .. } => {
                assert!(message.contains("timed out"));
            }
            other => panic!("expected Upstream timeout, got {other:?}"),
        }
        assert_eq!(mock.calls(), 1);
    }
}

//! The inbound HTTP surface: one narration route plus health.
//!
//! The body is read as raw bytes so both deployment variants work behind
//! the same route — the configured narrator decides whether it is a JSON
//! data-URL envelope or a raw image.

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, App, HttpServer, Responder};
use narrate_core::{Config, Gateway, GatewayError};
use serde_json::json;

/// Wraps `GatewayError` so actix can render it (orphan rule).
#[derive(Debug)]
pub struct ApiError(GatewayError);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError(err)
    }
}

impl actix_web::error::ResponseError for ApiError {
    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Handle a narration request.
#[post("/api/narrate")]
async fn narrate(body: web::Bytes, state: web::Data<Gateway>) -> Result<impl Responder, ApiError> {
    match state.handle(&body).await {
        Ok(narration) => Ok(web::Json(narration)),
        Err(e) => {
            tracing::warn!(status = e.status(), "narration failed: {e}");
            Err(ApiError(e))
        }
    }
}

/// Liveness and configuration probe.
#[get("/healthz")]
async fn healthz(state: web::Data<Gateway>) -> impl Responder {
    web::Json(json!({
        "status": "ok",
        "provider": state.provider(),
        "configured": state.provider().is_some(),
    }))
}

/// Run the server until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let gateway = web::Data::new(Gateway::from_config(&config));
    let max_body_bytes = config.server.max_body_bytes;
    let bind = (config.server.host.clone(), config.server.port);

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "starting narration gateway"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(gateway.clone())
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .service(narrate)
            .service(healthz)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use async_trait::async_trait;
    use narrate_core::{GatewayError, ImageNarrator, ImagePayload, Narration, PayloadKind};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    struct StubNarrator {
        kind: PayloadKind,
        result: Result<Narration, &'static str>,
    }

    #[async_trait]
    impl ImageNarrator for StubNarrator {
        fn name(&self) -> &str {
            "stub"
        }

        fn payload_kind(&self) -> PayloadKind {
            self.kind
        }

        async fn narrate(&self, _image: &ImagePayload) -> Result<Narration, GatewayError> {
            self.result.clone().map_err(|msg| GatewayError::Upstream {
                message: msg.to_string(),
                status_code: Some(503),
            })
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    fn app_with(
        gateway: Gateway,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(gateway))
            .service(narrate)
            .service(healthz)
    }

    fn label_gateway(labels: &[&str]) -> Gateway {
        Gateway::with_narrator(Arc::new(StubNarrator {
            kind: PayloadKind::DataUrlJson,
            result: Ok(Narration::Labels {
                labels: labels.iter().map(|s| s.to_string()).collect(),
            }),
        }))
    }

    #[actix_web::test]
    async fn test_narrate_returns_labels_json() {
        let app = test::init_service(app_with(label_gateway(&["cat", "indoor"]))).await;

        let req = test::TestRequest::post()
            .uri("/api/narrate")
            .set_payload(r#"{"image": "data:image/jpeg;base64,aGVsbG8="}"#)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({ "labels": ["cat", "indoor"] }));
    }

    #[actix_web::test]
    async fn test_narrate_returns_caption_json() {
        let gateway = Gateway::with_narrator(Arc::new(StubNarrator {
            kind: PayloadKind::RawBytes,
            result: Ok(Narration::Caption {
                caption: "a dog running on grass".to_string(),
            }),
        }));
        let app = test::init_service(app_with(gateway)).await;

        let req = test::TestRequest::post()
            .uri("/api/narrate")
            .set_payload(vec![0xFF, 0xD8, 0xFF])
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({ "caption": "a dog running on grass" }));
    }

    #[actix_web::test]
    async fn test_malformed_body_is_400_with_error_field() {
        let app = test::init_service(app_with(label_gateway(&[]))).await;

        let req = test::TestRequest::post()
            .uri("/api/narrate")
            .set_payload(r#"{"no_image": true}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().len() > 0);
        assert!(body.get("labels").is_none());
    }

    #[actix_web::test]
    async fn test_upstream_failure_is_500_with_error_field() {
        let gateway = Gateway::with_narrator(Arc::new(StubNarrator {
            kind: PayloadKind::RawBytes,
            result: Err("caption HTTP 503 Service Unavailable: model loading"),
        }));
        let app = test::init_service(app_with(gateway)).await;

        let req = test::TestRequest::post()
            .uri("/api/narrate")
            .set_payload(vec![1, 2, 3])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("503"));
    }

    #[actix_web::test]
    async fn test_unconfigured_gateway_is_500_json() {
        let mut config = Config::default();
        config.upstream.vision.api_key = "${NARRATE_TEST_UNSET_SERVER_KEY}".to_string();
        let app = test::init_service(app_with(Gateway::from_config(&config))).await;

        let req = test::TestRequest::post()
            .uri("/api/narrate")
            .set_payload(r#"{"image": "data:image/jpeg;base64,aGVsbG8="}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("GOOGLE_API_KEY"));
    }

    #[actix_web::test]
    async fn test_healthz_reports_provider() {
        let app = test::init_service(app_with(label_gateway(&[]))).await;

        let req = test::TestRequest::get().uri("/healthz").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "stub");
        assert_eq!(body["configured"], true);
    }
}

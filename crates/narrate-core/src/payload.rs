//! Incoming payload extraction.
//!
//! The two deployment variants accept different body shapes: a JSON
//! envelope carrying a base64 data URL, or the raw image bytes verbatim.
//! Each narrator declares which shape it consumes via [`PayloadKind`], and
//! [`extract`] is the single entry point the gateway calls.

use crate::error::GatewayError;
use base64::Engine;
use serde::Deserialize;

/// Which request body shape a narrator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// JSON envelope `{"image": "data:<mime>;base64,<data>"}`
    DataUrlJson,
    /// Raw image bytes, used verbatim
    RawBytes,
}

/// JSON envelope sent by data-URL clients.
#[derive(Deserialize)]
struct ImageEnvelope {
    image: String,
}

/// An image extracted from a request. Request-scoped; dropped once the
/// response is written.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Raw image bytes
    data: Vec<u8>,
    /// Base64 form as sent upstream. For data-URL input this is the
    /// client's encoding verbatim, not a re-encode.
    base64: String,
    /// MIME type parsed from the data-URL prefix, when present
    media_type: Option<String>,
}

impl ImagePayload {
    /// Parse a `data:<mime>;base64,<data>` string.
    ///
    /// The substring after the first comma is the base64 payload; decoding
    /// it must reconstruct the original bytes exactly.
    pub fn from_data_url(url: &str) -> Result<Self, GatewayError> {
        let (prefix, b64) = url.split_once(',').ok_or_else(|| {
            GatewayError::MalformedInput(
                "image field is not a data URL (missing comma separator)".to_string(),
            )
        })?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .map_err(|e| {
                GatewayError::MalformedInput(format!("invalid base64 image data: {e}"))
            })?;

        Ok(Self {
            data,
            base64: b64.to_string(),
            media_type: parse_media_type(prefix),
        })
    }

    /// Wrap a raw request body. Only non-emptiness is checked.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GatewayError> {
        if bytes.is_empty() {
            return Err(GatewayError::MalformedInput(
                "empty request body".to_string(),
            ));
        }
        Ok(Self {
            data: bytes.to_vec(),
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: None,
        })
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Base64-encoded image bytes.
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// MIME type from the data-URL prefix, if the client sent one.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }
}

/// Extract an image from a request body according to the narrator's kind.
pub fn extract(kind: PayloadKind, body: &[u8]) -> Result<ImagePayload, GatewayError> {
    match kind {
        PayloadKind::DataUrlJson => {
            let envelope: ImageEnvelope = serde_json::from_slice(body)
                .map_err(|e| GatewayError::MalformedInput(format!("invalid request JSON: {e}")))?;
            ImagePayload::from_data_url(&envelope.image)
        }
        PayloadKind::RawBytes => ImagePayload::from_bytes(body),
    }
}

/// `data:image/jpeg;base64` -> `image/jpeg`
fn parse_media_type(prefix: &str) -> Option<String> {
    let rest = prefix.strip_prefix("data:")?;
    let mime = rest.split(';').next()?;
    if mime.is_empty() {
        None
    } else {
        Some(mime.to_string())
    }
}

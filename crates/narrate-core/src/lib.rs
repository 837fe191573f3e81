//! Narrate Core - image narration gateway library.
//!
//! The gateway accepts an uploaded image, forwards it to a third-party
//! image-understanding service, and returns a normalized JSON result:
//! a list of labels or a single caption.
//!
//! # Architecture
//!
//! One request-handling pipeline with five sequential stages:
//!
//! ```text
//! Request → Credential check → Payload extraction → Upstream call → Narration
//! ```
//!
//! Two interchangeable narrators sit behind [`ImageNarrator`]: a vision
//! label-detection client (JSON data-URL payloads, key as query parameter)
//! and a hosted captioning client (raw image bytes, bearer token). The
//! deployed variant is selected by configuration, not by code.
//!
//! # Usage
//!
//! ```rust,ignore
//! use narrate_core::{Config, Gateway};
//!
//! let config = Config::load()?;
//! let gateway = Gateway::from_config(&config);
//! let narration = gateway.handle(request_body).await?;
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod gateway;
pub mod narrator;
pub mod payload;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use narrator::{ImageNarrator, Narration, NarratorFactory};
pub use payload::{ImagePayload, PayloadKind};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Shared application state for the `formrelay` server.
//!
//! A single [`AppState`] is constructed at startup from a [`RelayConfig`] and
//! shared across requests via `Arc`. It is immutable after construction; no
//! request can observe another.

use std::sync::Arc;

use anyhow::Context;

use formrelay_core::{
    Credentials, DeliveryService, RecaptchaVerifier, Relay, ValidationMode, VerificationService,
    Web3FormsDelivery,
};

use crate::config::RelayConfig;
use crate::cors::OriginPolicy;

/// Shared application state passed to the relay handler.
#[derive(Debug)]
pub struct AppState {
    /// The verify-then-deliver pipeline.
    pub relay: Relay,
    /// Caller origin allow-list.
    pub origins: OriginPolicy,
    /// Which payload fields are mandatory.
    pub validation: ValidationMode,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Maximum number of requests handled concurrently.
    pub max_concurrency: usize,
}

impl AppState {
    /// Build state talking to the real verification and delivery services.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .user_agent(concat!("formrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build upstream HTTP client")?;

        let verifier = Arc::new(RecaptchaVerifier::new(client.clone(), &config.verify_url));
        let delivery = Arc::new(Web3FormsDelivery::new(client, &config.delivery_url));
        Ok(Self::with_services(config, verifier, delivery))
    }

    /// Build state around caller-supplied upstream services.
    #[must_use]
    pub fn with_services(
        config: &RelayConfig,
        verifier: Arc<dyn VerificationService>,
        delivery: Arc<dyn DeliveryService>,
    ) -> Self {
        let credentials = Credentials {
            verification_secret: config.verification_secret.clone(),
            access_key: config.access_key.clone(),
        };
        let relay = Relay::new(verifier, delivery, credentials)
            .with_labels(config.labels.clone())
            .with_timeout(config.upstream_timeout);

        Self {
            relay,
            origins: OriginPolicy::new(&config.allowed_origins),
            validation: config.validation,
            max_body_bytes: config.max_body_bytes,
            max_concurrency: config.max_concurrency,
        }
    }
}

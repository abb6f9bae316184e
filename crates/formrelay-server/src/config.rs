//! Server configuration for `formrelay`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The resulting [`RelayConfig`] is passed explicitly into
//! [`AppState::from_config`](crate::state::AppState::from_config); handlers
//! never read the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use formrelay_core::relay::DEFAULT_UPSTREAM_TIMEOUT;
use formrelay_core::{RECAPTCHA_VERIFY_URL, SenderLabels, ValidationMode, WEB3FORMS_SUBMIT_URL};

/// Default inbound body cap in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024;

/// Default cap on in-flight requests.
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;

/// Server configuration.
#[derive(Clone)]
pub struct RelayConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Shared secret for the verification service.
    pub verification_secret: Option<String>,
    /// Access key for the delivery service.
    pub access_key: Option<String>,
    /// Allowed caller origins. Empty or containing `*` means allow all.
    pub allowed_origins: Vec<String>,
    /// Verification endpoint URL.
    pub verify_url: String,
    /// Delivery endpoint URL.
    pub delivery_url: String,
    /// Timeout applied to each upstream call.
    pub upstream_timeout: Duration,
    /// Which payload fields are mandatory.
    pub validation: ValidationMode,
    /// Subject and sender labels attached to delivered submissions.
    pub labels: SenderLabels,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Maximum number of requests handled concurrently.
    pub max_concurrency: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            log_level: "info".to_owned(),
            verification_secret: None,
            access_key: None,
            allowed_origins: Vec::new(),
            verify_url: RECAPTCHA_VERIFY_URL.to_owned(),
            delivery_url: WEB3FORMS_SUBMIT_URL.to_owned(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            validation: ValidationMode::Strict,
            labels: SenderLabels::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `RELAY_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8787`)
    /// - `RELAY_LOG_LEVEL` — log filter (default: `info`)
    /// - `RECAPTCHA_SECRET` or `RECAPTCHA_SECRET_KEY` — verification secret
    /// - `W3FORM_ID` or `WEB3FORMS_ACCESS_KEY` — delivery access key
    /// - `ALLOWED_ORIGIN` — comma-separated origin allow-list (default: allow all)
    /// - `RELAY_VERIFY_URL` / `RELAY_DELIVERY_URL` — upstream endpoints
    /// - `RELAY_UPSTREAM_TIMEOUT_SECS` — per-call timeout (default: `5`)
    /// - `RELAY_VALIDATION` — `strict` or `token-only` (default: `strict`)
    /// - `RELAY_SUBJECT` / `RELAY_FROM_NAME` — delivery labels
    /// - `RELAY_MAX_BODY_BYTES` — inbound body cap (default: `16384`)
    /// - `RELAY_MAX_CONCURRENCY` — in-flight request cap (default: `64`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Priority: RELAY_BIND_ADDR > PORT > default 127.0.0.1:8787
        let bind_addr = if let Some(addr) = non_empty("RELAY_BIND_ADDR") {
            addr.parse().unwrap_or(defaults.bind_addr)
        } else if let Some(port) = non_empty("PORT").and_then(|p| p.parse::<u16>().ok()) {
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            defaults.bind_addr
        };

        let verification_secret =
            non_empty("RECAPTCHA_SECRET").or_else(|| non_empty("RECAPTCHA_SECRET_KEY"));
        let access_key = non_empty("W3FORM_ID").or_else(|| non_empty("WEB3FORMS_ACCESS_KEY"));

        let allowed_origins = lookup("ALLOWED_ORIGIN")
            .map(|raw| parse_origin_list(&raw))
            .unwrap_or_default();

        let upstream_timeout = non_empty("RELAY_UPSTREAM_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.upstream_timeout, Duration::from_secs);

        let validation = non_empty("RELAY_VALIDATION")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.validation);

        let labels = SenderLabels {
            subject: non_empty("RELAY_SUBJECT").unwrap_or(defaults.labels.subject),
            from_name: non_empty("RELAY_FROM_NAME").unwrap_or(defaults.labels.from_name),
        };

        let max_body_bytes = non_empty("RELAY_MAX_BODY_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        let max_concurrency = non_empty("RELAY_MAX_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_concurrency);

        Self {
            bind_addr,
            log_level: non_empty("RELAY_LOG_LEVEL").unwrap_or(defaults.log_level),
            verification_secret,
            access_key,
            allowed_origins,
            verify_url: non_empty("RELAY_VERIFY_URL").unwrap_or(defaults.verify_url),
            delivery_url: non_empty("RELAY_DELIVERY_URL").unwrap_or(defaults.delivery_url),
            upstream_timeout,
            validation,
            labels,
            max_body_bytes,
            max_concurrency,
        }
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("RelayConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("verification_secret", &redact(&self.verification_secret))
            .field("access_key", &redact(&self.access_key))
            .field("allowed_origins", &self.allowed_origins)
            .field("verify_url", &self.verify_url)
            .field("delivery_url", &self.delivery_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("validation", &self.validation)
            .field("labels", &self.labels)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

/// Split a comma-separated origin list, dropping blanks.
#[must_use]
pub fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

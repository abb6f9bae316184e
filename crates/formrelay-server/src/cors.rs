//! Origin policy and cross-origin response headers.
//!
//! `tower-http`'s `CorsLayer` cannot answer a disallowed preflight with 403
//! or fall back to the first configured origin, so the relay resolves the
//! caller's origin itself and stamps the headers on every response.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, VARY,
};
use axum::http::{HeaderMap, HeaderValue};
use tracing::warn;

/// Methods advertised to browsers.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// How long browsers may cache a preflight answer, in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// Allow-list of caller origins.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<HeaderValue>,
    allow_all: bool,
}

impl OriginPolicy {
    /// Build a policy from configured origins. An empty list or a `*` entry
    /// opens the policy to every origin.
    #[must_use]
    pub fn new(origins: &[String]) -> Self {
        let allow_all = origins.is_empty() || origins.iter().any(|o| o == "*");
        let allowed = origins
            .iter()
            .filter(|o| o.as_str() != "*")
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring allowed origin that is not a valid header value");
                    None
                }
            })
            .collect();
        Self { allowed, allow_all }
    }

    /// Whether every origin is accepted.
    #[must_use]
    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Decide how to answer a caller presenting `origin` (if any).
    #[must_use]
    pub fn resolve(&self, origin: Option<&HeaderValue>) -> CorsDecision {
        let origin = origin.filter(|o| !o.is_empty());

        if self.allow_all {
            return CorsDecision {
                allowed: true,
                allow_origin: origin.cloned().unwrap_or(HeaderValue::from_static("*")),
            };
        }

        match origin {
            Some(o) if self.allowed.contains(o) => CorsDecision {
                allowed: true,
                allow_origin: o.clone(),
            },
            // Never echo a rejected origin; point the browser at the first configured one.
            _ => CorsDecision {
                allowed: false,
                allow_origin: self
                    .allowed
                    .first()
                    .cloned()
                    .unwrap_or(HeaderValue::from_static("*")),
            },
        }
    }
}

/// Resolved cross-origin answer for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    /// Whether the caller's origin passed the policy.
    pub allowed: bool,
    /// Value for `Access-Control-Allow-Origin`.
    pub allow_origin: HeaderValue,
}

impl CorsDecision {
    /// Headers carried by every relay response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }

    /// Headers for a preflight answer. Echoes the requested headers when the
    /// browser named any.
    pub fn apply_preflight(&self, headers: &mut HeaderMap, requested: Option<&HeaderValue>) {
        self.apply(headers);
        if let Some(requested) = requested.filter(|v| !v.is_empty()) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        }
        headers.insert(
            ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
    }
}

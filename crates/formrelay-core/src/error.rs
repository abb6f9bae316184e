//! Error types for `formrelay-core`.
//!
//! Errors never carry secrets, access keys, or the submitted token. Upstream
//! payloads are kept only where the caller needs them for diagnostics.

use crate::verify::VerificationResult;

/// Errors from building a [`Submission`](crate::Submission) out of an inbound payload.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// One or more required fields are absent or empty.
    #[error("missing required fields")]
    MissingFields,
}

/// Errors from a single outbound call to an upstream service.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The call did not complete within the configured timeout.
    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    /// The call failed at the transport level (DNS, connect, TLS, reset).
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    /// Classify a `reqwest` failure, keeping timeouts distinct.
    pub(crate) fn from_reqwest(service: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { service }
        } else {
            Self::Transport { service, source }
        }
    }
}

/// Errors from running one submission through the relay pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The verification secret is not configured.
    #[error("server misconfigured (missing verification secret)")]
    MissingVerificationSecret,

    /// The delivery access key is not configured.
    #[error("server misconfigured (missing delivery access key)")]
    MissingAccessKey,

    /// The verification service rejected the token or scored it too low.
    #[error("verification failed")]
    VerificationRejected { result: VerificationResult },

    /// The delivery service reported failure or answered with a non-2xx status.
    #[error("delivery failed with status {status}: {message}")]
    DeliveryFailed {
        status: u16,
        message: String,
        details: serde_json::Value,
    },

    /// An upstream call could not be completed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

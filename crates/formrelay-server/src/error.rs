//! HTTP error types for the `formrelay` server.
//!
//! Maps client-input failures and pipeline errors from `formrelay-core` into
//! HTTP responses. Every variant produces the same envelope as a success:
//! `{success, message, details?}`.

use axum::http::header::ALLOW;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use formrelay_core::{RelayError, SubmissionError, UpstreamError};

use crate::cors::ALLOWED_METHODS;
use crate::envelope::Envelope;

/// Application-level error returned from the relay handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Caller origin is not on the allow-list.
    #[error("Forbidden origin")]
    ForbiddenOrigin,

    /// Method other than `POST` / `OPTIONS`.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Request body exceeded the configured cap.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Request body could not be read, e.g. the caller hung up mid-upload.
    #[error("Invalid request body")]
    UnreadableBody,

    /// Request body is not valid JSON.
    #[error("Invalid JSON payload")]
    InvalidJson,

    /// Required fields are absent.
    #[error("Missing required fields")]
    MissingFields,

    /// Failure inside the verify-then-deliver pipeline.
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::MissingFields => Self::MissingFields,
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ForbiddenOrigin => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnreadableBody | Self::InvalidJson | Self::MissingFields => {
                StatusCode::BAD_REQUEST
            }
            Self::Relay(err) => match err {
                RelayError::MissingVerificationSecret | RelayError::MissingAccessKey => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                RelayError::VerificationRejected { .. } => StatusCode::BAD_REQUEST,
                RelayError::DeliveryFailed { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                RelayError::Upstream(UpstreamError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
                RelayError::Upstream(UpstreamError::Transport { .. }) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn into_envelope(self) -> Envelope {
        match self {
            Self::Relay(RelayError::MissingVerificationSecret) => {
                error!("verification secret is not configured");
                Envelope::failure("Server misconfigured (missing verification secret)")
            }
            Self::Relay(RelayError::MissingAccessKey) => {
                error!("delivery access key is not configured");
                Envelope::failure("Server misconfigured (missing delivery access key)")
            }
            Self::Relay(RelayError::VerificationRejected { result }) => {
                Envelope::failure("Verification failed").with_details(result.raw.to_value())
            }
            Self::Relay(RelayError::DeliveryFailed {
                message, details, ..
            }) => Envelope::failure(message).with_details(details),
            Self::Relay(RelayError::Upstream(err)) => {
                error!(error = %err, "upstream call failed");
                match err {
                    UpstreamError::Timeout { .. } => Envelope::failure("Upstream request timed out"),
                    UpstreamError::Transport { .. } => Envelope::failure("Upstream request failed"),
                }
            }
            other => Envelope::failure(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let method_not_allowed = matches!(self, Self::MethodNotAllowed);

        let mut response = (status, axum::Json(self.into_envelope())).into_response();
        if method_not_allowed {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formrelay_core::{UpstreamBody, VerificationResult};
    use serde_json::json;

    #[test]
    fn client_errors_are_4xx() {
        assert_eq!(AppError::ForbiddenOrigin.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(AppError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn unreadable_body_is_bad_request_not_too_large() {
        let err = AppError::UnreadableBody;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.into_envelope().message, "Invalid request body");
    }

    #[test]
    fn misconfiguration_is_5xx() {
        let err = AppError::from(RelayError::MissingAccessKey);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn delivery_status_is_mirrored() {
        let err = AppError::from(RelayError::DeliveryFailed {
            status: 429,
            message: "slow down".to_owned(),
            details: json!({}),
        });
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        let err = AppError::from(RelayError::Upstream(UpstreamError::Timeout {
            service: "delivery",
        }));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn rejection_envelope_carries_raw_payload() {
        let raw = UpstreamBody::parse(br#"{"success": false, "error-codes": ["bad"]}"#);
        let err = AppError::from(RelayError::VerificationRejected {
            result: VerificationResult::from_body(raw),
        });
        let envelope = err.into_envelope();
        assert!(!envelope.success);
        assert_eq!(envelope.message, "Verification failed");
        assert_eq!(
            envelope.details,
            Some(json!({"success": false, "error-codes": ["bad"]}))
        );
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "POST, OPTIONS");
    }
}

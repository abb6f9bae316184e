//! Proof-of-humanity token verification.
//!
//! The relay calls the verification service exactly once per submission. A
//! token is accepted only if the service reports `success: true` and, when it
//! also reports a numeric `score`, that score is at least [`MIN_SCORE`].

use async_trait::async_trait;
use tracing::debug;

use crate::error::UpstreamError;
use crate::upstream::UpstreamBody;

/// Lowest confidence score that still counts as human.
pub const MIN_SCORE: f64 = 0.5;

/// Default reCAPTCHA verification endpoint.
pub const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

const SERVICE: &str = "verification";

/// Outcome of one verification call.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Whether the token passed.
    pub accepted: bool,
    /// Confidence score, if the service reported one.
    pub score: Option<f64>,
    /// The service's raw response, kept for diagnostics.
    pub raw: UpstreamBody,
}

impl VerificationResult {
    /// Interpret a verification response body.
    #[must_use]
    pub fn from_body(raw: UpstreamBody) -> Self {
        let score = raw.number("score");
        let accepted = raw.declares_success() && score.is_none_or(|s| s >= MIN_SCORE);
        Self {
            accepted,
            score,
            raw,
        }
    }
}

/// A service that checks proof-of-humanity tokens.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait]
pub trait VerificationService: Send + Sync + 'static {
    /// Verify `token` using the shared `secret`.
    ///
    /// A malformed response body is not an error: it yields a rejected
    /// [`VerificationResult`] with an empty raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] only when the call itself fails.
    async fn verify(&self, secret: &str, token: &str) -> Result<VerificationResult, UpstreamError>;
}

/// Google reCAPTCHA `siteverify` client.
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    url: String,
}

impl RecaptchaVerifier {
    /// Create a verifier posting to `url` through a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl VerificationService for RecaptchaVerifier {
    async fn verify(&self, secret: &str, token: &str) -> Result<VerificationResult, UpstreamError> {
        let response = self
            .client
            .post(&self.url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;
        let result = VerificationResult::from_body(UpstreamBody::parse(&bytes));

        debug!(status = %status, accepted = result.accepted, score = ?result.score, "verification response");
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body(value: &serde_json::Value) -> UpstreamBody {
        UpstreamBody::parse(value.to_string().as_bytes())
    }

    #[test]
    fn high_score_is_accepted() {
        let result = VerificationResult::from_body(body(&json!({"success": true, "score": 0.9})));
        assert!(result.accepted);
        assert_eq!(result.score, Some(0.9));
    }

    #[test]
    fn score_at_threshold_is_accepted() {
        let result = VerificationResult::from_body(body(&json!({"success": true, "score": 0.5})));
        assert!(result.accepted);
    }

    #[test]
    fn low_score_is_rejected() {
        let result = VerificationResult::from_body(body(&json!({"success": true, "score": 0.2})));
        assert!(!result.accepted);
    }

    #[test]
    fn success_without_score_is_accepted() {
        let result = VerificationResult::from_body(body(&json!({"success": true})));
        assert!(result.accepted);
        assert_eq!(result.score, None);
    }

    #[test]
    fn unsuccessful_is_rejected_regardless_of_score() {
        let result = VerificationResult::from_body(body(&json!({
            "success": false,
            "score": 0.99,
            "error-codes": ["timeout-or-duplicate"],
        })));
        assert!(!result.accepted);
    }

    #[test]
    fn empty_body_is_rejected() {
        let result = VerificationResult::from_body(UpstreamBody::Empty);
        assert!(!result.accepted);
        assert_eq!(result.raw, UpstreamBody::Empty);
    }

    #[tokio::test]
    async fn posts_form_encoded_secret_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/siteverify"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("secret=s3cret"))
            .and(body_string_contains("response=tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "score": 0.8,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let verifier = RecaptchaVerifier::new(
            reqwest::Client::new(),
            format!("{}/siteverify", server.uri()),
        );
        let result = verifier.verify("s3cret", "tok-1").await.unwrap();
        assert!(result.accepted);
        assert_eq!(result.score, Some(0.8));
    }

    #[tokio::test]
    async fn malformed_response_is_rejected_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let verifier = RecaptchaVerifier::new(reqwest::Client::new(), server.uri());
        let result = verifier.verify("s", "t").await.unwrap();
        assert!(!result.accepted);
        assert_eq!(result.raw, UpstreamBody::Empty);
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let verifier = RecaptchaVerifier::new(reqwest::Client::new(), "http://127.0.0.1:9/");
        let err = verifier.verify("s", "t").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport { service: "verification", .. }));
    }

    #[tokio::test]
    async fn truncated_body_is_transport_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await;
            // Promise 64 bytes, send a few, hang up.
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"success\":")
                .await;
        });

        let verifier = RecaptchaVerifier::new(reqwest::Client::new(), format!("http://{addr}/"));
        let err = verifier.verify("s", "t").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport { service: "verification", .. }));
    }
}

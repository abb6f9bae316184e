//! The verify-then-deliver pipeline.
//!
//! [`Relay::submit`] runs one submission through three fallible steps, each
//! short-circuiting on failure:
//!
//! 1. credentials check — both secrets must be configured
//! 2. token verification — exactly one call, delivery is skipped on rejection
//! 3. delivery — exactly one call
//!
//! Nothing is retried and nothing is remembered between submissions. Each
//! outbound call is bounded by the relay's timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::deliver::{DeliveryRequest, DeliveryResponse, DeliveryService};
use crate::error::{RelayError, UpstreamError};
use crate::submission::Submission;
use crate::verify::{VerificationResult, VerificationService};

/// Default per-call timeout for upstream requests.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Status reported when the delivery service failed without an error status.
const FALLBACK_FAILURE_STATUS: u16 = 502;

const DEFAULT_MESSAGE: &str = "Delivery service error";

/// Secrets the relay needs at request time.
///
/// Either may be absent; absence is reported per request as a server
/// misconfiguration rather than refusing to start.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Shared secret for the verification service.
    pub verification_secret: Option<String>,
    /// Access key for the delivery service.
    pub access_key: Option<String>,
}

impl Credentials {
    fn require(&self) -> Result<(&str, &str), RelayError> {
        let secret = self
            .verification_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(RelayError::MissingVerificationSecret)?;
        let access_key = self
            .access_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(RelayError::MissingAccessKey)?;
        Ok((secret, access_key))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("Credentials")
            .field("verification_secret", &redact(&self.verification_secret))
            .field("access_key", &redact(&self.access_key))
            .finish()
    }
}

/// Subject and sender labels attached to every delivered submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderLabels {
    pub subject: String,
    pub from_name: String,
}

impl Default for SenderLabels {
    fn default() -> Self {
        Self {
            subject: "Irontrip Contact".to_owned(),
            from_name: "Irontrip Landing".to_owned(),
        }
    }
}

/// A successfully relayed submission.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub verification: VerificationResult,
    pub delivery: DeliveryResponse,
}

/// Stateless relay shared by all requests.
pub struct Relay {
    verifier: Arc<dyn VerificationService>,
    delivery: Arc<dyn DeliveryService>,
    credentials: Credentials,
    labels: SenderLabels,
    timeout: Duration,
}

impl Relay {
    /// Create a relay with default labels and timeout.
    #[must_use]
    pub fn new(
        verifier: Arc<dyn VerificationService>,
        delivery: Arc<dyn DeliveryService>,
        credentials: Credentials,
    ) -> Self {
        Self {
            verifier,
            delivery,
            credentials,
            labels: SenderLabels::default(),
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Override the subject and sender labels.
    #[must_use]
    pub fn with_labels(mut self, labels: SenderLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Override the per-call upstream timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Verify and deliver one submission.
    ///
    /// # Errors
    ///
    /// - [`RelayError::MissingVerificationSecret`] / [`RelayError::MissingAccessKey`]
    ///   before any outbound call
    /// - [`RelayError::VerificationRejected`] without calling delivery
    /// - [`RelayError::DeliveryFailed`] when delivery reports failure
    /// - [`RelayError::Upstream`] when either call times out or fails in transport
    pub async fn submit(&self, submission: &Submission) -> Result<Delivered, RelayError> {
        let (secret, access_key) = self.credentials.require()?;
        let verification = self.verify(secret, &submission.token).await?;
        let delivery = self.deliver(access_key, submission).await?;

        info!(score = ?verification.score, "submission delivered");
        Ok(Delivered {
            verification,
            delivery,
        })
    }

    async fn verify(&self, secret: &str, token: &str) -> Result<VerificationResult, RelayError> {
        let result = bounded(
            "verification",
            self.timeout,
            self.verifier.verify(secret, token),
        )
        .await?;

        if result.accepted {
            Ok(result)
        } else {
            info!(score = ?result.score, "verification rejected submission");
            Err(RelayError::VerificationRejected { result })
        }
    }

    async fn deliver(
        &self,
        access_key: &str,
        submission: &Submission,
    ) -> Result<DeliveryResponse, RelayError> {
        let request = DeliveryRequest {
            access_key,
            name: &submission.name,
            email: &submission.email,
            message: &submission.message,
            subject: &self.labels.subject,
            from_name: &self.labels.from_name,
        };

        let response = bounded("delivery", self.timeout, self.delivery.deliver(&request)).await?;
        if response.is_delivered() {
            return Ok(response);
        }

        let status = response.status.unwrap_or(FALLBACK_FAILURE_STATUS);
        let message = response.body.text("message").unwrap_or(DEFAULT_MESSAGE).to_owned();
        warn!(upstream_status = ?response.status, status, "delivery service reported failure");

        Err(RelayError::DeliveryFailed {
            status,
            message,
            details: response.body.to_value(),
        })
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("credentials", &self.credentials)
            .field("labels", &self.labels)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

async fn bounded<T>(
    service: &'static str,
    limit: Duration,
    call: impl Future<Output = Result<T, UpstreamError>>,
) -> Result<T, UpstreamError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| UpstreamError::Timeout { service })?
}

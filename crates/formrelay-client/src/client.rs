//! Relay client implementation.

use reqwest::header::ACCEPT;

use crate::challenge::ChallengeProvider;
use crate::error::ClientError;
use crate::types::{ContactForm, RelayReply, RelayRequest, SubmitOutcome};
use crate::{DEFAULT_TIMEOUT, GENERIC_FAILURE, RelayClient, RelayClientConfig};

impl RelayClient {
    /// Create a client for `endpoint` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the endpoint is empty.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_config(RelayClientConfig {
            endpoint: endpoint.into(),
            ..Default::default()
        })
    }

    /// Create a client from `FORMRELAY_ENDPOINT`, `FORMRELAY_TIMEOUT_SECS`,
    /// and `FORMRELAY_ACTION`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if `FORMRELAY_ENDPOINT` is not set.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::with_config(RelayClientConfig::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Create a client with full configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the endpoint is empty, or
    /// `ClientError::Network` if the HTTP client cannot be built.
    #[allow(clippy::needless_pass_by_value)]
    pub fn with_config(cfg: RelayClientConfig) -> Result<Self, ClientError> {
        let endpoint = cfg.endpoint.trim().to_owned();
        if endpoint.is_empty() {
            return Err(ClientError::Config(
                "missing relay endpoint — set FORMRELAY_ENDPOINT or pass endpoint in config"
                    .to_owned(),
            ));
        }

        let timeout = if cfg.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            cfg.timeout
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("formrelay-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            endpoint,
            action: cfg.action,
            client,
        })
    }

    /// Submit the contact form.
    ///
    /// A form whose decoy field is filled is dropped before any network
    /// activity. When a challenge provider is supplied, the client waits for
    /// it to become ready and requests a token for the configured action;
    /// without one the token is sent empty. Every failure is turned into a
    /// [`SubmitOutcome::Failed`] carrying a visitor-facing message.
    pub async fn submit(
        &self,
        form: &ContactForm,
        challenge: Option<&dyn ChallengeProvider>,
    ) -> SubmitOutcome {
        if form.is_spam() {
            return SubmitOutcome::Dropped;
        }

        let token = match challenge {
            Some(provider) => match self.challenge_token(provider).await {
                Ok(token) => token,
                Err(_) => {
                    return SubmitOutcome::Failed {
                        message: "Could not verify that you are human. Please try again."
                            .to_owned(),
                    };
                }
            },
            None => String::new(),
        };

        let request = RelayRequest {
            token: &token,
            name: &form.name,
            email: &form.email,
            message: &form.message,
        };

        match self.send(&request).await {
            Ok(message) => SubmitOutcome::Sent { message },
            Err(ClientError::Rejected { message, .. }) => SubmitOutcome::Failed { message },
            Err(_) => SubmitOutcome::Failed {
                message: GENERIC_FAILURE.to_owned(),
            },
        }
    }

    // --- Private ---

    async fn challenge_token(&self, provider: &dyn ChallengeProvider) -> Result<String, ClientError> {
        provider.ready().await?;
        provider.execute(&self.action).await
    }

    async fn send(&self, request: &RelayRequest<'_>) -> Result<String, ClientError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        let reply: RelayReply = serde_json::from_slice(&bytes)?;

        if status.is_success() && reply.success {
            Ok(reply
                .message
                .unwrap_or_else(|| "Thanks! Your message has been sent.".to_owned()))
        } else {
            Err(ClientError::Rejected {
                status: status.as_u16(),
                message: reply.message.unwrap_or_else(|| GENERIC_FAILURE.to_owned()),
            })
        }
    }
}

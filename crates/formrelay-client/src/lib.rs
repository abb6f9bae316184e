//! Client for the `formrelay` contact form relay.
//!
//! Builds a submission from the contact form, optionally obtains a
//! proof-of-humanity token, and sends exactly one request to the relay.
//! The client never holds the delivery access key or the verification
//! secret; the request type has no field for either.
//!
//! # Example
//!
//! ```rust,no_run
//! use formrelay_client::{ContactForm, RelayClient, SubmitOutcome};
//!
//! # async fn example() -> Result<(), formrelay_client::ClientError> {
//! let client = RelayClient::new("https://relay.example.workers.dev")?;
//! let form = ContactForm::new("Ada", "ada@example.com", "Can I borrow a rack?");
//! if let SubmitOutcome::Failed { message } = client.submit(&form, None).await {
//!     // show `message` next to the form
//!     let _ = message;
//! }
//! # Ok(())
//! # }
//! ```

mod challenge;
mod client;
mod error;
mod types;

pub use challenge::ChallengeProvider;
pub use error::ClientError;
pub use types::{ContactForm, SubmitOutcome};

use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_ACTION: &str = "submit";

/// Message shown when the relay could not be reached or answered garbage.
pub const GENERIC_FAILURE: &str = "Could not send your message. Please try again.";

/// Configuration for the relay client.
#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    /// Relay endpoint URL.
    pub endpoint: String,
    /// Request timeout. Default: 10 seconds.
    pub timeout: Duration,
    /// Action label the challenge token is scoped to. Default: `submit`.
    pub action: String,
}

impl Default for RelayClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: DEFAULT_TIMEOUT,
            action: DEFAULT_ACTION.to_owned(),
        }
    }
}

impl RelayClientConfig {
    /// Build configuration from an arbitrary key lookup, reading
    /// `FORMRELAY_ENDPOINT`, `FORMRELAY_TIMEOUT_SECS`, and `FORMRELAY_ACTION`.
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = non_empty("FORMRELAY_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .map_or(defaults.timeout, Duration::from_secs);

        Self {
            endpoint: non_empty("FORMRELAY_ENDPOINT").unwrap_or_default(),
            timeout,
            action: non_empty("FORMRELAY_ACTION").unwrap_or(defaults.action),
        }
    }
}

/// Contact form relay client.
#[derive(Debug, Clone)]
pub struct RelayClient {
    endpoint: String,
    action: String,
    client: reqwest::Client,
}

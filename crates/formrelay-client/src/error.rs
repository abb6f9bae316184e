//! Error types for the relay client.

/// All errors that can occur while talking to the relay.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Missing or invalid configuration.
    #[error("formrelay config error: {0}")]
    Config(String),

    /// The challenge widget failed to produce a token.
    #[error("challenge error: {0}")]
    Challenge(String),

    /// The relay answered with a failure envelope or an error status.
    #[error("relay rejected submission ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message from the relay's envelope.
        message: String,
    },

    /// Request timed out.
    #[error("formrelay request timed out")]
    Timeout,

    /// Network or HTTP client error.
    #[error("formrelay network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The relay's answer was not a valid envelope.
    #[error("formrelay json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

//! Proof-of-humanity challenge widgets.

use async_trait::async_trait;

use crate::error::ClientError;

/// A third-party challenge widget that issues proof-of-humanity tokens.
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    /// Wait until the widget is loaded and able to issue tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Challenge`] if the widget never becomes ready.
    async fn ready(&self) -> Result<(), ClientError> {
        Ok(())
    }

    /// Request a single-use token scoped to `action`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Challenge`] if the widget refuses.
    async fn execute(&self, action: &str) -> Result<String, ClientError>;
}

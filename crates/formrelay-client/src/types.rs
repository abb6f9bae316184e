//! Public types for the relay client.

use serde::{Deserialize, Serialize};

/// What the visitor typed into the contact form.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Hidden field real visitors never see. Bots fill it in.
    pub decoy: String,
}

impl ContactForm {
    /// A form with an empty decoy field.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            decoy: String::new(),
        }
    }

    /// `true` when the decoy field was filled in.
    #[must_use]
    pub fn is_spam(&self) -> bool {
        !self.decoy.trim().is_empty()
    }
}

/// Result of one submit attempt. Never an error: failures carry a message
/// meant for the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The relay accepted and delivered the submission.
    Sent { message: String },
    /// The decoy field was filled; nothing was sent.
    Dropped,
    /// Something went wrong; show `message` to the visitor.
    Failed { message: String },
}

// --- Wire types ---

/// Body posted to the relay. Deliberately has no access key field.
#[derive(Serialize)]
pub(crate) struct RelayRequest<'a> {
    pub token: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// The relay's `{success, message, details?}` envelope.
#[derive(Deserialize)]
pub(crate) struct RelayReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

//! Contact form submissions.
//!
//! A [`Submission`] is built once from the inbound JSON payload and never
//! mutated afterwards. Which fields are mandatory depends on the configured
//! [`ValidationMode`].

use std::str::FromStr;

use serde_json::Value;

use crate::error::SubmissionError;

/// How strictly inbound payloads are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Token, name, email, and message are all required.
    #[default]
    Strict,
    /// Only the token is required; other fields default to empty strings.
    TokenOnly,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "token-only" | "token_only" | "tokenonly" => Ok(Self::TokenOnly),
            other => Err(format!(
                "unknown validation mode '{other}', expected 'strict' or 'token-only'"
            )),
        }
    }
}

/// One contact form submission plus its proof-of-humanity token.
#[derive(Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub token: String,
}

impl Submission {
    /// Build a submission from a parsed JSON payload.
    ///
    /// A field counts as present only if it is a non-empty JSON string. A
    /// payload that is not an object is treated as an object with no fields.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::MissingFields`] if a field required by
    /// `mode` is absent.
    pub fn from_payload(payload: &Value, mode: ValidationMode) -> Result<Self, SubmissionError> {
        let field = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        let token = field("token").ok_or(SubmissionError::MissingFields)?;
        let (name, email, message) = (field("name"), field("email"), field("message"));

        if mode == ValidationMode::Strict && (name.is_none() || email.is_none() || message.is_none())
        {
            return Err(SubmissionError::MissingFields);
        }

        Ok(Self {
            name: name.unwrap_or_default().to_owned(),
            email: email.unwrap_or_default().to_owned(),
            message: message.unwrap_or_default().to_owned(),
            token: token.to_owned(),
        })
    }
}

// Hand-written so submitted content and the token stay out of logs.
impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("name_len", &self.name.len())
            .field("email_len", &self.email.len())
            .field("message_len", &self.message.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> Value {
        json!({
            "token": "tok-123",
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Lending a kettlebell in Lisbon",
        })
    }

    #[test]
    fn strict_accepts_complete_payload() {
        let sub = Submission::from_payload(&full(), ValidationMode::Strict).unwrap();
        assert_eq!(sub.token, "tok-123");
        assert_eq!(sub.name, "Ada");
        assert_eq!(sub.email, "ada@example.com");
        assert_eq!(sub.message, "Lending a kettlebell in Lisbon");
    }

    #[test]
    fn strict_rejects_missing_message() {
        let mut payload = full();
        payload.as_object_mut().unwrap().remove("message");
        let result = Submission::from_payload(&payload, ValidationMode::Strict);
        assert!(matches!(result, Err(SubmissionError::MissingFields)));
    }

    #[test]
    fn strict_rejects_empty_string_fields() {
        let mut payload = full();
        payload["email"] = json!("");
        let result = Submission::from_payload(&payload, ValidationMode::Strict);
        assert!(matches!(result, Err(SubmissionError::MissingFields)));
    }

    #[test]
    fn non_string_field_counts_as_missing() {
        let mut payload = full();
        payload["name"] = json!(42);
        let result = Submission::from_payload(&payload, ValidationMode::Strict);
        assert!(matches!(result, Err(SubmissionError::MissingFields)));
    }

    #[test]
    fn token_only_defaults_other_fields() {
        let sub = Submission::from_payload(&json!({"token": "t"}), ValidationMode::TokenOnly)
            .unwrap();
        assert_eq!(sub.token, "t");
        assert!(sub.name.is_empty());
        assert!(sub.email.is_empty());
        assert!(sub.message.is_empty());
    }

    #[test]
    fn token_is_always_required() {
        let result = Submission::from_payload(
            &json!({"name": "a", "email": "b", "message": "c"}),
            ValidationMode::TokenOnly,
        );
        assert!(matches!(result, Err(SubmissionError::MissingFields)));
    }

    #[test]
    fn non_object_payload_is_missing_fields() {
        for payload in [json!(null), json!([1, 2]), json!("token")] {
            let result = Submission::from_payload(&payload, ValidationMode::TokenOnly);
            assert!(matches!(result, Err(SubmissionError::MissingFields)));
        }
    }

    #[test]
    fn validation_mode_parses() {
        assert_eq!("strict".parse::<ValidationMode>(), Ok(ValidationMode::Strict));
        assert_eq!("Token-Only".parse::<ValidationMode>(), Ok(ValidationMode::TokenOnly));
        assert!("lenient".parse::<ValidationMode>().is_err());
    }

    #[test]
    fn debug_output_hides_content() {
        let sub = Submission::from_payload(&full(), ValidationMode::Strict).unwrap();
        let rendered = format!("{sub:?}");
        assert!(!rendered.contains("tok-123"));
        assert!(!rendered.contains("ada@example.com"));
    }
}

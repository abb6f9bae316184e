//! Defensive parsing of upstream response bodies.
//!
//! Neither upstream service is trusted to return well-formed JSON. Every body
//! goes through [`UpstreamBody::parse`], which never fails: anything that is
//! not a JSON object collapses to [`UpstreamBody::Empty`] and is then handled
//! by the normal rejection path of whichever step consumed it.

use serde_json::{Map, Value};

/// An upstream response body, parsed or empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UpstreamBody {
    /// The body was a JSON object.
    Parsed(Map<String, Value>),
    /// The body was missing, not JSON, or JSON that is not an object.
    #[default]
    Empty,
}

impl UpstreamBody {
    /// Parse raw bytes, substituting [`UpstreamBody::Empty`] for anything unusable.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Self::Parsed(map),
            _ => Self::Empty,
        }
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Parsed(map) => map.get(key),
            Self::Empty => None,
        }
    }

    /// `true` only when the body has a `success` field that is literally `true`.
    #[must_use]
    pub fn declares_success(&self) -> bool {
        matches!(self.get("success"), Some(Value::Bool(true)))
    }

    /// A numeric field, if present and a JSON number.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// A non-empty string field.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The body as a JSON value, `{}` when empty. Used for response `details`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Parsed(map) => Value::Object(map.clone()),
            Self::Empty => Value::Object(Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_body_is_parsed() {
        let body = UpstreamBody::parse(br#"{"success": true, "score": 0.7}"#);
        assert!(body.declares_success());
        assert_eq!(body.number("score"), Some(0.7));
    }

    #[test]
    fn html_error_page_becomes_empty() {
        let body = UpstreamBody::parse(b"<html><body>502 Bad Gateway</body></html>");
        assert_eq!(body, UpstreamBody::Empty);
        assert!(!body.declares_success());
        assert_eq!(body.to_value(), json!({}));
    }

    #[test]
    fn non_object_json_becomes_empty() {
        assert_eq!(UpstreamBody::parse(b"[1, 2, 3]"), UpstreamBody::Empty);
        assert_eq!(UpstreamBody::parse(b"true"), UpstreamBody::Empty);
        assert_eq!(UpstreamBody::parse(b""), UpstreamBody::Empty);
    }

    #[test]
    fn success_must_be_boolean_true() {
        let body = UpstreamBody::parse(br#"{"success": "true"}"#);
        assert!(!body.declares_success());
    }

    #[test]
    fn text_skips_empty_and_non_strings() {
        let body = UpstreamBody::parse(br#"{"message": "", "code": 5, "hint": "ok"}"#);
        assert_eq!(body.text("message"), None);
        assert_eq!(body.text("code"), None);
        assert_eq!(body.text("hint"), Some("ok"));
    }
}

//! Forwarding verified submissions to the form-delivery service.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::UpstreamError;
use crate::upstream::UpstreamBody;

/// Default Web3Forms submission endpoint.
pub const WEB3FORMS_SUBMIT_URL: &str = "https://api.web3forms.com/submit";

const SERVICE: &str = "delivery";

/// JSON body sent to the delivery service.
#[derive(Serialize)]
pub struct DeliveryRequest<'a> {
    pub access_key: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
    pub subject: &'a str,
    pub from_name: &'a str,
}

impl std::fmt::Debug for DeliveryRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryRequest")
            .field("subject", &self.subject)
            .field("from_name", &self.from_name)
            .finish_non_exhaustive()
    }
}

/// What the delivery service answered.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryResponse {
    /// HTTP status, if the transport exposed one.
    pub status: Option<u16>,
    /// Parsed body, or [`UpstreamBody::Empty`].
    pub body: UpstreamBody,
}

impl DeliveryResponse {
    /// Delivered only when the status is 2xx and the body declares success.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s)) && self.body.declares_success()
    }
}

/// A service that performs the actual notification delivery.
#[async_trait]
pub trait DeliveryService: Send + Sync + 'static {
    /// Submit one verified form.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] only when the call itself fails. Rejections
    /// reported by the service come back as a [`DeliveryResponse`].
    async fn deliver(&self, request: &DeliveryRequest<'_>) -> Result<DeliveryResponse, UpstreamError>;
}

/// Web3Forms client.
#[derive(Debug, Clone)]
pub struct Web3FormsDelivery {
    client: reqwest::Client,
    url: String,
}

impl Web3FormsDelivery {
    /// Create a delivery client posting to `url` through a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DeliveryService for Web3FormsDelivery {
    async fn deliver(&self, request: &DeliveryRequest<'_>) -> Result<DeliveryResponse, UpstreamError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;
        let body = UpstreamBody::parse(&bytes);

        debug!(status, success = body.declares_success(), "delivery response");
        Ok(DeliveryResponse {
            status: Some(status),
            body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> DeliveryRequest<'static> {
        DeliveryRequest {
            access_key: "key-1",
            name: "Ada",
            email: "ada@example.com",
            message: "hello",
            subject: "Irontrip Contact",
            from_name: "Irontrip Landing",
        }
    }

    #[test]
    fn delivered_requires_2xx_and_success() {
        let ok = UpstreamBody::parse(br#"{"success": true}"#);
        let failed = UpstreamBody::parse(br#"{"success": false}"#);

        let resp = |status, body: &UpstreamBody| DeliveryResponse {
            status,
            body: body.clone(),
        };
        assert!(resp(Some(200), &ok).is_delivered());
        assert!(!resp(Some(502), &ok).is_delivered());
        assert!(!resp(Some(200), &failed).is_delivered());
        assert!(!resp(None, &ok).is_delivered());
        assert!(!resp(Some(200), &UpstreamBody::Empty).is_delivered());
    }

    #[tokio::test]
    async fn posts_json_with_labels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("accept", "application/json"))
            .and(body_json(json!({
                "access_key": "key-1",
                "name": "Ada",
                "email": "ada@example.com",
                "message": "hello",
                "subject": "Irontrip Contact",
                "from_name": "Irontrip Landing",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let delivery = Web3FormsDelivery::new(reqwest::Client::new(), server.uri());
        let resp = delivery.deliver(&request()).await.unwrap();
        assert_eq!(resp.status, Some(200));
        assert!(resp.is_delivered());
    }

    #[tokio::test]
    async fn error_status_and_garbage_body_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let delivery = Web3FormsDelivery::new(reqwest::Client::new(), server.uri());
        let resp = delivery.deliver(&request()).await.unwrap();
        assert_eq!(resp.status, Some(503));
        assert_eq!(resp.body, UpstreamBody::Empty);
        assert!(!resp.is_delivered());
    }

    #[test]
    fn debug_hides_access_key() {
        let rendered = format!("{:?}", request());
        assert!(!rendered.contains("key-1"));
        assert!(!rendered.contains("ada@example.com"));
    }
}

//! Request descriptor type

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Everything needed to send one HTTP request to the service under test.
///
/// A descriptor is moved into the transport when it is sent, so each send
/// consumes one descriptor. Benchmarks therefore build a fresh descriptor per
/// iteration, and retrying executors keep their own clone for later attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Unique identifier, used to correlate log lines
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Creates a body-less request.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Creates a GET request with the given URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request with the given URL and body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(HttpMethod::Post, url).with_body(body)
    }

    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the raw request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON body and sets `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> DomainResult<Self> {
        let body =
            serde_json::to_vec(value).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        Ok(self
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }

    /// Parses the target URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed.
    pub fn parse_url(&self) -> DomainResult<Url> {
        Url::parse(&self.url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.url)))
    }

    /// Returns the body length in bytes (zero when there is no body).
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_post_request() {
        let req = RequestDescriptor::post("http://localhost:8080/hello", r#"{"name":"World"}"#);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body_len(), 16);
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let req = RequestDescriptor::new(HttpMethod::Put, "http://localhost/items/1")
            .with_json(&serde_json::json!({"name": "World"}))
            .unwrap();

        assert_eq!(req.headers.get("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(br#"{"name":"World"}"#.as_slice()));
    }

    #[test]
    fn test_each_descriptor_has_its_own_id() {
        let a = RequestDescriptor::get("http://localhost/health");
        let b = RequestDescriptor::get("http://localhost/health");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_parse_url() {
        assert!(RequestDescriptor::get("http://localhost:9999/health").parse_url().is_ok());
        assert!(matches!(
            RequestDescriptor::get("localhost/health").parse_url(),
            Err(DomainError::InvalidUrl(_))
        ));
    }
}

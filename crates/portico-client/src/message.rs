//! Outbound request and response values.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// A request about to leave the process.
///
/// `url` may be relative until the [`Provider`](crate::Provider) resolves it
/// against its base; interceptors always see the absolute form.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Shorthand for a `POST` request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Adds a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON body and sets `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Json`] if serialization fails.
    pub fn with_json<T: Serialize>(self, value: &T) -> ClientResult<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body))
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl OutboundResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the body as text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Json`] if the body does not decode into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_slice(&self.body).map_err(ClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_request_builders() {
        let request = OutboundRequest::post("/items")
            .with_header(
                HeaderName::from_static("x-trace"),
                HeaderValue::from_static("abc"),
            )
            .with_body("raw");

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "/items");
        assert_eq!(request.headers["x-trace"], "abc");
        assert_eq!(request.body.as_deref(), Some(&b"raw"[..]));
    }

    #[test]
    fn test_request_json_body() {
        let request = OutboundRequest::post("/items")
            .with_json(&Item { id: 7 })
            .unwrap();

        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.body.unwrap(), Bytes::from_static(br#"{"id":7}"#));
    }

    #[test]
    fn test_response_helpers() {
        let mut response = OutboundResponse::new(StatusCode::OK, r#"{"id":1}"#);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        assert!(response.is_success());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.text(), Some(r#"{"id":1}"#));
        assert_eq!(response.json::<Item>().unwrap(), Item { id: 1 });
    }

    #[test]
    fn test_response_invalid_json() {
        let response = OutboundResponse::new(StatusCode::BAD_GATEWAY, "not json");
        assert!(!response.is_success());
        assert!(matches!(response.json::<Item>(), Err(ClientError::Json(_))));
    }
}

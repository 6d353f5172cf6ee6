//! Test response wrapper.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// A rendered dispatcher response with helper methods for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl From<Response<Bytes>> for TestResponse {
    fn from(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

impl TestResponse {
    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        Ok(String::from_utf8(self.body.to_vec())?)
    }

    /// Parses the whole body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        if self.body.is_empty() {
            return Err(TestError::EmptyBody);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Returns the envelope's `message` member.
    pub fn message(&self) -> Result<String, TestError> {
        let envelope: Value = self.json()?;
        Ok(envelope["message"].as_str().unwrap_or_default().to_string())
    }

    /// Parses the envelope's `results` member.
    pub fn results<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        let mut envelope: Value = self.json()?;
        let results = envelope
            .get_mut("results")
            .map(Value::take)
            .ok_or(TestError::MissingResults)?;
        Ok(serde_json::from_value(results)?)
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status differs, printing the body.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected}, got {}. Body: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts the response is JSON.
    ///
    /// # Panics
    ///
    /// Panics if the `Content-Type` is not `application/json`.
    #[track_caller]
    pub fn assert_json(&self) -> &Self {
        assert_eq!(
            self.header_str(header::CONTENT_TYPE.as_str()),
            Some("application/json"),
            "Expected a JSON response"
        );
        self
    }

    /// Asserts the response has no body.
    ///
    /// # Panics
    ///
    /// Panics if the body is not empty.
    #[track_caller]
    pub fn assert_empty(&self) -> &Self {
        assert!(
            self.body.is_empty(),
            "Expected an empty body, got: {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }
}

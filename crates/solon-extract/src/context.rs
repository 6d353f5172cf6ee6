//! Extraction context providing access to request data.
//!
//! The [`ExtractionContext`] is the already-routed request the binding layer
//! works from: method, URI, headers, body, and the router's path captures.

use crate::PathParams;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};

/// Context providing access to all parts of an HTTP request.
///
/// # Example
///
/// ```rust
/// use solon_extract::{ExtractionContext, PathParams};
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let mut params = PathParams::new();
/// params.push("id", "123");
///
/// let ctx = ExtractionContext::new(
///     Method::GET,
///     Uri::from_static("/rewards/123"),
///     HeaderMap::new(),
///     Bytes::new(),
///     params,
/// );
///
/// assert_eq!(ctx.method(), &Method::GET);
/// assert_eq!(ctx.path_params().get("id"), Some("123"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
}

impl ExtractionContext {
    /// Creates a new extraction context.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: PathParams,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
        }
    }

    /// Builds a context from an `http::Request` and the router's captures.
    #[must_use]
    pub fn from_request(request: http::Request<Bytes>, path_params: PathParams) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body, path_params)
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body as bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the router's path captures.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Returns a specific header value as a string.
    ///
    /// Lookup is case-insensitive. Values that are not visible ASCII are
    /// treated as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Builder for constructing an `ExtractionContext`.
///
/// Method and URI default to `GET /` when not set.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
}

impl ExtractionContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Sets the URI from a string, ignoring values that do not parse.
    #[must_use]
    pub fn uri_str(mut self, uri: &str) -> Self {
        if let Ok(uri) = uri.parse() {
            self.uri = Some(uri);
        }
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header.
    ///
    /// Names are accepted in any case. Invalid names or values are skipped.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the path parameters.
    #[must_use]
    pub fn path_params(mut self, params: PathParams) -> Self {
        self.path_params = params;
        self
    }

    /// Adds a single path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
            path_params: self.path_params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_context_creation() {
        let mut params = PathParams::new();
        params.push("userId", "42");

        let ctx = ExtractionContext::new(
            Method::GET,
            Uri::from_static("/users/42?active=true"),
            HeaderMap::new(),
            Bytes::from_static(b""),
            params,
        );

        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/users/42");
        assert_eq!(ctx.query_string(), Some("active=true"));
        assert_eq!(ctx.path_params().get("userId"), Some("42"));
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = ExtractionContextBuilder::new().build();
        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/");
        assert!(ctx.path_params().is_empty());
    }

    #[test]
    fn test_builder_accepts_mixed_case_header_names() {
        let ctx = ExtractionContextBuilder::new()
            .header("X-Rewards-Authenticated-User-Id", "abc")
            .header("Content-Type", "application/json")
            .build();

        assert_eq!(ctx.header("x-rewards-authenticated-user-id"), Some("abc"));
        assert_eq!(ctx.header("X-REWARDS-AUTHENTICATED-USER-ID"), Some("abc"));
        assert_eq!(ctx.content_type(), Some("application/json"));
    }

    #[test]
    fn test_builder_skips_invalid_header() {
        let ctx = ExtractionContextBuilder::new()
            .header("bad header", "x")
            .header("x-ok", "bad\nvalue")
            .build();
        assert!(ctx.headers().is_empty());
    }

    #[test]
    fn test_from_http_request() {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/rewards?pos=3")
            .header("x-test", "1")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let ctx = ExtractionContext::from_request(request, PathParams::new());
        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.query_string(), Some("pos=3"));
        assert_eq!(ctx.header("x-test"), Some("1"));
        assert_eq!(ctx.body().as_ref(), b"{}");
    }
}

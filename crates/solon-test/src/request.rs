//! Test request building.

use bytes::Bytes;
use http::{header, Method};
use serde::Serialize;
use solon_core::IdentityConfig;
use solon_extract::{ExtractionContext, ExtractionContextBuilder};

/// Entry points for building test requests.
///
/// Requests are built straight into an [`ExtractionContext`], as if a router
/// had already matched them.
pub struct TestRequest;

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }
}

/// Builder for constructing test requests.
#[must_use]
pub struct TestRequestBuilder {
    inner: ExtractionContextBuilder,
    identity: IdentityConfig,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            inner: ExtractionContextBuilder::new()
                .method(method)
                .uri_str(uri.as_ref()),
            identity: IdentityConfig::default(),
        }
    }

    /// Uses `identity` to name the identity headers set by `as_*`.
    ///
    /// Call before `as_user` or `as_service` when the deployment changes the
    /// header affix or the service header.
    pub fn identity_config(mut self, identity: IdentityConfig) -> Self {
        self.identity = identity;
        self
    }

    /// Sets a header on the request. Invalid names or values are skipped.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.inner = self.inner.header(name.as_ref(), value.as_ref());
        self
    }

    /// Sets the user identity headers.
    pub fn as_user(self, id: impl AsRef<str>, email: impl AsRef<str>) -> Self {
        let id_header = self.identity.user_id_header();
        let email_header = self.identity.user_email_header();
        self.header(id_header, id).header(email_header, email)
    }

    /// Sets the service identity header.
    pub fn as_service(self, id: impl AsRef<str>) -> Self {
        let service_header = self.identity.service_header.clone();
        self.header(service_header, id)
    }

    /// Sets the admin identity header as `<authenticator>:<email>`.
    pub fn as_admin(self, authenticator: impl AsRef<str>, email: impl AsRef<str>) -> Self {
        let admin_header = self.identity.admin_header.clone();
        let value = format!("{}:{}", authenticator.as_ref(), email.as_ref());
        self.header(admin_header, value)
    }

    /// Adds a path capture, as a router would after matching.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.path_param(name, value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.inner = self.inner.body(body);
        self
    }

    /// Sets the request body as JSON.
    ///
    /// This also sets the `Content-Type` header to `application/json`.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not serialize to JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        let bytes = serde_json::to_vec(value).expect("test body should serialize to JSON");
        self.inner = self.inner.body(bytes);
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        self.inner.build()
    }
}

//! Successful CRUD outcomes.

use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use solon_core::{canonical_reason, CrudError, CrudResult};

/// A successful outcome of an execute call.
///
/// Bodies follow the `{"message": <status text>, "results": ...}` envelope;
/// 204 outcomes carry no body.
#[derive(Debug, Clone, PartialEq)]
pub struct CrudResponse {
    status: StatusCode,
    results: Option<Value>,
}

impl CrudResponse {
    /// 201 echoing the inserted payload.
    ///
    /// # Errors
    ///
    /// Returns an internal error if `payload` does not serialize.
    pub fn created<T: Serialize>(payload: &T) -> CrudResult<Self> {
        Self::with_results(StatusCode::CREATED, payload)
    }

    /// 200 carrying a row or a list of rows.
    ///
    /// # Errors
    ///
    /// Returns an internal error if `results` does not serialize.
    pub fn ok<T: Serialize>(results: &T) -> CrudResult<Self> {
        Self::with_results(StatusCode::OK, results)
    }

    /// 204 without a body.
    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            results: None,
        }
    }

    fn with_results<T: Serialize>(status: StatusCode, results: &T) -> CrudResult<Self> {
        let results = serde_json::to_value(results)
            .map_err(|e| CrudError::internal_with_source("failed to serialize results", e))?;
        Ok(Self {
            status,
            results: Some(results),
        })
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the `results` value, if the outcome has a body.
    #[must_use]
    pub const fn results(&self) -> Option<&Value> {
        self.results.as_ref()
    }

    /// Returns the full JSON body, if the outcome has one.
    #[must_use]
    pub fn body(&self) -> Option<Value> {
        self.results.as_ref().map(|results| {
            json!({
                "message": canonical_reason(self.status),
                "results": results,
            })
        })
    }

    /// Renders the outcome as an HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let body = self
            .body()
            .and_then(|body| serde_json::to_vec(&body).ok())
            .map(Bytes::from)
            .unwrap_or_default();
        let has_body = !body.is_empty();

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        if has_body {
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        response
    }
}

//! JSON body extractor.

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Default maximum body size for JSON extraction (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Extractor for JSON request bodies.
///
/// Content-Type is not checked; any body that parses as `T` is accepted.
///
/// # Example
///
/// ```rust
/// use solon_extract::{ExtractionContextBuilder, FromRequest, Json};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct NewReward {
///     name: String,
/// }
///
/// let ctx = ExtractionContextBuilder::new()
///     .body(r#"{"name": "coffee"}"#)
///     .build();
///
/// let Json(reward) = Json::<NewReward>::from_request(&ctx).unwrap();
/// assert_eq!(reward.name, "coffee");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Json<T> {
    /// Extracts the body, rejecting bodies larger than `limit` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error for oversized, empty, or malformed bodies.
    pub fn from_request_limited(
        ctx: &ExtractionContext,
        limit: usize,
    ) -> Result<Self, ExtractionError> {
        let body = ctx.body();

        if body.len() > limit {
            return Err(ExtractionError::too_large(limit, body.len()));
        }

        if body.is_empty() {
            return Err(ExtractionError::malformed(
                ExtractionSource::Body,
                "empty request body",
            ));
        }

        let value: T = serde_json::from_slice(body).map_err(|e| {
            ExtractionError::malformed(ExtractionSource::Body, e)
        })?;

        Ok(Json(value))
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Json<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Self::from_request_limited(ctx, DEFAULT_MAX_BODY_SIZE)
    }
}

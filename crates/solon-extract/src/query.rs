//! Query string extractor.

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Extractor for URL query string parameters.
///
/// A request without a query string deserializes from the empty string, so
/// structs whose fields all have defaults always extract.
///
/// # Example
///
/// ```rust
/// use solon_extract::{ExtractionContextBuilder, FromRequest, Query};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Page {
///     #[serde(default)]
///     pos: u64,
///     len: Option<u32>,
/// }
///
/// let ctx = ExtractionContextBuilder::new().uri_str("/rewards?pos=20&len=10").build();
/// let Query(page) = Query::<Page>::from_request(&ctx).unwrap();
/// assert_eq!(page.pos, 20);
/// assert_eq!(page.len, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Consumes the Query and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Query<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let query_string = ctx.query_string().unwrap_or("");

        let value: T = serde_urlencoded::from_str(query_string).map_err(|e| {
            ExtractionError::malformed(ExtractionSource::Query, e)
        })?;

        Ok(Query(value))
    }
}

//! Path parameter extractor.

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Extractor for URL path parameters.
///
/// `Path<T>` deserializes the router's captures into `T`. Captures are
/// re-encoded as a form string first so `serde_urlencoded` can coerce
/// strings into numbers, UUIDs, and other typed keys.
///
/// # Example
///
/// ```rust
/// use solon_extract::{ExtractionContextBuilder, FromRequest, Path};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct PostPath {
///     user_id: u64,
///     post_id: u64,
/// }
///
/// let ctx = ExtractionContextBuilder::new()
///     .path_param("user_id", "42")
///     .path_param("post_id", "123")
///     .build();
///
/// let Path(path) = Path::<PostPath>::from_request(&ctx).unwrap();
/// assert_eq!(path.user_id, 42);
/// assert_eq!(path.post_id, 123);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    /// Consumes the Path and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Path<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Path<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        if ctx.path_params().is_empty() {
            return Err(ExtractionError::missing(
                ExtractionSource::Path,
                "<path parameters>",
            ));
        }

        let pairs: Vec<(&str, &str)> = ctx.path_params().iter().collect();
        let encoded = serde_urlencoded::to_string(&pairs).map_err(|e| {
            ExtractionError::malformed(ExtractionSource::Path, e)
        })?;

        let value: T = serde_urlencoded::from_str(&encoded).map_err(|e| {
            ExtractionError::malformed(ExtractionSource::Path, e)
        })?;

        Ok(Path(value))
    }
}

/// Extracts a single path parameter by name.
///
/// # Errors
///
/// Returns an error if the parameter is missing or cannot be parsed.
pub fn path_param<T: std::str::FromStr>(
    ctx: &ExtractionContext,
    name: &str,
) -> Result<T, ExtractionError> {
    let value = ctx
        .path_params()
        .get(name)
        .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, name))?;

    value.parse().map_err(|_| {
        ExtractionError::invalid_value(
            ExtractionSource::Path,
            name,
            format!("failed to parse as {}", std::any::type_name::<T>()),
        )
    })
}

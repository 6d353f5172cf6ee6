//! Core extractor trait.

use crate::{ExtractionContext, ExtractionError};

/// Trait for types that can be extracted from an HTTP request.
///
/// # Implementing `FromRequest`
///
/// ```rust
/// use solon_extract::{FromRequest, ExtractionContext, ExtractionError, ExtractionSource};
///
/// struct ApiVersion(u32);
///
/// impl FromRequest for ApiVersion {
///     fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
///         let version = ctx.header("x-api-version")
///             .ok_or_else(|| ExtractionError::missing(ExtractionSource::Header, "x-api-version"))?;
///
///         let version: u32 = version.parse()
///             .map_err(|_| ExtractionError::invalid_value(
///                 ExtractionSource::Header,
///                 "x-api-version",
///                 "expected integer version",
///             ))?;
///
///         Ok(ApiVersion(version))
///     }
/// }
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if extraction fails.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}

// Optional extraction: None when the inner extractor fails
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx).ok())
    }
}

macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1);
impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);

//! Request extractors that reject with a JSON `{error}` body.

use axum::{
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
};

use storekeep_core::parse_id;

use crate::db::RepositoryError;
use crate::error::ApiError;

/// JSON request body. Malformed or mistyped bodies become a 400 `ApiError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Numeric `{id}` path segment, coerced into a typed id.
///
/// A segment that is not a decimal integer in `i32` range is a 400.
#[derive(Debug, Clone, Copy)]
pub struct Id<T>(pub T);

impl<S, T> FromRequestParts<S> for Id<T>
where
    S: Send + Sync,
    T: From<i32> + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        parse_id(&raw).map(Self).map_err(ApiError::bad_request)
    }
}

/// Require a field that the client may have omitted.
///
/// # Errors
///
/// Returns `RepositoryError::Invalid` naming the missing field.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, RepositoryError> {
    value.ok_or_else(|| RepositoryError::Invalid(format!("missing field `{field}`")))
}

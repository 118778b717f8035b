/// Request extractors
///
/// [`ValidatedJson`] deserializes a JSON body and runs its `validator` rules
/// before the handler sees it. Malformed JSON becomes a 400 `bad_request`,
/// failed rules a 400 `validation_error` with per-field details.
///
/// [`ResourcePath`] parses resource ids from the path. An id that is not a
/// UUID cannot name an existing resource, so it is reported as 404.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::error::ApiError;

/// Path parameters identifying a resource
#[derive(Debug, Clone, Copy)]
pub struct ResourcePath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ResourcePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ResourcePath(value)),
            Err(rejection) => {
                debug!(error = %rejection, "Unparseable resource id");
                Err(ApiError::NotFound("Resource not found".to_string()))
            }
        }
    }
}

/// JSON body that has passed validation
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

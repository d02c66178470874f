//! JSON body extractor answering malformed bodies with the error envelope.

use super::error::ApiError;
use axum::{
    Json, async_trait,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

/// Drop-in replacement for [`axum::Json`] on request bodies.
///
/// Axum's own rejection is a plain-text response; this one surfaces as
/// [`ApiError::InvalidBody`] so clients always receive `{"error": {...}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::InvalidBody(rejection.body_text()))?;
        Ok(Self(value))
    }
}

//! JSON body extractors whose rejections use the service's error shapes
//! instead of axum's plain-text 415/422 responses.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{CallableError, HttpError, PipelineError};

fn invalid_body(rejection: JsonRejection) -> PipelineError {
    warn!(status = %rejection.status(), reason = %rejection.body_text(), "rejected request body");
    PipelineError::Validation(format!("corpo da requisição inválido: {}", rejection.body_text()))
}

/// `Json<T>` for the plain HTTP routes; failures answer `{"error": "..."}` with 400.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(invalid_body(rejection).into()),
        }
    }
}

/// `Json<T>` for the callable endpoint; failures answer `INVALID_ARGUMENT`.
pub struct CallableJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for CallableJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CallableError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(CallableJson(value)),
            Err(rejection) => Err(invalid_body(rejection).into()),
        }
    }
}

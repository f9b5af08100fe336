use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure the render pipeline and its collaborators can produce.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unauthenticated: {0}")] Auth(String),
    #[error("invalid argument: {0}")] Validation(String),
    #[error("not found: {0}")] NotFound(String),
    #[error("render failed: {0}")] Render(String),
    #[error("render timed out after {0:?}")] RenderTimeout(Duration),
    #[error("PDF encoding failed: {0}")] Encoding(String),
    #[error("internal: {0}")] Internal(String),
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Auth(_) => StatusCode::UNAUTHORIZED,
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::Render(_)
            | PipelineError::RenderTimeout(_)
            | PipelineError::Encoding(_)
            | PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a caller. Server-side failures collapse
    /// into one generic sentence.
    pub fn public_message(&self) -> String {
        match self {
            PipelineError::Auth(m) | PipelineError::Validation(m) | PipelineError::NotFound(m) => m.clone(),
            _ => "Não foi possível gerar o PDF.".to_string(),
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            error!(error = %self, "❌ request failed");
        } else {
            warn!(error = %self, "⚠️ request rejected");
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Internal(format!("HTTP error: {err}"))
    }
}

/// Boundary error for plain HTTP routes: `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct HttpError(pub PipelineError);

impl From<PipelineError> for HttpError {
    fn from(err: PipelineError) -> Self { HttpError(err) }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = Json(json!({ "error": self.0.public_message() }));
        (self.0.status(), body).into_response()
    }
}

/// Boundary error for the callable endpoint, shaped like a Firebase
/// `HttpsError`: `{"error": {"status": "NOT_FOUND", "message": "..."}}`.
#[derive(Debug)]
pub struct CallableError(pub PipelineError);

impl From<PipelineError> for CallableError {
    fn from(err: PipelineError) -> Self { CallableError(err) }
}

impl CallableError {
    pub fn code(&self) -> &'static str {
        match self.0 {
            PipelineError::Auth(_) => "UNAUTHENTICATED",
            PipelineError::Validation(_) => "INVALID_ARGUMENT",
            PipelineError::NotFound(_) => "NOT_FOUND",
            _ => "INTERNAL",
        }
    }
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = Json(json!({
            "error": { "status": self.code(), "message": self.0.public_message() }
        }));
        (self.0.status(), body).into_response()
    }
}

use crate::{LensError, UrlError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("could not find data by id {0}")]
    NotFound(String),

    #[error("missing id parameter")]
    MissingId,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::MissingId => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LensError> for ApiError {
    fn from(err: LensError) -> Self {
        match err {
            LensError::InvalidInput(message) => Self::InvalidInput(message),
            LensError::Url(source @ UrlError::InvalidSource { .. }) => {
                Self::InvalidInput(source.to_string())
            }
            LensError::Fetch { .. } => Self::Upstream(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::NotFound(id) => json!({
                "message": "could not find data by id",
                "id": id,
            }),
            Self::MissingId => json!({ "message": "missing id parameter" }),
            other => json!({ "error": other.to_string() }),
        };

        if status.is_server_error() {
            tracing::warn!("Request failed ({}): {}", status, self);
        }

        (status, Json(body)).into_response()
    }
}

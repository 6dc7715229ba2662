//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prospect_core::ProspectError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code, repeated in the body
    #[serde(rename = "statusCode")]
    #[schema(example = 400)]
    pub status_code: u16,
    /// Human-readable message
    #[schema(example = "Company name is required")]
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Caller sent an unusable request
    BadRequest(String),
    /// Upstream answered with an error status, propagated as-is
    Upstream { status: StatusCode, message: String },
    /// Upstream unreachable or its answer unusable
    BadGateway(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => *status,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Upstream { message: msg, .. }
            | AppError::BadGateway(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = self.message(), "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = self.message(), "Request rejected");
        }

        let body = ApiError::new(status, self.message());
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<ProspectError> for AppError {
    fn from(err: ProspectError) -> Self {
        match err {
            ProspectError::Validation(msg) => AppError::BadRequest(msg),
            ProspectError::Upstream { status, message } => match StatusCode::from_u16(status) {
                Ok(status) if status.is_client_error() || status.is_server_error() => {
                    AppError::Upstream { status, message }
                }
                _ => AppError::BadGateway(message),
            },
            ProspectError::Transport(_) | ProspectError::InvalidResponse(_) => {
                AppError::BadGateway(err.to_string())
            }
            ProspectError::ConfigError(_) | ProspectError::Other(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

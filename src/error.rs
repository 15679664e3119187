use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Insufficient credits")]
    InsufficientCredits,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<Value>,
    },

    #[error("persistence failure: {0}")]
    Persistence(#[from] crate::store::StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        use AppError::*;
        match self {
            Validation(_) | MissingParameter(_) => StatusCode::BAD_REQUEST,
            Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Forbidden(_) => StatusCode::FORBIDDEN,
            InsufficientCredits => StatusCode::PAYMENT_REQUIRED,
            NotFound(_) => StatusCode::NOT_FOUND,
            Upstream { .. } | Persistence(_) | Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Upstream { message, details } => {
                error!(%message, ?details, "upstream provider failed");
                json!({ "error": message, "details": details })
            }
            AppError::Persistence(err) => {
                error!(error = %err, "data store failure");
                json!({ "error": "Internal server error" })
            }
            AppError::Internal(err) => {
                error!(error = %err, backtrace = %err.backtrace(), "unhandled error");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

macro_rules! apperr_internal {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_internal!(serde_json::Error);
apperr_internal!(tower_sessions::session::Error);
apperr_internal!(crate::auth::password::PasswordError);

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::Validation(format!("malformed multipart body: {}", err.body_text()))
    }
}

use crate::auth::AuthError;
use crate::model::ErrorBody;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};
use twinlink_coordinator::CoordinatorError;
use twinlink_core::{CoreError, ErrorKind};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("wrong nickname or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Service(#[from] CoordinatorError),
    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Issue(_) | AuthError::Hashing(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Auth(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Service(err) if err.is_diverged() => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Service(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AlreadyExists => StatusCode::CONFLICT,
                ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
                ErrorKind::Operational => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Server-side failures stay in the logs.
    fn public_message(&self, status: StatusCode) -> String {
        if status.is_server_error() {
            return "internal error".to_string();
        }

        match self {
            AppError::Service(err) => match err.kind() {
                ErrorKind::NotFound => "not found".to_string(),
                ErrorKind::AlreadyExists => "already exists".to_string(),
                ErrorKind::Unauthorized => "access denied".to_string(),
                ErrorKind::Operational => "internal error".to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = ErrorBody::new(self.public_message(status));
        (status, Json(body)).into_response()
    }
}

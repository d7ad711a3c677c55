use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::services::password_service::PasswordHashError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("CSRF verification failed. Request aborted.")]
    CsrfRejected,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordHashError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::CsrfRejected => StatusCode::FORBIDDEN,
            AppError::Database(_)
            | AppError::Template(_)
            | AppError::PasswordHash(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{}", self);
            return (status, "Internal Server Error").into_response();
        }
        (status, self.to_string()).into_response()
    }
}

// src/error.rs
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorResponse;
use crate::services::completion::ProviderError;
use crate::services::uploads::UploadError;

pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing your request.";

/// Errors surfaced by HTTP handlers. Every variant renders as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("expected a multipart body: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { limit } => AppError::PayloadTooLarge { limit },
            UploadError::Multipart(e) => AppError::Multipart(e),
            UploadError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotMultipart(e) => (e.status(), e.body_text()),
            AppError::Multipart(e) => (e.status(), e.body_text()),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Uploaded file exceeds the {} byte limit.", limit),
            ),
            AppError::Provider(ProviderError::Api { status, message, .. }) => (
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message.clone(),
            ),
            AppError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }
            AppError::Provider(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR_MESSAGE.to_string(),
            ),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

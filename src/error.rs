use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::{
    ERR_ACCOUNT_EXISTS, ERR_ADMIN_EMAIL_MISSING, ERR_EMAIL_NOT_SENT, ERR_INVALID_CREDENTIALS,
    ERR_INVALID_ID, ERR_METHOD_NOT_ALLOWED,
};

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bincode::error::DecodeError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Missing or malformed input field
    #[error("{0}")]
    Validation(String),

    /// Body the extractor refused, with the status it chose
    #[error("Request rejected ({0}): {1}")]
    Rejected(StatusCode, String),

    /// Unique key already taken by another registration
    #[error("Duplicate field: {0} entered")]
    DuplicateField(&'static str),

    #[error("User already exists")]
    AccountExists,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Invalid id format")]
    InvalidId,

    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin email is not configured")]
    MailNotConfigured,

    #[error("Mail delivery failed: {0}")]
    MailDelivery(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// Attached to every error response so outer middleware can enrich the body
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub detail: String,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(e) => internal("Database error", e),
            AppError::Transaction(e) => internal("Transaction error", e),
            AppError::Table(e) => internal("Table error", e),
            AppError::Storage(e) => internal("Storage error", e),
            AppError::Commit(e) => internal("Commit error", e),
            AppError::Serialization(e) => internal("Serialization error", e),
            AppError::Deserialization(e) => internal("Deserialization error", e),
            AppError::TaskJoin(e) => internal("Task join error", e),
            AppError::Io(e) => internal("IO error", e),
            AppError::PasswordHash(e) => internal("Password hashing error", e),
            AppError::Multipart(e) => {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    (
                        StatusCode::PAYLOAD_TOO_LARGE,
                        "File exceeds the upload size limit".to_string(),
                    )
                } else {
                    (e.status(), format!("Upload error: {}", e.body_text()))
                }
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Rejected(status, msg) => (*status, msg.clone()),
            AppError::DuplicateField(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::AccountExists => (StatusCode::CONFLICT, ERR_ACCOUNT_EXISTS.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            AppError::InvalidId => (StatusCode::BAD_REQUEST, ERR_INVALID_ID.to_string()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, ERR_INVALID_CREDENTIALS.to_string())
            }
            AppError::MailNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ERR_ADMIN_EMAIL_MISSING.to_string(),
            ),
            AppError::MailDelivery(cause) => {
                tracing::error!("Error sending email: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ERR_EMAIL_NOT_SENT.to_string(),
                )
            }
            AppError::Encoding(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error during video processing: {}", cause),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File exceeds the upload size limit".to_string(),
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ERR_METHOD_NOT_ALLOWED.to_string(),
            ),
        }
    }
}

fn internal(kind: &str, err: &dyn std::fmt::Debug) -> (StatusCode, String) {
    tracing::error!("{}: {:?}", kind, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_string(),
    )
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let report = ErrorReport {
            message: message.clone(),
            detail: format!("{:?}", self),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Unwrap a JSON body, turning extractor rejections into the uniform error shape
///
/// An oversized body stays 413 and a missing content type stays 415; any
/// other rejection is a 400 like the rest of input validation.
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(rejection_error(rejection.status(), rejection.body_text()))
        }
    }
}

/// Same as [`json_body`] for multipart uploads
pub fn multipart_body(payload: std::result::Result<Multipart, MultipartRejection>) -> Result<Multipart> {
    payload.map_err(|rejection| rejection_error(rejection.status(), rejection.body_text()))
}

fn rejection_error(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            AppError::Rejected(status, message)
        }
        _ => AppError::Validation(message),
    }
}

/// Check a path id is a well-formed record id
pub fn parse_id(raw: &str) -> Result<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| AppError::InvalidId)
}

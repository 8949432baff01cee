use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::constants::{ERR_ROUTE_NOT_FOUND, HLS_MANIFEST_CONTENT_TYPE, HLS_SEGMENT_CONTENT_TYPE};
use crate::error::{AppError, ErrorReport};
use crate::AppState;

/// Fallback for paths no route matches
pub async fn route_not_found() -> AppError {
    AppError::NotFound(ERR_ROUTE_NOT_FOUND)
}

/// Give the router's bare 405 responses the JSON error body
pub async fn method_not_allowed_body(req: Request<Body>, next: Next) -> Response {
    let resp = next.run(req).await;

    if resp.status() != StatusCode::METHOD_NOT_ALLOWED
        || resp.extensions().get::<ErrorReport>().is_some()
    {
        return resp;
    }

    let allow = resp.headers().get(ALLOW).cloned();
    let mut replaced = AppError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(ALLOW, allow);
    }
    replaced
}

/// Media type for streaming files that extension guessing gets wrong
pub fn streaming_type_for(path: &str) -> Option<&'static str> {
    let (_, ext) = path.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "m3u8" => Some(HLS_MANIFEST_CONTENT_TYPE),
        "ts" => Some(HLS_SEGMENT_CONTENT_TYPE),
        _ => None,
    }
}

/// Override the content type of HLS manifests and segments served from disk
pub async fn streaming_content_type(req: Request<Body>, next: Next) -> Response {
    let content_type = streaming_type_for(req.uri().path());
    let mut resp = next.run(req).await;

    if let Some(content_type) = content_type {
        if resp.status().is_success() {
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
    }

    resp
}

/// Add a `stack` field to error bodies outside production
pub async fn attach_error_detail(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let resp = next.run(req).await;

    if state.config.is_production() {
        return resp;
    }
    let Some(report) = resp.extensions().get::<ErrorReport>().cloned() else {
        return resp;
    };

    let (mut parts, _) = resp.into_parts();
    parts.headers.remove(CONTENT_LENGTH);

    let body = Json(json!({
        "success": false,
        "message": report.message,
        "stack": report.detail,
    }));

    (parts, body).into_response()
}

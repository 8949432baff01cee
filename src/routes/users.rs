use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::{LoginRequest, RegisterAccountRequest};
use crate::routes::validation::json_body;
use crate::AppState;

/// Create an account
///
/// Returns 409 when the email is already registered.
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let account = json_body(payload)?.validate()?;
    let user = state.accounts.register(account).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registered successfully!",
            "user": user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let (email, password) = json_body(payload)?.credentials()?;
    let user = state.accounts.login(&email, &password).await?;

    tracing::info!("Login succeeded for account {}", user.id);

    Ok(Json(json!({
        "success": true,
        "message": "Login successful!",
        "user": user,
    })))
}

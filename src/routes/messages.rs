use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::RegistrationForm;
use crate::notify::notify;
use crate::routes::validation::{json_body, parse_id};
use crate::AppState;

/// Submit a player registration and notify the admin
///
/// The record stays stored when the notification fails; the caller then
/// sees a 500 for the mail step only.
pub async fn send_message(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let registration = json_body(payload)?.validate()?;
    let data = state.registrations.submit(registration).await?;

    notify(
        state.mailer.as_ref(),
        state.config.admin_email.as_deref(),
        &data,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful! An email notification has been sent to the admin.",
            "data": data,
        })),
    ))
}

pub async fn get_all_messages(State(state): State<AppState>) -> Result<Json<Value>> {
    let messages = state.registrations.list().await?;

    Ok(Json(json!({
        "success": true,
        "count": messages.len(),
        "messages": messages,
    })))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_id(&id)?;
    let data = state.registrations.get_by_id(&id).await?;

    Ok(Json(json!({
        "success": true,
        "data": data,
    })))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_id(&id)?;
    state.registrations.delete_by_id(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration Deleted Successfully!.",
    })))
}

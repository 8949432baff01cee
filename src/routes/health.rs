use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Reports database reachability and whether the upload tree is writable.
/// Used by load balancers and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    // Check database connectivity by attempting a read transaction
    let db = state.db.clone();
    let db_status = tokio::task::spawn_blocking(move || match db.begin_read() {
        Ok(_) => "connected",
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            "disconnected"
        }
    })
    .await
    .unwrap_or("error");

    let uploads_status = match tokio::fs::metadata(state.layout.root()).await {
        Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => "ok",
        Ok(_) => "readonly",
        Err(e) => {
            tracing::error!("Upload directory health check failed: {}", e);
            "missing"
        }
    };

    let healthy = db_status == "connected" && uploads_status == "ok";

    Json(json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "database": db_status,
        "uploads": uploads_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

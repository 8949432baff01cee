use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::Video;
use crate::routes::validation::{multipart_body, parse_id};
use crate::transcode::{stage_upload, TranscodeMode};
use crate::AppState;

/// Upload a video and re-encode it to H.264/AAC
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let mut multipart = multipart_body(multipart)?;
    let upload = stage_upload(&mut multipart, &state.layout).await?;
    let outcome = state.worker.ingest(upload, TranscodeMode::Reencode).await?;

    tracing::info!("Video saved: {}", outcome.video.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Upload & transcoding successful",
            "video": outcome.video,
        })),
    ))
}

/// Upload a video and segment it for HLS playback
pub async fn upload_hls(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let mut multipart = multipart_body(multipart)?;
    let upload = stage_upload(&mut multipart, &state.layout).await?;
    let outcome = state.worker.ingest(upload, TranscodeMode::Hls).await?;

    tracing::info!("HLS video saved: {}", outcome.video.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Converted to HLS",
            "url": outcome.url,
        })),
    ))
}

/// All videos, newest upload first
pub async fn list_videos(State(state): State<AppState>) -> Result<Json<Vec<Video>>> {
    Ok(Json(state.videos.list().await?))
}

pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Video>> {
    let id = parse_id(&id)?;
    Ok(Json(state.videos.get_by_id(&id).await?))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_id(&id)?;
    state.videos.delete_by_id(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Video deleted successfully",
    })))
}

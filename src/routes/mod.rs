pub mod health;
pub mod messages;
pub mod middleware;
pub mod users;
pub mod validation;
pub mod videos;

pub use health::health_check;
pub use messages::{delete_message, get_all_messages, get_message, send_message};
pub use users::{login, register};
pub use videos::{delete_video, get_video, list_videos, upload_hls, upload_video};

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::constants::UPLOADS_URL_PREFIX;
use crate::AppState;
use self::middleware::{
    attach_error_detail, method_not_allowed_body, route_not_found, streaming_content_type,
};

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.upload_size_limit);

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/message/send", post(send_message))
        .route("/api/v1/message/getAllMessage", get(get_all_messages))
        .route("/api/v1/message/deleteMessage/:id", delete(delete_message))
        .route("/api/v1/message/:id", get(get_message))
        .route("/api/v1/user/register", post(register))
        .route("/api/v1/user/login", post(login))
        .route("/api/v1/video/upload", post(upload_video).layer(upload_limit))
        .route("/api/v1/video/upload/hls", post(upload_hls).layer(upload_limit))
        .route("/api/v1/video", get(list_videos))
        .route("/api/v1/video/", get(list_videos))
        .route("/api/v1/video/:id", get(get_video).delete(delete_video));

    // Only finished outputs are public; the staging directory is not served
    let uploads = Router::new()
        .nest_service(
            &format!("{}/videos", UPLOADS_URL_PREFIX),
            ServeDir::new(state.layout.videos_dir()),
        )
        .nest_service(
            &format!("{}/hls", UPLOADS_URL_PREFIX),
            ServeDir::new(state.layout.hls_root()),
        )
        .layer(from_fn(streaming_content_type));

    api.merge(uploads)
        .fallback(route_not_found)
        .layer(from_fn(method_not_allowed_body))
        .layer(from_fn_with_state(state.clone(), attach_error_detail))
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PUT])
        .allow_headers(Any)
}

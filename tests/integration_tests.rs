//! Integration tests for the DPL Registration Server API
//!
//! These tests verify the complete request/response cycle for all endpoints.
//! Mail delivery and the external encoder are replaced by in-process fakes.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use dpl_registration_server::{
    notify::{Mailer, OutgoingMail},
    open_database, routes,
    transcode::{EncodeError, EncodeJob, EncodeTarget, Encoder},
    AppError, AppState, Config,
};

const ADMIN_EMAIL: &str = "admin@example.com";
const UPLOAD_LIMIT: usize = 1024 * 1024;
const BOUNDARY: &str = "dpl-test-boundary";

// =============================================================================
// Test Doubles
// =============================================================================

/// Records every message instead of delivering it
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> dpl_registration_server::Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Transport that always refuses the message
struct RefusingMailer;

#[async_trait::async_trait]
impl Mailer for RefusingMailer {
    async fn send(&self, _mail: &OutgoingMail) -> dpl_registration_server::Result<()> {
        Err(AppError::MailDelivery("550 relay denied".to_string()))
    }
}

/// Writes the files a real encoder would produce
struct FakeEncoder;

#[async_trait::async_trait]
impl Encoder for FakeEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError> {
        match &job.target {
            EncodeTarget::File { output } => {
                let input = tokio::fs::read(&job.input).await?;
                tokio::fs::write(output, input).await?;
            }
            EncodeTarget::Hls { dir, segment_secs } => {
                tokio::fs::write(dir.join("segment000.ts"), b"ts-0").await?;
                tokio::fs::write(dir.join("segment001.ts"), b"ts-1").await?;
                let playlist = format!(
                    "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:{secs}\n#EXT-X-MEDIA-SEQUENCE:0\n\
                     #EXTINF:{secs}.0,\nsegment000.ts\n#EXTINF:{secs}.0,\nsegment001.ts\n#EXT-X-ENDLIST\n",
                    secs = segment_secs
                );
                tokio::fs::write(dir.join("index.m3u8"), playlist).await?;
            }
        }
        Ok(())
    }
}

/// Fails after writing part of its output
struct CrashingEncoder;

#[async_trait::async_trait]
impl Encoder for CrashingEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError> {
        match &job.target {
            EncodeTarget::File { output } => tokio::fs::write(output, b"partial").await?,
            EncodeTarget::Hls { dir, .. } => {
                tokio::fs::write(dir.join("segment000.ts"), b"ts-0").await?
            }
        }
        Err(EncodeError::Spawn(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Invalid data found when processing input",
        )))
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Create a test configuration rooted in a temporary directory
fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_path: temp_dir.path().join("test.redb").display().to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        environment: "test".to_string(),
        upload_dir: temp_dir.path().join("uploads"),
        upload_size_limit: UPLOAD_LIMIT,
        hls_segment_duration: 10,
        ffmpeg_path: PathBuf::from("ffmpeg"),
        smtp: None,
        admin_email: Some(ADMIN_EMAIL.to_string()),
    }
}

struct TestApp {
    app: Router,
    state: AppState,
    _temp_dir: TempDir,
}

impl TestApp {
    async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    fn staging_is_empty(&self) -> bool {
        dir_is_empty(self.state.layout.staging_dir())
    }
}

async fn build_app(config: Config, mailer: Arc<dyn Mailer>, encoder: Arc<dyn Encoder>, temp_dir: TempDir) -> TestApp {
    let db = open_database(&config.database_path).expect("Failed to create test database");
    let state = AppState::new(config, db, mailer, encoder);
    state.layout.ensure_dirs().await.unwrap();

    TestApp {
        app: routes::router(state.clone()),
        state,
        _temp_dir: temp_dir,
    }
}

/// Create a test app with a recording mailer and a fake encoder
async fn create_test_app() -> (TestApp, Arc<RecordingMailer>) {
    let temp_dir = TempDir::new().unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let app = build_app(test_config(&temp_dir), mailer.clone(), Arc::new(FakeEncoder), temp_dir).await;
    (app, mailer)
}

fn dir_is_empty(dir: PathBuf) -> bool {
    std::fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(true)
}

/// Parse response body as JSON
async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Create a POST request with JSON body
fn make_post_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Create a GET request
fn make_get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Create a DELETE request
fn make_delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Create a multipart upload with one file part
fn make_upload_request(uri: &str, field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn registration_body(form_no: &str, email: &str) -> Value {
    json!({
        "formNo": form_no,
        "fullName": "  Asha Rao  ",
        "email": email,
        "address": "12 Park Street, Kolkata",
        "mobile": 9876543210u64,
        "dob": "2001-04-09T00:00:00.000Z",
        "height": "168",
        "weight": 61,
        "category": "Batsman",
        "hand": "Right",
        "fieldCategory": "General"
    })
}

async fn submit_registration(app: &TestApp, body: Value) -> (StatusCode, Value) {
    let response = app
        .request(make_post_request("/api/v1/message/send", body.to_string()))
        .await;
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check_returns_healthy() {
    let (app, _) = create_test_app().await;

    let response = app.request(make_get_request("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["uploads"], "ok");
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_submit_registration_success() {
    let (app, mailer) = create_test_app().await;

    let (status, json) =
        submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(
        json["message"],
        "Registration successful! An email notification has been sent to the admin."
    );
    assert_eq!(json["data"]["fullName"], "Asha Rao");
    assert_eq!(json["data"]["dob"], "2001-04-09");
    assert_eq!(json["data"]["mobile"], "9876543210");
    assert_eq!(json["data"]["height"], 168.0);
    assert_eq!(json["data"]["hand"], "Right");
    assert!(json["data"]["bowlerType"].is_null());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ADMIN_EMAIL);
    assert_eq!(sent[0].subject, "New Registration from Asha Rao");
}

#[tokio::test]
async fn test_get_registration_returns_same_fields() {
    let (app, _) = create_test_app().await;
    let (_, created) =
        submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .request(make_get_request(&format!("/api/v1/message/{}", id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"], created["data"]);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let (app, _) = create_test_app().await;
    submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;

    let (status, json) =
        submit_registration(&app, registration_body("DPL-002", "asha@example.com")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Duplicate field: email entered");
}

#[tokio::test]
async fn test_duplicate_form_number_rejected() {
    let (app, _) = create_test_app().await;
    submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;

    let (status, json) =
        submit_registration(&app, registration_body("DPL-001", "other@example.com")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Duplicate field: formNo entered");
}

#[tokio::test]
async fn test_bowler_requires_bowling_fields() {
    let (app, mailer) = create_test_app().await;

    let mut body = registration_body("DPL-001", "asha@example.com");
    body["category"] = json!("Bowler");

    let (status, json) = submit_registration(&app, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Bowler type is required for Bowler!");
    assert!(mailer.sent.lock().unwrap().is_empty());

    let (_, list) = list_registrations(&app).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_batsman_needs_no_bowling_fields() {
    let (app, _) = create_test_app().await;

    let (status, json) =
        submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["data"]["armCategory"].is_null());
}

#[tokio::test]
async fn test_below_minimum_height_rejected() {
    let (app, _) = create_test_app().await;

    let mut body = registration_body("DPL-001", "asha@example.com");
    body["height"] = json!(49.5);

    let (status, json) = submit_registration(&app, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Height must be at least 50 cm!");
}

#[tokio::test]
async fn test_malformed_json_uses_error_shape() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_post_request("/api/v1/message/send", "{not json".to_string()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_oversized_json_keeps_413() {
    let (app, _) = create_test_app().await;
    let mut body = registration_body("DPL-001", "asha@example.com");
    body["address"] = json!("x".repeat(3 * 1024 * 1024));

    let (status, json) = submit_registration(&app, body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_missing_content_type_keeps_415() {
    let (app, _) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/message/send")
        .body(Body::from(
            registration_body("DPL-001", "asha@example.com").to_string(),
        ))
        .unwrap();
    let response = app.request(request).await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_missing_admin_email_keeps_record() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir);
    config.admin_email = None;
    let app = build_app(
        config,
        Arc::new(RecordingMailer::default()),
        Arc::new(FakeEncoder),
        temp_dir,
    )
    .await;

    let (status, json) =
        submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Admin email is not configured.");

    let (_, list) = list_registrations(&app).await;
    assert_eq!(list["count"], 1);
}

#[tokio::test]
async fn test_mail_failure_keeps_record() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_app(
        test_config(&temp_dir),
        Arc::new(RefusingMailer),
        Arc::new(FakeEncoder),
        temp_dir,
    )
    .await;

    let (status, json) =
        submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Email could not be sent.");

    let (_, list) = list_registrations(&app).await;
    assert_eq!(list["count"], 1);
}

async fn list_registrations(app: &TestApp) -> (StatusCode, Value) {
    let response = app
        .request(make_get_request("/api/v1/message/getAllMessage"))
        .await;
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

#[tokio::test]
async fn test_list_registrations_newest_first() {
    let (app, _) = create_test_app().await;
    let (_, first) = submit_registration(&app, registration_body("DPL-001", "one@example.com")).await;
    let (_, second) = submit_registration(&app, registration_body("DPL-002", "two@example.com")).await;

    let (status, json) = list_registrations(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 2);
    assert_eq!(json["messages"][0]["id"], second["data"]["id"]);
    assert_eq!(json["messages"][1]["id"], first["data"]["id"]);
}

#[tokio::test]
async fn test_delete_registration() {
    let (app, _) = create_test_app().await;
    let (_, created) =
        submit_registration(&app, registration_body("DPL-001", "asha@example.com")).await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .request(make_delete_request(&format!("/api/v1/message/deleteMessage/{}", id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Registration Deleted Successfully!.");

    let response = app
        .request(make_delete_request(&format!("/api/v1/message/deleteMessage/{}", id)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Registration Not Found!.");
}

#[tokio::test]
async fn test_invalid_registration_id() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_get_request("/api/v1/message/not-an-id"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Invalid value for id");
}

// =============================================================================
// Error Detail Tests
// =============================================================================

#[tokio::test]
async fn test_error_stack_outside_production() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_get_request(&format!("/api/v1/video/{}", Uuid::new_v4())))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Video not found");
    assert!(json["stack"].as_str().unwrap().contains("NotFound"));
}

#[tokio::test]
async fn test_no_error_stack_in_production() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir);
    config.environment = "production".to_string();
    let app = build_app(
        config,
        Arc::new(RecordingMailer::default()),
        Arc::new(FakeEncoder),
        temp_dir,
    )
    .await;

    let response = app
        .request(make_get_request(&format!("/api/v1/video/{}", Uuid::new_v4())))
        .await;
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["message"], "Video not found");
    assert!(json.get("stack").is_none());
}

#[tokio::test]
async fn test_unknown_route_has_json_body() {
    let (app, _) = create_test_app().await;

    let response = app.request(make_get_request("/api/v1/nope")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Route not found");
}

#[tokio::test]
async fn test_wrong_method_has_json_body() {
    let (app, _) = create_test_app().await;

    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/message/send")
        .body(Body::empty())
        .unwrap();
    let response = app.request(request).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().contains_key(header::ALLOW));
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Method not allowed");
}

// =============================================================================
// Account Tests
// =============================================================================

fn account_body(email: &str, password: &str) -> Value {
    json!({
        "fullName": "Ravi Kumar",
        "email": email,
        "phone": "9000000001",
        "password": password
    })
}

#[tokio::test]
async fn test_register_then_login() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_post_request(
            "/api/v1/user/register",
            account_body("ravi@example.com", "correct horse").to_string(),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered = body_to_json(response.into_body()).await;
    assert_eq!(registered["message"], "Registered successfully!");
    assert!(registered["user"].get("password").is_none());
    assert!(registered["user"].get("passwordHash").is_none());

    let login = json!({ "email": "ravi@example.com", "password": "correct horse" });
    let response = app
        .request(make_post_request("/api/v1/user/login", login.to_string()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Login successful!");
    assert_eq!(json["user"]["id"], registered["user"]["id"]);
    assert!(json["user"].get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_account_conflicts() {
    let (app, _) = create_test_app().await;
    let body = account_body("ravi@example.com", "correct horse").to_string();

    app.request(make_post_request("/api/v1/user/register", body.clone()))
        .await;
    let response = app
        .request(make_post_request("/api/v1/user/register", body))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "User already exists with this email.");
}

#[tokio::test]
async fn test_register_short_password_rejected() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_post_request(
            "/api/v1/user/register",
            account_body("ravi@example.com", "short").to_string(),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_missing_fields_rejected() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_post_request(
            "/api/v1/user/register",
            json!({ "email": "ravi@example.com" }).to_string(),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Please provide all required fields.");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = create_test_app().await;
    app.request(make_post_request(
        "/api/v1/user/register",
        account_body("ravi@example.com", "correct horse").to_string(),
    ))
    .await;

    let wrong_password = app
        .request(make_post_request(
            "/api/v1/user/login",
            json!({ "email": "ravi@example.com", "password": "battery staple" }).to_string(),
        ))
        .await;
    let unknown_email = app
        .request(make_post_request(
            "/api/v1/user/login",
            json!({ "email": "nobody@example.com", "password": "correct horse" }).to_string(),
        ))
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let a = body_to_json(wrong_password.into_body()).await;
    let b = body_to_json(unknown_email.into_body()).await;
    assert_eq!(a["message"], "Invalid Email or Password!");
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_post_request(
            "/api/v1/user/login",
            json!({ "email": "ravi@example.com" }).to_string(),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Please provide Email and Password");
}

// =============================================================================
// Video Tests
// =============================================================================

#[tokio::test]
async fn test_upload_disallowed_type_rejected() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_upload_request(
            "/api/v1/video/upload",
            "video",
            "notes.pdf",
            "application/pdf",
            b"%PDF-1.4",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Only video files are allowed");

    assert!(app.staging_is_empty());
    assert!(dir_is_empty(app.state.layout.videos_dir()));
    assert!(app.state.videos.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_video_field() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_upload_request(
            "/api/v1/video/upload",
            "attachment",
            "clip.mp4",
            "video/mp4",
            b"data",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "No video file uploaded.");
}

#[tokio::test]
async fn test_upload_over_limit_rejected() {
    let (app, _) = create_test_app().await;
    let data = vec![0u8; UPLOAD_LIMIT * 2];

    let response = app
        .request(make_upload_request(
            "/api/v1/video/upload",
            "video",
            "big.mp4",
            "video/mp4",
            &data,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.staging_is_empty());
    assert!(app.state.videos.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_and_reencode() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_upload_request(
            "/api/v1/video/upload",
            "video",
            "final.mp4",
            "video/mp4",
            b"fake-mp4-bytes",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Upload & transcoding successful");
    let video = &json["video"];
    assert_eq!(video["originalName"], "final.mp4");
    assert_eq!(video["mimetype"], "video/mp4");
    assert_eq!(video["size"], 14);
    assert_eq!(video["title"], "Untitled Video");
    assert!(video["storedName"].as_str().unwrap().starts_with("transcoded-"));

    let path = video["path"].as_str().unwrap();
    assert!(app.state.layout.resolve(path).unwrap().exists());
    assert!(app.staging_is_empty());

    let response = app.request(make_get_request(path)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_string(response.into_body()).await, "fake-mp4-bytes");
}

#[tokio::test]
async fn test_hls_upload_produces_playlist() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_upload_request(
            "/api/v1/video/upload/hls",
            "video",
            "final.mov",
            "video/quicktime",
            b"fake-mov-bytes",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Converted to HLS");
    let url = json["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/hls/"));
    assert!(url.ends_with("/index.m3u8"));

    let response = app.request(make_get_request(&url)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-mpegURL"
    );
    let playlist = body_to_string(response.into_body()).await;
    let segments: Vec<&str> = playlist.lines().filter(|l| l.ends_with(".ts")).collect();
    assert_eq!(segments, vec!["segment000.ts", "segment001.ts"]);

    let segment_url = url.replace("index.m3u8", "segment000.ts");
    let response = app.request(make_get_request(&segment_url)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp2t");

    let videos = app.state.videos.list().await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].mimetype, "application/x-mpegURL");
    assert_eq!(videos[0].stored_name, "index.m3u8");
    assert_eq!(videos[0].hls_url.as_deref(), Some(url.as_str()));
    assert!(app.staging_is_empty());
}

#[tokio::test]
async fn test_encoder_failure_cleans_up() {
    let temp_dir = TempDir::new().unwrap();
    let app = build_app(
        test_config(&temp_dir),
        Arc::new(RecordingMailer::default()),
        Arc::new(CrashingEncoder),
        temp_dir,
    )
    .await;

    let response = app
        .request(make_upload_request(
            "/api/v1/video/upload/hls",
            "video",
            "final.mp4",
            "video/mp4",
            b"corrupt",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Error during video processing:"));

    assert!(app.state.videos.list().await.unwrap().is_empty());
    assert!(dir_is_empty(app.state.layout.hls_root()));
    assert!(app.staging_is_empty());
}

#[tokio::test]
async fn test_list_get_and_delete_video() {
    let (app, _) = create_test_app().await;

    let response = app
        .request(make_upload_request(
            "/api/v1/video/upload/hls",
            "video",
            "final.mp4",
            "video/mp4",
            b"fake-mp4-bytes",
        ))
        .await;
    let url = body_to_json(response.into_body()).await["url"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app.request(make_get_request("/api/v1/video/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_to_json(response.into_body()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let id = list[0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(make_get_request(&format!("/api/v1/video/{}", id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["path"], url.as_str());

    let hls_dir = app
        .state
        .layout
        .resolve(&url)
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    assert!(hls_dir.exists());

    let response = app
        .request(make_delete_request(&format!("/api/v1/video/{}", id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await["message"],
        "Video deleted successfully"
    );

    assert!(!hls_dir.exists());
    let response = app
        .request(make_get_request(&format!("/api/v1/video/{}", id)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_staging_directory_not_served() {
    let (app, _) = create_test_app().await;
    std::fs::write(app.state.layout.staging_dir().join("raw.mp4"), b"raw").unwrap();

    let response = app
        .request(make_get_request("/uploads/staging/raw.mp4"))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// CORS Tests
// =============================================================================

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let (app, _) = create_test_app().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/message/send")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.request(request).await;

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}

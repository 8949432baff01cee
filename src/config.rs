use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_HLS_SEGMENT_SECS, DEFAULT_UPLOAD_SIZE_LIMIT};

/// SMTP transport settings; absent when `SMTP_HOST` is not set
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Account used to authenticate and as the sender address
    pub mail: String,
    pub password: String,
}

impl SmtpConfig {
    /// Port 465 speaks TLS from the first byte, every other port upgrades via STARTTLS
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub upload_dir: PathBuf,
    pub upload_size_limit: usize,
    pub hls_segment_duration: u32,
    pub ffmpeg_path: PathBuf,
    pub smtp: Option<SmtpConfig>,
    pub admin_email: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/dpl.redb".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let upload_size_limit = match env::var("FILE_SIZE_LIMIT") {
            Ok(raw) => raw.parse().map_err(|_| "Invalid FILE_SIZE_LIMIT")?,
            Err(_) => DEFAULT_UPLOAD_SIZE_LIMIT,
        };

        let hls_segment_duration: u32 = match env::var("HLS_SEGMENT_DURATION") {
            Ok(raw) => raw.parse().map_err(|_| "Invalid HLS_SEGMENT_DURATION")?,
            Err(_) => DEFAULT_HLS_SEGMENT_SECS,
        };
        if hls_segment_duration == 0 {
            return Err("HLS_SEGMENT_DURATION must be greater than zero".to_string());
        }

        let ffmpeg_path = env::var("FFMPEG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("ffmpeg"));

        let smtp = match env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => Some(SmtpConfig {
                host,
                port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .map_err(|_| "Invalid SMTP_PORT")?,
                mail: env::var("SMTP_MAIL").unwrap_or_default(),
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            }),
            _ => None,
        };

        let admin_email = env::var("ADMIN_EMAIL")
            .or_else(|_| env::var("SMTP_MAIL"))
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            environment,
            upload_dir,
            upload_size_limit,
            hls_segment_duration,
            ffmpeg_path,
            smtp,
            admin_email,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

//! DPL Registration Server Library
//!
//! Player registrations with admin mail notification, user accounts, and
//! video uploads transcoded to MP4 or HLS.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod security;
pub mod transcode;
pub mod uploads;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use std::sync::Arc;

use db::{AccountStore, RegistrationStore, VideoStore};
use notify::{DisabledMailer, Mailer, SmtpMailer};
use transcode::{Encoder, FfmpegEncoder, TranscodeWorker};
use uploads::UploadLayout;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub layout: UploadLayout,
    pub registrations: RegistrationStore,
    pub accounts: AccountStore,
    pub videos: VideoStore,
    pub mailer: Arc<dyn Mailer>,
    pub worker: TranscodeWorker,
}

impl AppState {
    /// Wire the stores and worker around an open database
    pub fn new(
        config: Config,
        db: Db,
        mailer: Arc<dyn Mailer>,
        encoder: Arc<dyn Encoder>,
    ) -> Self {
        let layout = UploadLayout::new(config.upload_dir.clone());
        let videos = VideoStore::new(db.clone(), layout.clone());
        let worker = TranscodeWorker::new(
            encoder,
            videos.clone(),
            layout.clone(),
            config.hls_segment_duration,
        );

        Self {
            registrations: RegistrationStore::new(db.clone()),
            accounts: AccountStore::new(db.clone()),
            videos,
            worker,
            layout,
            mailer,
            db,
            config,
        }
    }

    /// Open the database, create the upload tree and build the real mailer
    /// and encoder from configuration
    pub async fn init(config: Config) -> Result<Self> {
        let db_path = config.database_path.clone();
        let db = tokio::task::spawn_blocking(move || open_database(db_path)).await??;

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::from_config(smtp)?),
            None => {
                tracing::warn!("SMTP_HOST not set; registration notifications will fail");
                Arc::new(DisabledMailer)
            }
        };
        if config.admin_email.is_none() {
            tracing::warn!("No admin email configured");
        }

        let encoder = Arc::new(FfmpegEncoder::new(config.ffmpeg_path.clone()));
        let state = Self::new(config, db, mailer, encoder);

        state.layout.ensure_dirs().await?;
        tracing::info!("Upload directory: {}", state.layout.root().display());

        Ok(state)
    }

    /// Release resources after the server has stopped accepting requests
    pub async fn shutdown(self) {
        let Self {
            db,
            registrations,
            accounts,
            videos,
            worker,
            ..
        } = self;
        drop((registrations, accounts, videos, worker));

        match Arc::try_unwrap(db) {
            Ok(db) => {
                drop(db);
                tracing::info!("Database closed");
            }
            Err(_) => tracing::warn!("Database still in use at shutdown, closing when the last handle drops"),
        }
    }
}

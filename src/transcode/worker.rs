use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::encoder::{output_exists, EncodeJob, EncodeTarget, Encoder};
use super::upload::StagedUpload;
use crate::constants::{DEFAULT_VIDEO_TITLE, HLS_PLAYLIST_NAME};
use crate::db::VideoStore;
use crate::error::{AppError, Result};
use crate::models::{now_micros, MediaType, Video, VideoRecord};
use crate::uploads::UploadLayout;

/// What to produce from an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeMode {
    /// One H.264/AAC file
    Reencode,
    /// HLS playlist plus segments
    Hls,
}

/// Lifecycle of one ingest job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Received,
    DirectoryPrepared,
    Encoding,
    Persisted,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Received => "received",
            JobState::DirectoryPrepared => "directory_prepared",
            JobState::Encoding => "encoding",
            JobState::Persisted => "persisted",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful ingest
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub video: Video,
    /// Public URL of the playable output
    pub url: String,
}

/// Output location chosen before encoding starts
struct PreparedOutput {
    target: EncodeTarget,
    /// Path relative to the upload root
    relative: String,
    stored_name: String,
}

/// Turns staged uploads into stored, playable video assets
#[derive(Clone)]
pub struct TranscodeWorker {
    encoder: Arc<dyn Encoder>,
    videos: VideoStore,
    layout: UploadLayout,
    segment_secs: u32,
}

impl TranscodeWorker {
    pub fn new(
        encoder: Arc<dyn Encoder>,
        videos: VideoStore,
        layout: UploadLayout,
        segment_secs: u32,
    ) -> Self {
        Self {
            encoder,
            videos,
            layout,
            segment_secs,
        }
    }

    /// Encode a staged upload and record the result
    ///
    /// The job runs on its own task so that a dropped request does not stop
    /// it halfway; the staged upload is always consumed.
    pub async fn ingest(&self, upload: StagedUpload, mode: TranscodeMode) -> Result<IngestOutcome> {
        let worker = self.clone();
        let span = tracing::info_span!("transcode", upload = %upload.stored_name, ?mode);

        tokio::spawn(async move { worker.run(upload, mode).await }.instrument(span)).await?
    }

    async fn run(self, upload: StagedUpload, mode: TranscodeMode) -> Result<IngestOutcome> {
        let mut state = JobState::Received;
        tracing::info!(state = %state, size = upload.size, "Transcode job received");

        let prepared = match self.prepare(&upload, mode).await {
            Ok(prepared) => prepared,
            Err(e) => {
                log_state(&mut state, JobState::Failed);
                upload.discard().await;
                return Err(e);
            }
        };
        log_state(&mut state, JobState::DirectoryPrepared);

        let job = EncodeJob {
            input: upload.path.clone(),
            target: prepared.target.clone(),
        };

        log_state(&mut state, JobState::Encoding);
        if let Err(e) = self.encoder.encode(&job).await {
            tracing::error!(error = %e, "Encoding failed");
            log_state(&mut state, JobState::Failed);
            self.remove_output(&prepared.target).await;
            upload.discard().await;
            return Err(AppError::Encoding(e.to_string()));
        }

        if !output_exists(&prepared.target.primary_output()).await {
            tracing::error!("Encoder reported success but produced no output");
            log_state(&mut state, JobState::Failed);
            self.remove_output(&prepared.target).await;
            upload.discard().await;
            return Err(AppError::Encoding("encoder produced no output".to_string()));
        }

        let record = self.record_for(&upload, &prepared, mode);
        let video = match self.videos.create(record).await {
            Ok(video) => video,
            Err(e) => {
                log_state(&mut state, JobState::Failed);
                self.remove_output(&prepared.target).await;
                upload.discard().await;
                return Err(e);
            }
        };

        upload.discard().await;
        log_state(&mut state, JobState::Persisted);

        let url = video.hls_url.clone().unwrap_or_else(|| video.path.clone());
        Ok(IngestOutcome { video, url })
    }

    async fn prepare(&self, upload: &StagedUpload, mode: TranscodeMode) -> Result<PreparedOutput> {
        match mode {
            TranscodeMode::Hls => {
                let job_id = Uuid::new_v4().to_string();
                let hls_root = self.layout.hls_root();
                tokio::fs::create_dir_all(&hls_root).await?;

                // Fresh directory per job; create_dir fails rather than reuse one
                let dir = hls_root.join(&job_id);
                tokio::fs::create_dir(&dir).await?;

                Ok(PreparedOutput {
                    target: EncodeTarget::Hls {
                        dir,
                        segment_secs: self.segment_secs,
                    },
                    relative: format!("hls/{}/{}", job_id, HLS_PLAYLIST_NAME),
                    stored_name: HLS_PLAYLIST_NAME.to_string(),
                })
            }
            TranscodeMode::Reencode => {
                let stored_name = format!("transcoded-{}", upload.stored_name);
                let videos_dir = self.layout.videos_dir();
                tokio::fs::create_dir_all(&videos_dir).await?;

                Ok(PreparedOutput {
                    target: EncodeTarget::File {
                        output: videos_dir.join(&stored_name),
                    },
                    relative: format!("videos/{}", stored_name),
                    stored_name,
                })
            }
        }
    }

    fn record_for(&self, upload: &StagedUpload, prepared: &PreparedOutput, mode: TranscodeMode) -> VideoRecord {
        let now = now_micros();
        let path = self.layout.public_url(&prepared.relative);

        let (media_type, hls_url) = match mode {
            TranscodeMode::Hls => (MediaType::HlsPlaylist, Some(path.clone())),
            TranscodeMode::Reencode => (upload.media_type, None),
        };

        VideoRecord {
            title: upload
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_VIDEO_TITLE.to_string()),
            original_name: upload.original_name.clone(),
            stored_name: prepared.stored_name.clone(),
            path,
            size: upload.size,
            media_type,
            hls_url,
            upload_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    async fn remove_output(&self, target: &EncodeTarget) {
        let (path, result): (PathBuf, _) = match target {
            EncodeTarget::Hls { dir, .. } => (dir.clone(), tokio::fs::remove_dir_all(dir).await),
            EncodeTarget::File { output } => (output.clone(), tokio::fs::remove_file(output).await),
        };

        match result {
            Ok(()) => tracing::info!("Removed encoder output {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove encoder output {}: {}", path.display(), e),
        }
    }
}

fn log_state(state: &mut JobState, next: JobState) {
    tracing::info!(from = %state, to = %next, "Transcode state");
    *state = next;
}

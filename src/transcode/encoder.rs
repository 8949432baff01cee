use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;

use crate::constants::{HLS_PLAYLIST_NAME, HLS_SEGMENT_PATTERN};

/// Bytes of encoder stderr kept for error reports
const STDERR_TAIL_BYTES: usize = 2048;

/// Where an encode writes its output
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeTarget {
    /// Single re-encoded file (H.264 video, AAC audio)
    File { output: PathBuf },
    /// Segmented HLS rendition in its own directory
    Hls { dir: PathBuf, segment_secs: u32 },
}

impl EncodeTarget {
    /// The file that must exist after a successful encode
    pub fn primary_output(&self) -> PathBuf {
        match self {
            EncodeTarget::File { output } => output.clone(),
            EncodeTarget::Hls { dir, .. } => dir.join(HLS_PLAYLIST_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    pub input: PathBuf,
    pub target: EncodeTarget,
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to start encoder: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// External encoder seam
#[async_trait::async_trait]
pub trait Encoder: Send + Sync {
    /// Run one job to completion
    async fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError>;
}

/// Runs the `ffmpeg` binary
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Command line for a job, excluding the program name
pub fn ffmpeg_args(job: &EncodeJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), job.input.clone().into()];

    match &job.target {
        EncodeTarget::File { output } => {
            args.extend(["-c:v", "libx264", "-c:a", "aac"].map(OsString::from));
            args.push(output.clone().into());
        }
        EncodeTarget::Hls { dir, segment_secs } => {
            args.extend(
                [
                    "-profile:v",
                    "baseline",
                    "-level",
                    "3.0",
                    "-start_number",
                    "0",
                    "-hls_time",
                ]
                .map(OsString::from),
            );
            args.push(segment_secs.to_string().into());
            args.extend(["-hls_list_size", "0", "-f", "hls", "-hls_segment_filename"].map(OsString::from));
            args.push(dir.join(HLS_SEGMENT_PATTERN).into());
            args.push(dir.join(HLS_PLAYLIST_NAME).into());
        }
    }

    args
}

#[async_trait::async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError> {
        tracing::debug!(program = %self.program.display(), input = %job.input.display(), "Starting encoder");

        let output = Command::new(&self.program)
            .args(ffmpeg_args(job))
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(EncodeError::Failed {
                status: output.status,
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}

/// True when `path` exists and is a regular file
pub async fn output_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

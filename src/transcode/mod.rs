//! Upload staging and transcoding of video assets.

pub mod encoder;
pub mod upload;
pub mod worker;

pub use encoder::{EncodeError, EncodeJob, EncodeTarget, Encoder, FfmpegEncoder};
pub use upload::{stage_upload, StagedUpload};
pub use worker::{IngestOutcome, JobState, TranscodeMode, TranscodeWorker};

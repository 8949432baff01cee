use redb::ReadableTable;
use uuid::Uuid;

use super::{decode, encode, tables, Db};
use crate::constants::ERR_VIDEO_NOT_FOUND;
use crate::error::{AppError, Result};
use crate::models::{MediaType, Video, VideoRecord};
use crate::uploads::UploadLayout;

/// Persists video asset metadata and owns removal of the files behind it
#[derive(Clone)]
pub struct VideoStore {
    db: Db,
    layout: UploadLayout,
}

impl VideoStore {
    pub fn new(db: Db, layout: UploadLayout) -> Self {
        Self { db, layout }
    }

    pub async fn create(&self, record: VideoRecord) -> Result<Video> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Video> {
            let id = Uuid::new_v4().to_string();

            let write_txn = db.begin_write()?;
            {
                let mut videos = write_txn.open_table(tables::VIDEOS)?;
                let bytes = encode(&record)?;
                videos.insert(id.as_str(), bytes.as_slice())?;
            }
            write_txn.commit()?;

            tracing::info!("Video saved: {}", id);
            Ok(record.to_video(&id))
        })
        .await?
    }

    /// All videos, most recent upload first
    pub async fn list(&self) -> Result<Vec<Video>> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<Video>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(tables::VIDEOS)?;

            let mut records = Vec::new();
            for entry in table.iter()? {
                let (id, bytes) = entry?;
                let record: VideoRecord = decode(bytes.value())?;
                records.push((id.value().to_string(), record));
            }

            records.sort_by(|a, b| b.1.upload_date.cmp(&a.1.upload_date));

            Ok(records
                .iter()
                .map(|(id, record)| record.to_video(id))
                .collect())
        })
        .await?
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Video> {
        self.get_record(id)
            .await
            .map(|record| record.to_video(id))
    }

    /// Delete a video and the file(s) behind it
    ///
    /// File removal is best-effort: failures are logged and the record is
    /// removed regardless.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let record = self.get_record(id).await?;

        self.remove_files(&record).await;

        let db = self.db.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let write_txn = db.begin_write()?;
            {
                let mut videos = write_txn.open_table(tables::VIDEOS)?;
                if videos.remove(id.as_str())?.is_none() {
                    return Err(AppError::NotFound(ERR_VIDEO_NOT_FOUND));
                }
            }
            write_txn.commit()?;

            tracing::info!("Video deleted: {}", id);
            Ok(())
        })
        .await?
    }

    async fn get_record(&self, id: &str) -> Result<VideoRecord> {
        let db = self.db.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || -> Result<VideoRecord> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(tables::VIDEOS)?;

            table
                .get(id.as_str())?
                .map(|bytes| decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::NotFound(ERR_VIDEO_NOT_FOUND))
        })
        .await?
    }

    async fn remove_files(&self, record: &VideoRecord) {
        let Some(file) = self.layout.resolve(&record.path) else {
            tracing::warn!("Video path outside upload root, skipping file removal: {}", record.path);
            return;
        };

        let hls_dir = match record.media_type {
            MediaType::HlsPlaylist => self.layout.hls_dir_of(&file),
            _ => None,
        };

        let result = match &hls_dir {
            Some(dir) => tokio::fs::remove_dir_all(dir).await,
            None => tokio::fs::remove_file(&file).await,
        };

        match result {
            Ok(()) => match hls_dir {
                Some(dir) => tracing::info!("Deleted HLS directory: {}", dir.display()),
                None => tracing::info!("Deleted file: {}", file.display()),
            },
            Err(e) => tracing::error!("Error deleting file {}: {}", file.display(), e),
        }
    }
}

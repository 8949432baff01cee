use serde::{Deserialize, Serialize};

use super::micros_to_rfc3339;

/// Media types a video asset may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Mp4,
    Mkv,
    Avi,
    Mov,
    /// HLS playlist produced by segmentation
    HlsPlaylist,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Mp4 => "video/mp4",
            MediaType::Mkv => "video/mkv",
            MediaType::Avi => "video/avi",
            MediaType::Mov => "video/mov",
            MediaType::HlsPlaylist => "application/x-mpegURL",
        }
    }

    /// Container types accepted for upload. Playlists are produced by the
    /// server and never accepted from clients.
    pub fn from_upload_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "video/mp4" => Some(MediaType::Mp4),
            "video/mkv" | "video/x-matroska" => Some(MediaType::Mkv),
            "video/avi" | "video/x-msvideo" => Some(MediaType::Avi),
            "video/mov" | "video/quicktime" => Some(MediaType::Mov),
            _ => None,
        }
    }
}

/// Video record stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    pub original_name: String,
    pub stored_name: String,
    /// Public path under the uploads prefix; resolved against the upload root
    pub path: String,
    /// Size in bytes of the original upload
    pub size: u64,
    pub media_type: MediaType,
    pub hls_url: Option<String>,
    /// Unix microseconds
    pub upload_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl VideoRecord {
    pub fn to_video(&self, id: &str) -> Video {
        Video {
            id: id.to_string(),
            title: self.title.clone(),
            original_name: self.original_name.clone(),
            stored_name: self.stored_name.clone(),
            path: self.path.clone(),
            size: self.size,
            mimetype: self.media_type.as_str(),
            hls_url: self.hls_url.clone(),
            upload_date: micros_to_rfc3339(self.upload_date),
            created_at: micros_to_rfc3339(self.created_at),
            updated_at: micros_to_rfc3339(self.updated_at),
        }
    }
}

/// Video model for API responses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub original_name: String,
    pub stored_name: String,
    pub path: String,
    pub size: u64,
    pub mimetype: &'static str,
    pub hls_url: Option<String>,
    pub upload_date: String,
    pub created_at: String,
    pub updated_at: String,
}

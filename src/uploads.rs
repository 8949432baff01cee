//! On-disk layout of the upload tree.
//!
//! ```text
//! <root>/staging/<millis>-<uuid>.<ext>     raw uploads awaiting transcoding
//! <root>/videos/transcoded-<staged name>   re-encoded files
//! <root>/hls/<uuid>/index.m3u8             HLS playlists and their segments
//! ```
//!
//! `<root>` is served at `/uploads`, so a record's public path and its file
//! on disk are two views of the same relative path.

use std::path::{Component, Path, PathBuf};

use crate::constants::UPLOADS_URL_PREFIX;

#[derive(Debug, Clone)]
pub struct UploadLayout {
    root: PathBuf,
}

impl UploadLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("staging")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn hls_root(&self) -> PathBuf {
        self.root.join("hls")
    }

    /// Create the directory tree if it does not exist yet
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.staging_dir()).await?;
        tokio::fs::create_dir_all(self.videos_dir()).await?;
        tokio::fs::create_dir_all(self.hls_root()).await?;
        Ok(())
    }

    /// Public URL of a path relative to the root
    pub fn public_url(&self, relative: &str) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, relative.trim_start_matches('/'))
    }

    /// Map a public `/uploads/...` path back to its file on disk
    ///
    /// Returns `None` for paths outside the prefix or that try to escape the root.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path
            .strip_prefix(UPLOADS_URL_PREFIX)?
            .strip_prefix('/')?;

        let relative = Path::new(relative);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain || relative.as_os_str().is_empty() {
            return None;
        }

        Some(self.root.join(relative))
    }

    /// Directory holding an HLS playlist, if `file` sits directly in one
    pub fn hls_dir_of(&self, file: &Path) -> Option<PathBuf> {
        let dir = file.parent()?;
        (dir.parent()? == self.hls_root()).then(|| dir.to_path_buf())
    }
}

//! Local staging area for uploaded files awaiting a remote push.
//!
//! The HTTP layer writes incoming multipart files under a staging root
//! using per-entity prefixes (`/banners/`, `/categories/`); the pipeline
//! reads them back for upload and removes them after a successful push.
//! All payload paths are root-relative with a leading slash.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use showroom_core::config::media::MediaConfig;
use showroom_core::error::{AppError, ErrorKind};
use showroom_core::result::AppResult;

/// Handle on the staging directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create a staging area rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a staging area from configuration.
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.staging_root)
    }

    /// The staging root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Read a staged file into memory.
    pub async fn read(&self, path: &str) -> AppResult<Bytes> {
        let full = self.resolve(path);
        let data = tokio::fs::read(&full).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to read staged file {}", full.display()),
                e,
            )
        })?;
        Ok(Bytes::from(data))
    }

    /// Remove a staged file addressed as `<prefix><filename>`.
    pub async fn remove(&self, prefix: &str, filename: &str) -> AppResult<()> {
        self.remove_path(&format!("{prefix}{filename}")).await
    }

    /// Remove a staged file by its root-relative path.
    pub async fn remove_path(&self, path: &str) -> AppResult<()> {
        let full = self.resolve(path);
        tokio::fs::remove_file(&full).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to remove staged file {}", full.display()),
                e,
            )
        })
    }

    /// Whether a staged file exists.
    pub async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn stage_file(area: &StagingArea, rel: &str, contents: &[u8]) {
        let full = area.resolve(rel);
        tokio::fs::create_dir_all(full.parent().unwrap()).await.unwrap();
        tokio::fs::write(&full, contents).await.unwrap();
    }

    #[tokio::test]
    async fn read_resolves_root_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());
        stage_file(&area, "/categories/a.png", b"icon bytes").await;

        let data = area.read("/categories/a.png").await.unwrap();
        assert_eq!(&data[..], b"icon bytes");
    }

    #[tokio::test]
    async fn remove_joins_prefix_and_filename() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());
        stage_file(&area, "/categories/a.png", b"icon bytes").await;

        area.remove("/categories/", "a.png").await.unwrap();
        assert!(!area.exists("/categories/a.png").await);
    }

    #[tokio::test]
    async fn missing_files_error_on_read_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        assert!(area.read("/categories/missing.png").await.is_err());
        assert!(area.remove("/categories/", "missing.png").await.is_err());
    }
}

//! In-memory media store double for tests and local development.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use showroom_core::error::AppError;
use showroom_core::result::AppResult;
use showroom_core::traits::media::{MediaStore, UploadedMedia};

use crate::public_id::object_path_from_url;

/// A recorded upload.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Destination folder.
    pub folder: String,
    /// Object path assigned by the store.
    pub public_id: String,
    /// Uploaded size in bytes.
    pub bytes: u64,
}

/// In-memory [`MediaStore`] that records every upload and delete.
///
/// Uploads produce URLs in the real store's shape (with a version segment)
/// so the delete-path parsing round-trips. `fail_uploads` simulates a
/// remote outage for retry tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaStore {
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    deletes: Arc<Mutex<Vec<String>>>,
    counter: Arc<AtomicU64>,
    fail_uploads: Arc<AtomicBool>,
}

impl InMemoryMediaStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent uploads fail (or succeed again).
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of recorded uploads.
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().expect("uploads lock").clone()
    }

    /// Snapshot of recorded deleted object paths.
    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().expect("deletes lock").clone()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(&self, data: Bytes, folder: &str) -> AppResult<UploadedMedia> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::media_store("Simulated upload failure"));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let public_id = format!("{folder}/obj{n}");
        let uploaded = UploadedMedia {
            secure_url: format!("https://cdn.test/demo/image/upload/v1/{public_id}.png"),
            public_id: public_id.clone(),
            bytes: data.len() as u64,
        };

        self.uploads.lock().expect("uploads lock").push(RecordedUpload {
            folder: folder.to_string(),
            public_id,
            bytes: uploaded.bytes,
        });

        Ok(uploaded)
    }

    async fn delete_by_url(&self, url: &str) -> AppResult<bool> {
        let Some(object_path) = object_path_from_url(url) else {
            return Ok(false);
        };
        self.deletes.lock().expect("deletes lock").push(object_path);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uploaded_urls_round_trip_through_delete_parsing() {
        let store = InMemoryMediaStore::new();
        let uploaded = store.upload(Bytes::from_static(b"png"), "banners").await.unwrap();

        assert!(store.delete_by_url(&uploaded.secure_url).await.unwrap());
        assert_eq!(store.deletes(), vec![uploaded.public_id]);
    }

    #[tokio::test]
    async fn unparsable_urls_are_a_no_op() {
        let store = InMemoryMediaStore::new();
        assert!(!store.delete_by_url("https://elsewhere.test/a.png").await.unwrap());
        assert!(store.deletes().is_empty());
    }

    #[tokio::test]
    async fn batch_upload_fails_as_a_whole() {
        let store = InMemoryMediaStore::new();
        store.set_fail_uploads(true);
        let buffers = vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")];
        assert!(store.upload_many(buffers, "banners").await.is_err());
    }
}

//! Remote media store trait for pluggable object-store backends.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Result of a successful upload to the remote media store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Permanent, publicly served URL of the uploaded object.
    pub secure_url: String,
    /// Store-assigned object identifier.
    pub public_id: String,
    /// Size of the uploaded object in bytes.
    pub bytes: u64,
}

/// Trait for remote media store backends.
///
/// The [`MediaStore`] trait is defined here in `showroom-core` and
/// implemented in `showroom-media`. Implementations do **not** retry:
/// retry policy belongs to the task queue layer.
#[async_trait]
pub trait MediaStore: Send + Sync + std::fmt::Debug + 'static {
    /// Upload a byte buffer into the given folder on the remote store.
    async fn upload(&self, data: Bytes, folder: &str) -> AppResult<UploadedMedia>;

    /// Upload several buffers concurrently into the same folder.
    ///
    /// The whole batch fails if any single upload fails; callers that need
    /// partial-success semantics call [`MediaStore::upload`] per item.
    async fn upload_many(&self, buffers: Vec<Bytes>, folder: &str) -> AppResult<Vec<UploadedMedia>>
    where
        Self: Sized,
    {
        futures::future::try_join_all(buffers.into_iter().map(|data| self.upload(data, folder)))
            .await
    }

    /// Delete an object given its public URL.
    ///
    /// Returns `false` (without an error) when no object identifier can be
    /// parsed from the URL: deletion must tolerate "nothing to delete".
    async fn delete_by_url(&self, url: &str) -> AppResult<bool>;
}

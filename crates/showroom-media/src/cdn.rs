//! HTTP client for the remote CDN media store.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use showroom_core::config::media::CdnConfig;
use showroom_core::error::{AppError, ErrorKind};
use showroom_core::result::AppResult;
use showroom_core::traits::media::{MediaStore, UploadedMedia};

use crate::public_id::object_path_from_url;

/// Remote CDN store client.
///
/// Talks to the image CDN's HTTP API: multipart uploads into named
/// folders, deletes by object path. No retries here — the task queue owns
/// retry policy.
#[derive(Debug, Clone)]
pub struct CdnMediaStore {
    http: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

/// Upload response body from the CDN API.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    bytes: u64,
}

impl CdnMediaStore {
    /// Create a new CDN store client from configuration.
    pub fn new(config: &CdnConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::MediaStore, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn map_err(context: &str, e: reqwest::Error) -> AppError {
        AppError::with_source(ErrorKind::MediaStore, format!("{context}: {e}"), e)
    }
}

#[async_trait]
impl MediaStore for CdnMediaStore {
    async fn upload(&self, data: Bytes, folder: &str) -> AppResult<UploadedMedia> {
        let url = format!("{}/{}/image/upload", self.base_url, self.cloud_name);
        let form = Form::new()
            .part("file", Part::bytes(data.to_vec()).file_name("file"))
            .text("folder", folder.to_string());

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::map_err("Upload request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::media_store(format!(
                "Upload rejected with status {status}: {body}"
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| Self::map_err("Malformed upload response", e))?;

        debug!(
            public_id = %uploaded.public_id,
            bytes = uploaded.bytes,
            folder,
            "Uploaded object to remote store"
        );

        Ok(UploadedMedia {
            secure_url: uploaded.secure_url,
            public_id: uploaded.public_id,
            bytes: uploaded.bytes,
        })
    }

    async fn delete_by_url(&self, url: &str) -> AppResult<bool> {
        let Some(object_path) = object_path_from_url(url) else {
            warn!(url, "Could not parse object path from URL, nothing to delete");
            return Ok(false);
        };

        let endpoint = format!(
            "{}/{}/resources/image/upload",
            self.base_url, self.cloud_name
        );
        let response = self
            .http
            .delete(&endpoint)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("public_ids[]", object_path.as_str())])
            .send()
            .await
            .map_err(|e| Self::map_err("Delete request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::media_store(format!(
                "Delete rejected with status {status}: {body}"
            )));
        }

        debug!(object_path, "Deleted object from remote store");
        Ok(true)
    }
}

//! Remote media store and local staging configuration.

use serde::{Deserialize, Serialize};

/// Top-level media configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Remote CDN store settings.
    #[serde(default)]
    pub cdn: CdnConfig,
    /// Root directory where staged uploads are written by the HTTP layer
    /// and cleaned up by the pipeline after a successful push.
    #[serde(default = "default_staging_root")]
    pub staging_root: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cdn: CdnConfig::default(),
            staging_root: default_staging_root(),
        }
    }
}

/// Remote CDN store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    /// Base URL of the CDN upload API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Account / cloud identifier within the CDN.
    #[serde(default)]
    pub cloud_name: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default)]
    pub api_secret: String,
    /// Per-request timeout in seconds for uploads and deletes.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.cdn.example.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_staging_root() -> String {
    "./data/staging".to_string()
}

//! Storage configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use trialcheck_shared::config::StorageSettings;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory, lost on restart (tests only)
    Memory,
}

impl StorageProvider {
    /// Builds a provider from flat application settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` for an unknown provider name or a
    /// missing required setting.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| StorageError::configuration(format!("storage.{name} is required")))
        };

        match settings.provider.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3 {
                endpoint: require(&settings.endpoint, "endpoint")?,
                bucket: require(&settings.bucket, "bucket")?,
                access_key_id: require(&settings.access_key_id, "access_key_id")?,
                secret_access_key: require(&settings.secret_access_key, "secret_access_key")?,
                region: settings.region.clone().unwrap_or_else(|| "auto".to_string()),
            }),
            "azblob" | "azure_blob" => Ok(Self::AzureBlob {
                account: require(&settings.access_key_id, "access_key_id")?,
                access_key: require(&settings.secret_access_key, "secret_access_key")?,
                container: require(&settings.bucket, "bucket")?,
            }),
            "fs" | "local" => Ok(Self::LocalFs {
                root: settings.root.clone(),
            }),
            "memory" => Ok(Self::Memory),
            other => Err(StorageError::configuration(format!(
                "unknown storage provider '{other}'"
            ))),
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }
}

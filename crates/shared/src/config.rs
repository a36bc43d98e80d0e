//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Result storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Upload limits.
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Key-value storage settings.
///
/// Kept flat so every field can be set from a single environment variable,
/// e.g. `TRIALCHECK__STORAGE__PROVIDER=s3`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// One of `memory`, `fs`, `s3`, `azblob`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for the `fs` provider.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Endpoint URL for `s3`.
    pub endpoint: Option<String>,
    /// Bucket (`s3`) or container (`azblob`) name.
    pub bucket: Option<String>,
    /// Region for `s3`.
    pub region: Option<String>,
    /// Access key id (`s3`) or account name (`azblob`).
    pub access_key_id: Option<String>,
    /// Secret access key (`s3`) or account key (`azblob`).
    pub secret_access_key: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            root: default_root(),
            endpoint: None,
            bucket: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

fn default_provider() -> String {
    "fs".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("./data")
}

/// Upload limits.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024 // 10 MiB
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TRIALCHECK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

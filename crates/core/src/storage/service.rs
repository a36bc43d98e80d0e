//! Key-value store over Apache OpenDAL.

use std::future::Future;

use opendal::{ErrorKind, Operator, services};

use super::config::StorageProvider;
use super::error::StorageError;

/// Minimal key-value persistence used for validation results.
///
/// Values are opaque byte blobs. `set` overwrites unconditionally.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value, returning `None` if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    /// Writes a value, replacing any existing one.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// `KeyValueStore` backed by an OpenDAL operator.
#[derive(Debug, Clone)]
pub struct OperatorStore {
    operator: Operator,
    provider_name: &'static str,
}

impl OperatorStore {
    /// Creates a store for the given provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_provider(provider: &StorageProvider) -> Result<Self, StorageError> {
        let operator = Self::create_operator(provider)?;
        Ok(Self {
            operator,
            provider_name: provider.name(),
        })
    }

    /// Creates an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be built.
    pub fn memory() -> Result<Self, StorageError> {
        Self::from_provider(&StorageProvider::Memory)
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)?.finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder)?.finish()
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root))?.finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())?.finish(),
        };
        Ok(operator)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}

impl KeyValueStore for OperatorStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self.operator.read(key).await {
            Ok(buffer) => Ok(Some(buffer.to_vec())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.operator.write(key, value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_get_missing_key() {
        let store = OperatorStore::memory().expect("memory store");
        assert_eq!(store.provider_name(), "memory");
        assert_eq!(store.get("trial-balance:acme:2024-01").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_memory_set_then_get() {
        let store = OperatorStore::memory().expect("memory store");
        store
            .set("trial-balance:acme:2024-01", b"{\"a\":1}".to_vec())
            .await
            .expect("set");

        let value = store.get("trial-balance:acme:2024-01").await.expect("get");
        assert_eq!(value.as_deref(), Some(&b"{\"a\":1}"[..]));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = OperatorStore::memory().expect("memory store");
        store.set("k", b"first".to_vec()).await.expect("set");
        store.set("k", b"second".to_vec()).await.expect("set");
        assert_eq!(
            store.get("k").await.expect("get").as_deref(),
            Some(&b"second"[..])
        );
    }

    #[tokio::test]
    async fn test_local_fs_round_trip() {
        let root = std::env::temp_dir().join(format!("trialcheck-store-{}", std::process::id()));
        let store = OperatorStore::from_provider(&StorageProvider::LocalFs { root: root.clone() })
            .expect("fs store");

        store.set("trial-balance:acme:2024-03", b"{}".to_vec()).await.expect("set");
        assert_eq!(
            store.get("trial-balance:acme:2024-03").await.expect("get").as_deref(),
            Some(&b"{}"[..])
        );

        let _ = std::fs::remove_dir_all(root);
    }
}

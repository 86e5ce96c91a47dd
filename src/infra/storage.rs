//! Certificate file storage on the local filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// File store abstraction; paths it hands out are relative keys.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `bytes` for a certificate and return the stored key
    async fn save(&self, certificate_id: Uuid, extension: &str, bytes: Vec<u8>) -> AppResult<String>;

    async fn read(&self, key: &str) -> AppResult<Vec<u8>>;

    /// Remove a stored file; missing files are ignored
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// Stores files under a root directory
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key inside the root, rejecting anything that could escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let path = Path::new(key);
        let is_plain_name = path.components().count() == 1
            && matches!(path.components().next(), Some(std::path::Component::Normal(_)));
        if !is_plain_name {
            return Err(AppError::bad_request("Invalid file reference"));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl FileStore for LocalFileStorage {
    async fn save(&self, certificate_id: Uuid, extension: &str, bytes: Vec<u8>) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let key = format!("{}_{}.{}", certificate_id, Uuid::new_v4().simple(), extension);
        let path = self.resolve(&key)?;
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(file = %key, "Stored certificate file");
        Ok(key)
    }

    async fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> LocalFileStorage {
        let root = std::env::temp_dir().join(format!("cg-storage-{}", Uuid::new_v4().simple()));
        LocalFileStorage::new(root)
    }

    #[tokio::test]
    async fn test_save_read_remove() {
        let store = storage();
        let id = Uuid::new_v4();

        let key = store.save(id, "pfx", b"binary".to_vec()).await.unwrap();
        assert!(key.starts_with(&id.to_string()));
        assert!(key.ends_with(".pfx"));
        assert_eq!(store.read(&key).await.unwrap(), b"binary");

        store.remove(&key).await.unwrap();
        assert!(matches!(store.read(&key).await, Err(AppError::NotFound)));
        // Removing twice is fine
        store.remove(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let store = storage();
        assert!(store.read("../etc/passwd").await.is_err());
        assert!(store.read("/etc/passwd").await.is_err());
        assert!(store.read("a/b.pfx").await.is_err());
    }
}

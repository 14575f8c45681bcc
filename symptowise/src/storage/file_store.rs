//! File-per-key backing store
//!
//! Each key is stored as `<root>/<key>.json`. Writes go to a temp file
//! first and are renamed into place, so a reader never sees a torn value.

use super::BackingStore;
use crate::error::{AppError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("File store initialized at: {:?}", self.root);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn get_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl BackingStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.get_path(key)?;

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.get_path(key)?;
        fs::create_dir_all(&self.root).await?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Wrote key {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.get_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Removed key {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("store"));
        store.initialize().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (store, _temp) = create_test_store().await;

        store.set("symptoms", "[]").await.unwrap();

        assert_eq!(store.get("symptoms").await.unwrap().as_deref(), Some("[]"));
        assert!(store.root().join("symptoms.json").exists());
        assert!(!store.root().join("symptoms.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (store, _temp) = create_test_store().await;

        assert_eq!(store.get("carePlans").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_and_remove() {
        let (store, _temp) = create_test_store().await;

        store.set("routineTasks", "[1]").await.unwrap();
        store.set("routineTasks", "[2]").await.unwrap();
        assert_eq!(store.get("routineTasks").await.unwrap().as_deref(), Some("[2]"));

        store.remove("routineTasks").await.unwrap();
        store.remove("routineTasks").await.unwrap();
        assert_eq!(store.get("routineTasks").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let (store, _temp) = create_test_store().await;

        let err = store.set("../escape", "x").await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}

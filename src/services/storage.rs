use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Blob store for uploaded originals, keyed by the server-generated
/// filename. Originals are served publicly by filename, so the store only
/// needs write, read, existence-check and delete.
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn put(&self, filename: &str, data: &[u8]) -> Result<()>;
    async fn get(&self, filename: &str) -> Result<Vec<u8>>;
    async fn exists(&self, filename: &str) -> Result<bool>;
    /// Idempotent: deleting a missing file is not an error.
    async fn delete(&self, filename: &str) -> Result<()>;
}

/// Filesystem-backed store rooted at the configured upload directory.
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        // Keys are server-generated, but never trust them as paths.
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || Path::new(filename).components().count() != 1
            || filename == ".."
        {
            return Err(anyhow!("invalid storage key: {filename}"));
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn put(&self, filename: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(filename)?;
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn get(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.resolve(filename)?;
        Ok(tokio::fs::read(&path).await?)
    }

    async fn exists(&self, filename: &str) -> Result<bool> {
        let path = self.resolve(filename)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn delete(&self, filename: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

//! Blob storage for node content.
//!
//! Blobs live as flat files in a single directory, named by a random
//! UUID reference. Image derivatives sit next to their original as
//! `<ref>_<width>`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::{DepotError, Result};

/// Derivative widths generated for every image upload.
pub const VARIANT_WIDTHS: &[u32] = &[100, 250, 500];

/// Flat-directory blob store.
#[derive(Debug, Clone)]
pub struct BlobStorage {
    root: PathBuf,
}

impl BlobStorage {
    /// Open a blob store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| DepotError::Storage(format!("cannot create storage dir: {e}")))?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the storage directory is reachable.
    pub fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    /// Store a new blob, returning its reference.
    pub async fn store(&self, bytes: &[u8]) -> Result<String> {
        let blob_ref = Uuid::new_v4().to_string();
        let path = self.root.join(&blob_ref);

        fs::write(&path, bytes)
            .await
            .map_err(|e| DepotError::Storage(format!("cannot write blob {blob_ref}: {e}")))?;

        debug!(blob_ref = %blob_ref, size = bytes.len(), "Stored blob");
        Ok(blob_ref)
    }

    /// Load a blob by reference.
    pub async fn load(&self, blob_ref: &str) -> Result<Vec<u8>> {
        let path = self.root.join(blob_ref);

        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DepotError::NotFound("blob".to_string()))
            }
            Err(e) => Err(DepotError::Storage(format!(
                "cannot read blob {blob_ref}: {e}"
            ))),
        }
    }

    /// Remove a blob if present.
    pub async fn remove(&self, blob_ref: &str) -> Result<()> {
        let path = self.root.join(blob_ref);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DepotError::Storage(format!(
                "cannot remove blob {blob_ref}: {e}"
            ))),
        }
    }

    /// Name of a derivative blob.
    pub fn variant_name(blob_ref: &str, width: u32) -> String {
        format!("{blob_ref}_{width}")
    }

    /// Store a derivative next to its original.
    pub async fn store_variant(&self, blob_ref: &str, width: u32, bytes: &[u8]) -> Result<()> {
        let name = Self::variant_name(blob_ref, width);
        let path = self.root.join(&name);

        fs::write(&path, bytes)
            .await
            .map_err(|e| DepotError::Storage(format!("cannot write variant {name}: {e}")))?;

        debug!(variant = %name, size = bytes.len(), "Stored variant");
        Ok(())
    }

    /// Load a derivative, validating the requested width first.
    pub async fn load_variant(&self, blob_ref: &str, width: u32) -> Result<Vec<u8>> {
        if !VARIANT_WIDTHS.contains(&width) {
            return Err(DepotError::Validation("Invalid size parameter".to_string()));
        }
        self.load(&Self::variant_name(blob_ref, width)).await
    }

    /// Remove a derivative if present.
    pub async fn remove_variant(&self, blob_ref: &str, width: u32) -> Result<()> {
        let path = self.root.join(Self::variant_name(blob_ref, width));

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DepotError::Storage(format!(
                "cannot remove variant {blob_ref}_{width}: {e}"
            ))),
        }
    }

    /// Whether a blob exists.
    pub async fn exists(&self, blob_ref: &str) -> bool {
        fs::try_exists(self.root.join(blob_ref)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BlobStorage) {
        let dir = TempDir::new().unwrap();
        let storage = BlobStorage::new(dir.path()).unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let (_dir, storage) = setup();

        let blob_ref = storage.store(b"hello world").await.unwrap();
        assert!(storage.exists(&blob_ref).await);

        let bytes = storage.load(&blob_ref).await.unwrap();
        assert_eq!(bytes, b"hello world");
    }

    #[tokio::test]
    async fn test_load_missing_blob() {
        let (_dir, storage) = setup();

        let result = storage.load("no-such-ref").await;
        assert!(matches!(result, Err(DepotError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_refs_are_unique() {
        let (_dir, storage) = setup();

        let a = storage.store(b"same").await.unwrap();
        let b = storage.store(b"same").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_remove_blob_idempotent() {
        let (_dir, storage) = setup();

        let blob_ref = storage.store(b"bytes").await.unwrap();
        storage.remove(&blob_ref).await.unwrap();
        storage.remove(&blob_ref).await.unwrap();

        assert!(!storage.exists(&blob_ref).await);
    }

    #[tokio::test]
    async fn test_variants() {
        let (_dir, storage) = setup();

        let blob_ref = storage.store(b"original").await.unwrap();
        storage.store_variant(&blob_ref, 100, b"small").await.unwrap();

        let bytes = storage.load_variant(&blob_ref, 100).await.unwrap();
        assert_eq!(bytes, b"small");

        // Unwritten width of the allowed set
        let result = storage.load_variant(&blob_ref, 250).await;
        assert!(matches!(result, Err(DepotError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_variant_rejects_bad_width() {
        let (_dir, storage) = setup();

        let blob_ref = storage.store(b"original").await.unwrap();
        let result = storage.load_variant(&blob_ref, 300).await;
        assert!(matches!(result, Err(DepotError::Validation(_))));
    }

    #[tokio::test]
    async fn test_remove_variant_idempotent() {
        let (_dir, storage) = setup();

        let blob_ref = storage.store(b"original").await.unwrap();
        storage.store_variant(&blob_ref, 100, b"small").await.unwrap();

        storage.remove_variant(&blob_ref, 100).await.unwrap();
        storage.remove_variant(&blob_ref, 100).await.unwrap();

        let result = storage.load_variant(&blob_ref, 100).await;
        assert!(matches!(result, Err(DepotError::NotFound(_))));
    }
}

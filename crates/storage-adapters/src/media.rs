//! Blob storage for uploaded images.
//!
//! Blob ids are fresh UUIDs rather than content hashes, so deleting one
//! reference can never invalidate another record that happened to upload
//! identical bytes.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use uuid::Uuid;

use domains::error::{DomainError, DomainResult};
use domains::ports::BlobStore;

/// In-memory content store. Keeps the original filename alongside the
/// bytes; serving does not need it, but tests assert on it.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<Uuid, (String, Bytes)>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.blobs.len()
    }

    pub fn filename_of(&self, id: Uuid) -> Option<String> {
        self.blobs.get(&id).map(|entry| entry.value().0.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, data: Bytes, filename: &str) -> DomainResult<Uuid> {
        let id = Uuid::now_v7();
        self.blobs.insert(id, (filename.to_owned(), data));
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Bytes>> {
        Ok(self.blobs.get(&id).map(|entry| entry.value().1.clone()))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.blobs.remove(&id);
        Ok(())
    }
}

#[cfg(feature = "media-local")]
pub use local::LocalBlobStore;

#[cfg(feature = "media-local")]
mod local {
    use std::path::PathBuf;

    use tokio::fs;
    use tracing::debug;

    use super::*;

    /// Local filesystem blob store (`media-local` feature). Blobs are
    /// sharded across two directory levels to keep any one directory
    /// small: `ab/cd/abcd...`.
    pub struct LocalBlobStore {
        root: PathBuf,
    }

    impl LocalBlobStore {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        fn blob_path(&self, id: Uuid) -> PathBuf {
            let hex = id.simple().to_string();
            self.root.join(&hex[0..2]).join(&hex[2..4]).join(hex)
        }
    }

    fn io_err(err: std::io::Error) -> DomainError {
        DomainError::Internal(format!("blob i/o: {err}"))
    }

    #[async_trait]
    impl BlobStore for LocalBlobStore {
        async fn put(&self, data: Bytes, filename: &str) -> DomainResult<Uuid> {
            let id = Uuid::now_v7();
            let path = self.blob_path(id);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(io_err)?;
            }
            fs::write(&path, &data).await.map_err(io_err)?;
            debug!(blob_id = %id, %filename, size = data.len(), "stored blob");
            Ok(id)
        }

        async fn get(&self, id: Uuid) -> DomainResult<Option<Bytes>> {
            match fs::read(self.blob_path(id)).await {
                Ok(data) => Ok(Some(Bytes::from(data))),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(io_err(err)),
            }
        }

        async fn delete(&self, id: Uuid) -> DomainResult<()> {
            match fs::remove_file(self.blob_path(id)).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(io_err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_blobs_round_trip_and_delete_idempotently() {
        let store = MemoryBlobStore::new();
        let id = store
            .put(Bytes::from_static(b"jpeg bytes"), "dish.jpg")
            .await
            .unwrap();

        assert_eq!(
            store.get(id).await.unwrap(),
            Some(Bytes::from_static(b"jpeg bytes"))
        );
        assert_eq!(store.filename_of(id).as_deref(), Some("dish.jpg"));

        store.delete(id).await.unwrap();
        store.delete(id).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), None);
        assert_eq!(store.count(), 0);
    }

    #[cfg(feature = "media-local")]
    #[tokio::test]
    async fn local_blobs_land_in_sharded_paths() {
        let root = std::env::temp_dir().join(format!("dishboard-blobs-{}", Uuid::new_v4()));
        let store = LocalBlobStore::new(root.clone());

        let id = store
            .put(Bytes::from_static(b"file bytes"), "dish.jpg")
            .await
            .unwrap();
        let hex = id.simple().to_string();
        assert!(root.join(&hex[0..2]).join(&hex[2..4]).join(&hex).is_file());

        assert_eq!(
            store.get(id).await.unwrap(),
            Some(Bytes::from_static(b"file bytes"))
        );
        store.delete(id).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), None);
        // Deleting again is fine.
        store.delete(id).await.unwrap();

        let _ = tokio::fs::remove_dir_all(root).await;
    }
}

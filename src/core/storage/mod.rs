//! Storage Retrieval Module
//!
//! Byte-fetch capability for source assets and voice clips. The
//! orchestrator receives a [`StorageClient`] at construction time;
//! nothing in the pipeline resolves a storage backend at runtime.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::{ExportError, ExportResult, StorageRef};

/// Opaque byte-fetch capability for stored assets.
///
/// A reference is whatever the upstream system hands out: a
/// time-limited signed URL, a workspace-relative path, a clip key.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn fetch(&self, reference: &StorageRef) -> ExportResult<Vec<u8>>;
}

// =============================================================================
// Signed-URL Backend
// =============================================================================

/// Fetches bytes over HTTPS from time-limited signed URLs
pub struct HttpStorageClient {
    client: reqwest::Client,
}

impl HttpStorageClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn fetch(&self, reference: &StorageRef) -> ExportResult<Vec<u8>> {
        let response = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| ExportError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ExportError::Network(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            reqwest::StatusCode::NOT_FOUND => {
                Err(ExportError::SourceNotFound(reference.clone()))
            }
            reqwest::StatusCode::FORBIDDEN | reqwest::StatusCode::UNAUTHORIZED => {
                Err(ExportError::PermissionDenied(reference.clone()))
            }
            status => Err(ExportError::Network(format!(
                "unexpected status {status} fetching {reference}"
            ))),
        }
    }
}

// =============================================================================
// Local-File Backend
// =============================================================================

/// Resolves references as filesystem paths, optionally under a root.
/// Used by the CLI and by integration setups without object storage.
pub struct LocalStorageClient {
    root: Option<PathBuf>,
}

impl LocalStorageClient {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// All references resolve relative to `root`
    pub fn with_root(root: PathBuf) -> Self {
        Self { root: Some(root) }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(reference),
            None => PathBuf::from(reference),
        }
    }
}

impl Default for LocalStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageClient for LocalStorageClient {
    async fn fetch(&self, reference: &StorageRef) -> ExportResult<Vec<u8>> {
        let path = self.resolve(reference);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ExportError::SourceNotFound(path.display().to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(ExportError::PermissionDenied(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// In-Memory Backend
// =============================================================================

/// Serves fetches from a fixed map. Intended for tests and for
/// embedding the engine where bytes are already in hand.
#[derive(Default)]
pub struct MemoryStorageClient {
    entries: HashMap<StorageRef, Vec<u8>>,
}

impl MemoryStorageClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<StorageRef>, bytes: Vec<u8>) {
        self.entries.insert(reference.into(), bytes);
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    async fn fetch(&self, reference: &StorageRef) -> ExportResult<Vec<u8>> {
        self.entries
            .get(reference)
            .cloned()
            .ok_or_else(|| ExportError::SourceNotFound(reference.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_client_serves_inserted_bytes() {
        let mut storage = MemoryStorageClient::new();
        storage.insert("mix.wav", vec![1, 2, 3]);

        assert_eq!(
            storage.fetch(&"mix.wav".to_string()).await.unwrap(),
            vec![1, 2, 3]
        );
        assert!(matches!(
            storage.fetch(&"absent".to_string()).await,
            Err(ExportError::SourceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn local_client_maps_missing_file_to_source_not_found() {
        let storage = LocalStorageClient::new();
        let err = storage
            .fetch(&"/definitely/not/here.wav".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn local_client_resolves_relative_to_root() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("clip.webm"), b"opus bytes").unwrap();

        let storage = LocalStorageClient::with_root(dir.path().to_path_buf());
        let bytes = storage.fetch(&"clip.webm".to_string()).await.unwrap();
        assert_eq!(bytes, b"opus bytes");
    }
}

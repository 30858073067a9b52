//! Manifest storage collaborators.
//!
//! The recording pipeline writes the manifest under a fixed root; the gateway
//! only reads it, fresh on every request. [`ManifestStore`] is the seam
//! between the two. [`FsManifestStore`] reads from the local filesystem and
//! [`MemoryManifestStore`] keeps manifests in a [`DashMap`].
//!
//! # Object safety
//!
//! The trait uses `#[async_trait]` because the gateway holds it as
//! `Arc<dyn ManifestStore>`.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use dashmap::DashMap;
use tracing::debug;

use crate::error::StorageError;

/// Read access to manifests by logical path.
#[async_trait::async_trait]
pub trait ManifestStore: Send + Sync + fmt::Debug {
    /// Read the manifest stored at `logical_path` (e.g. `/hls/streamkey/index.m3u8`).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if nothing is stored there,
    /// [`StorageError::InvalidPath`] for paths outside the store, and
    /// [`StorageError::Io`] for any other read failure.
    async fn read_manifest(&self, logical_path: &str) -> Result<String, StorageError>;
}

/// Filesystem-rooted manifest store.
///
/// Logical path `/hls/streamkey/index.m3u8` resolves to
/// `<root>/hls/streamkey/index.m3u8`.
///
/// # Examples
///
/// ```
/// use streamgate_core::storage::FsManifestStore;
///
/// let store = FsManifestStore::new("/tmp");
/// assert_eq!(
///     store.resolve("/hls/streamkey/index.m3u8").unwrap(),
///     std::path::PathBuf::from("/tmp/hls/streamkey/index.m3u8"),
/// );
/// assert!(store.resolve("/hls/../../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FsManifestStore {
    root: PathBuf,
}

impl FsManifestStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a logical path onto the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] for empty paths and paths with
    /// `..` or other non-plain components.
    pub fn resolve(&self, logical_path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(logical_path.trim_start_matches('/'));
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.as_os_str().is_empty() || !plain {
            return Err(StorageError::InvalidPath(logical_path.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl ManifestStore for FsManifestStore {
    async fn read_manifest(&self, logical_path: &str) -> Result<String, StorageError> {
        let path = self.resolve(logical_path)?;
        debug!(logical_path, path = %path.display(), "Reading manifest");

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => StorageError::NotFound(logical_path.to_owned()),
                _ => StorageError::Io {
                    path: logical_path.to_owned(),
                    source,
                },
            })
    }
}

/// In-memory manifest store.
#[derive(Debug, Default)]
pub struct MemoryManifestStore {
    manifests: DashMap<String, String>,
}

impl MemoryManifestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `manifest` at `logical_path`, replacing any previous content.
    pub fn insert(&self, logical_path: impl Into<String>, manifest: impl Into<String>) {
        self.manifests.insert(logical_path.into(), manifest.into());
    }

    /// Remove the manifest at `logical_path`.
    pub fn remove(&self, logical_path: &str) -> Option<String> {
        self.manifests.remove(logical_path).map(|(_, v)| v)
    }
}

#[async_trait::async_trait]
impl ManifestStore for MemoryManifestStore {
    async fn read_manifest(&self, logical_path: &str) -> Result<String, StorageError> {
        self.manifests
            .get(logical_path)
            .map(|m| m.value().clone())
            .ok_or_else(|| StorageError::NotFound(logical_path.to_owned()))
    }
}

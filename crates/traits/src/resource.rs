//! Byte-level asset access.
//!
//! Image headers are read through this trait so the converter never opens
//! files itself. Native builds use `FilesystemResourceProvider` from
//! `weft-resource`; tests pre-populate an [`InMemoryResourceProvider`].

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset path escapes the asset root: {0}")]
    OutsideRoot(String),

    #[error("Failed to read asset '{path}': {message}")]
    LoadFailed { path: String, message: String },
}

/// Asset bytes shared between concurrent image loads.
pub type SharedResourceData = Arc<Vec<u8>>;

/// Snapshots report image sources as written in the page, so `./a.png` and
/// `a.png` name the same asset.
pub fn normalize_asset_path(path: &str) -> &str {
    let mut path = path.trim();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path
}

pub trait ResourceProvider: Send + Sync + Debug {
    /// Load an asset by the path a box reported (`src`, `url(...)`).
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    fn exists(&self, path: &str) -> bool;

    /// Provider name for log lines.
    fn name(&self) -> &'static str;
}

/// Assets held in memory, keyed by normalized path.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    assets: RwLock<BTreeMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut assets) = self.assets.write() {
            assets.insert(normalize_asset_path(path).to_string(), Arc::new(data.into()));
        }
        self
    }

    /// Registers `data` under `path`, replacing any previous asset.
    pub fn add(&self, path: &str, data: impl Into<Vec<u8>>) -> Result<(), ResourceError> {
        let mut assets = self.assets.write().map_err(|_| ResourceError::LoadFailed {
            path: path.to_string(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets.insert(normalize_asset_path(path).to_string(), Arc::new(data.into()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.assets.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let assets = self.assets.read().map_err(|_| ResourceError::LoadFailed {
            path: path.to_string(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets
            .get(normalize_asset_path(path))
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.assets
            .read()
            .is_ok_and(|a| a.contains_key(normalize_asset_path(path)))
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_prefix_names_same_asset() {
        let provider = InMemoryResourceProvider::new().with_asset("./img/logo.png", b"\x89PNG".to_vec());

        assert_eq!(&provider.load("img/logo.png").unwrap()[..], b"\x89PNG");
        assert!(provider.exists("././img/logo.png"));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_add_replaces_and_missing_is_not_found() {
        let provider = InMemoryResourceProvider::new();
        assert!(provider.is_empty());
        provider.add("a.png", b"one".to_vec()).unwrap();
        provider.add("a.png", b"two".to_vec()).unwrap();

        assert_eq!(&provider.load("a.png").unwrap()[..], b"two");
        assert_eq!(
            provider.load("b.png").unwrap_err(),
            ResourceError::NotFound("b.png".to_string())
        );
    }
}

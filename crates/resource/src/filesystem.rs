//! Filesystem-backed asset provider and output emitter.
//!
//! Both sides share one rule: a caller-supplied path is always relative to a
//! root directory and may never climb out of it (`..`, absolute paths, or a
//! symlink whose target resolves elsewhere).

use log::debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use weft_traits::{
    EmitError, FileEmitter, ResourceError, ResourceProvider, SharedResourceData, normalize_asset_path,
};

/// Returns the relative path unchanged if it stays inside its root.
fn confined(path: &str) -> Option<&Path> {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return None;
    }
    let escapes = candidate
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    (!escapes).then_some(candidate)
}

/// Loads assets relative to a base directory, typically the directory the
/// snapshot was captured from.
#[derive(Debug)]
pub struct FilesystemResourceProvider {
    base_path: PathBuf,
    canonical_base: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base_path = base_path.as_ref().to_path_buf();
        let canonical_base = base_path.canonicalize().ok();
        Self {
            base_path,
            canonical_base,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = confined(normalize_asset_path(path))?;
        let full = self.base_path.join(relative);
        match (full.canonicalize(), &self.canonical_base) {
            // Symlinks are only followed while they stay under the base.
            (Ok(canonical), Some(base)) => canonical.starts_with(base).then_some(canonical),
            _ => Some(full),
        }
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| ResourceError::OutsideRoot(path.to_string()))?;

        std::fs::read(&full_path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(path.to_string())
            } else {
                ResourceError::LoadFailed {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.exists())
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}

/// Writes emitted files below an output root, creating directories on demand.
#[derive(Debug)]
pub struct FilesystemEmitter {
    root: PathBuf,
}

impl FilesystemEmitter {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileEmitter for FilesystemEmitter {
    fn emit(&self, path: &str, filename: &str, content: &str) -> Result<(), EmitError> {
        let joined = format!("{}/{}", path.trim_end_matches('/'), filename);
        let dir = confined(path).ok_or_else(|| EmitError::UnsafePath(joined.clone()))?;
        let name = confined(filename)
            .filter(|f| f.components().count() == 1)
            .ok_or_else(|| EmitError::UnsafePath(joined.clone()))?;

        let target_dir = self.root.join(dir);
        let write_failed = |e: std::io::Error| EmitError::WriteFailed {
            path: joined.clone(),
            message: e.to_string(),
        };
        std::fs::create_dir_all(&target_dir).map_err(write_failed)?;
        let target = target_dir.join(name);
        std::fs::write(&target, content).map_err(write_failed)?;
        debug!("Wrote {} ({} bytes)", target.display(), content.len());
        Ok(())
    }
}

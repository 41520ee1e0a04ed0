//! Output persistence.
//!
//! The converter only produces `(path, filename, content)` triples. Writing
//! them anywhere is the emitter's job.

use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("Refusing to emit outside the output root: {0}")]
    UnsafePath(String),

    #[error("Failed to write '{path}': {message}")]
    WriteFailed { path: String, message: String },
}

/// One finished artifact: a layout document, a values table or a drawable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedFile {
    pub path: String,
    pub filename: String,
    pub content: String,
}

impl EmittedFile {
    pub fn new(path: impl Into<String>, filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// `path/filename`, or just the filename for an empty path.
    pub fn relative_path(&self) -> String {
        if self.path.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.path.trim_end_matches('/'), self.filename)
        }
    }
}

pub trait FileEmitter: Send + Sync {
    fn emit(&self, path: &str, filename: &str, content: &str) -> Result<(), EmitError>;

    fn emit_all<'a>(&self, files: impl IntoIterator<Item = &'a EmittedFile>) -> Result<usize, EmitError>
    where
        Self: Sized,
    {
        let mut count = 0;
        for file in files {
            self.emit(&file.path, &file.filename, &file.content)?;
            count += 1;
        }
        Ok(count)
    }
}

/// Collects emitted files in memory, in emission order.
#[derive(Debug, Default)]
pub struct InMemoryEmitter {
    files: Mutex<Vec<EmittedFile>>,
}

impl InMemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<EmittedFile> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn get(&self, path: &str, filename: &str) -> Option<String> {
        self.files.lock().ok()?.iter().find_map(|f| {
            (f.path == path && f.filename == filename).then(|| f.content.clone())
        })
    }
}

impl FileEmitter for InMemoryEmitter {
    fn emit(&self, path: &str, filename: &str, content: &str) -> Result<(), EmitError> {
        let mut files = self.files.lock().map_err(|_| EmitError::WriteFailed {
            path: format!("{}/{}", path, filename),
            message: "emitter lock poisoned".to_string(),
        })?;
        files.push(EmittedFile::new(path, filename, content));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_emitter_collects_in_order() {
        let emitter = InMemoryEmitter::new();
        emitter.emit("res/layout", "main.xml", "<a/>").unwrap();
        emitter.emit("res/values", "colors.xml", "<resources/>").unwrap();

        let files = emitter.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].relative_path(), "res/layout/main.xml");
        assert_eq!(emitter.get("res/values", "colors.xml").as_deref(), Some("<resources/>"));
        assert!(emitter.get("res/values", "strings.xml").is_none());
    }

    #[test]
    fn test_emit_all_counts() {
        let emitter = InMemoryEmitter::new();
        let files = vec![
            EmittedFile::new("", "a.xml", "a"),
            EmittedFile::new("x/", "b.xml", "b"),
        ];
        assert_eq!(emitter.emit_all(&files).unwrap(), 2);
        assert_eq!(files[0].relative_path(), "a.xml");
        assert_eq!(files[1].relative_path(), "x/b.xml");
    }
}

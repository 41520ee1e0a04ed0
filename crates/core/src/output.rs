use crate::diagnostics::Diagnostics;
use crate::error::PipelineError;
use weft_traits::{EmittedFile, FileEmitter};
use weft_types::NodeId;
use weft_values::ResourceTables;

/// One written layout document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutput {
    pub name: String,
    /// Resource-safe file name without extension.
    pub file_stem: String,
    pub root: NodeId,
    pub content: String,
}

/// Everything a run produced. Nothing is written anywhere until
/// [`ConversionOutput::files`] or [`ConversionOutput::emit`] is called.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub documents: Vec<DocumentOutput>,
    pub tables: ResourceTables,
    pub diagnostics: Diagnostics,
    pub(crate) layout_dir: String,
    pub(crate) values_dir: String,
    pub(crate) drawable_dir: String,
}

impl ConversionOutput {
    pub fn document(&self, name: &str) -> Option<&DocumentOutput> {
        self.documents.iter().find(|d| d.name == name)
    }

    /// `(path, filename, content)` triples: layouts first, then value
    /// tables, then shape drawables.
    pub fn files(&self) -> Result<Vec<EmittedFile>, PipelineError> {
        let mut files: Vec<EmittedFile> = self
            .documents
            .iter()
            .map(|d| EmittedFile::new(&self.layout_dir, format!("{}.xml", d.file_stem), &d.content))
            .collect();
        for (filename, content) in self.tables.value_files()? {
            files.push(EmittedFile::new(&self.values_dir, filename, content));
        }
        for (filename, content) in self.tables.drawable_files()? {
            files.push(EmittedFile::new(&self.drawable_dir, filename, content));
        }
        Ok(files)
    }

    pub fn emit(&self, emitter: &dyn FileEmitter) -> Result<usize, PipelineError> {
        let files = self.files()?;
        for file in &files {
            emitter.emit(&file.path, &file.filename, &file.content)?;
        }
        Ok(files.len())
    }
}

/// Layout file names may only hold lowercase letters, digits and `_`.
pub(crate) fn file_stem(name: &str, root: NodeId) -> String {
    let stem = slug::slugify(name).replace('-', "_");
    if stem.is_empty() {
        format!("layout_{}", root.raw())
    } else if stem.starts_with(|c: char| c.is_ascii_digit()) {
        format!("layout_{}", stem)
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_traits::InMemoryEmitter;
    use weft_values::ValueStore;
    use weft_types::Color;

    fn output() -> ConversionOutput {
        let mut store = ValueStore::default();
        store.string("Sign in");
        store.color(Color::rgb(0, 0, 255));
        ConversionOutput {
            documents: vec![DocumentOutput {
                name: "Login Screen".into(),
                file_stem: file_stem("Login Screen", NodeId::new(0)),
                root: NodeId::new(0),
                content: "<FrameLayout />\n".into(),
            }],
            tables: ResourceTables::collect(&store, &[]),
            diagnostics: Diagnostics::new(),
            layout_dir: "res/layout".into(),
            values_dir: "res/values".into(),
            drawable_dir: "res/drawable".into(),
        }
    }

    #[test]
    fn test_file_stems_are_resource_safe() {
        assert_eq!(file_stem("Login Screen", NodeId::new(0)), "login_screen");
        assert_eq!(file_stem("404", NodeId::new(0)), "layout_404");
        assert_eq!(file_stem("***", NodeId::new(9)), "layout_9");
    }

    #[test]
    fn test_files_are_grouped_by_directory() {
        let files = output().files().unwrap();
        let paths: Vec<String> = files.iter().map(|f| f.relative_path()).collect();
        assert_eq!(
            paths,
            vec![
                "res/layout/login_screen.xml",
                "res/values/strings.xml",
                "res/values/colors.xml",
            ]
        );
    }

    #[test]
    fn test_emit_writes_every_file() {
        let emitter = InMemoryEmitter::new();
        let count = output().emit(&emitter).unwrap();
        assert_eq!(count, 3);
        assert!(emitter.get("res/layout", "login_screen.xml").is_some());
    }
}

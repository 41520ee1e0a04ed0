//! Box-model snapshots.
//!
//! A snapshot is the JSON dump a headless browser produces after layout:
//! one nested element tree per document, each element carrying its border
//! box, edge rings and computed style. [`SnapshotProvider`] serves such a
//! dump through the [`BoxModelProvider`] seam.
//!
//! ```ignore
//! let provider = SnapshotProvider::from_json_str(r#"{
//!   "documents": [{ "name": "main", "root": { "tag": "body",
//!       "bounds": { "x": 0, "y": 0, "width": 360, "height": 640 } } }]
//! }"#)?;
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use thiserror::Error;
use weft_traits::{BoxMeasure, BoxModelProvider, DocumentRoot, ProviderError};
use weft_types::{Edges, ElementHandle, Rect};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error reading snapshot: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub documents: Vec<SnapshotDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub name: String,
    #[serde(default)]
    pub root: Option<SnapshotElement>,
}

/// One element as dumped. A missing `bounds` means the browser could not
/// measure it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotElement {
    pub tag: String,
    pub bounds: Option<Rect>,
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
    pub style: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub image_src: Option<String>,
    pub children: Vec<SnapshotElement>,
}

#[derive(Debug)]
struct Entry {
    measure: Option<BoxMeasure>,
    children: Vec<ElementHandle>,
}

/// Serves a parsed snapshot. Handles are assigned depth-first, starting at 0
/// for the first document's root.
#[derive(Debug, Default)]
pub struct SnapshotProvider {
    documents: Vec<DocumentRoot>,
    entries: Vec<Entry>,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        let mut provider = Self::default();
        for document in snapshot.documents {
            let root = document.root.map(|root| provider.flatten(root));
            provider.documents.push(DocumentRoot {
                name: document.name,
                root,
            });
        }
        debug!(
            "Snapshot holds {} document(s), {} element(s)",
            provider.documents.len(),
            provider.entries.len()
        );
        provider
    }

    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(Self::new(serde_json::from_reader(reader)?))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        Ok(Self::new(serde_json::from_value(value)?))
    }

    pub fn element_count(&self) -> usize {
        self.entries.len()
    }

    fn flatten(&mut self, element: SnapshotElement) -> ElementHandle {
        let handle = ElementHandle::new(self.entries.len() as u64);
        let SnapshotElement {
            tag,
            bounds,
            margin,
            border,
            padding,
            style,
            attributes,
            text,
            image_src,
            children,
        } = element;
        let measure = bounds.map(|bounds| BoxMeasure {
            tag,
            bounds,
            margin,
            border,
            padding,
            style,
            attributes,
            text_content: text,
            image_src,
        });
        self.entries.push(Entry {
            measure,
            children: Vec::with_capacity(children.len()),
        });
        let child_handles: Vec<ElementHandle> =
            children.into_iter().map(|c| self.flatten(c)).collect();
        self.entries[handle.raw() as usize].children = child_handles;
        handle
    }
}

impl BoxModelProvider for SnapshotProvider {
    fn documents(&self) -> Vec<DocumentRoot> {
        self.documents.clone()
    }

    fn measure(&self, element: ElementHandle) -> Result<BoxMeasure, ProviderError> {
        let entry = self
            .entries
            .get(element.raw() as usize)
            .ok_or(ProviderError::UnknownElement(element))?;
        entry.measure.clone().ok_or_else(|| ProviderError::Unmeasurable {
            element,
            reason: "no bounds in snapshot".to_string(),
        })
    }

    fn children(&self, element: ElementHandle) -> Vec<ElementHandle> {
        self.entries
            .get(element.raw() as usize)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SnapshotProvider {
        SnapshotProvider::from_value(json!({
            "documents": [
                {
                    "name": "main",
                    "root": {
                        "tag": "body",
                        "bounds": { "x": 0, "y": 0, "width": 360, "height": 200 },
                        "style": { "display": "block" },
                        "children": [
                            { "tag": "p", "bounds": { "x": 0, "y": 0, "width": 360, "height": 20 },
                              "children": [ { "tag": "#text", "text": "Hello",
                                              "bounds": { "x": 0, "y": 0, "width": 40, "height": 20 } } ] },
                            { "tag": "div" }
                        ]
                    }
                },
                { "name": "empty" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_documents_and_handles() {
        let provider = sample();
        let docs = provider.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].root, Some(ElementHandle::new(0)));
        assert_eq!(docs[1].root, None);
        assert_eq!(provider.element_count(), 4);

        let children = provider.children(ElementHandle::new(0));
        assert_eq!(children, vec![ElementHandle::new(1), ElementHandle::new(3)]);
        assert_eq!(provider.children(ElementHandle::new(1)), vec![ElementHandle::new(2)]);
    }

    #[test]
    fn test_measure_carries_style_and_text() {
        let provider = sample();
        let body = provider.measure(ElementHandle::new(0)).unwrap();
        assert_eq!(body.tag, "body");
        assert_eq!(body.style.get("display").map(String::as_str), Some("block"));

        let text = provider.measure(ElementHandle::new(2)).unwrap();
        assert_eq!(text.text_content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_unmeasurable_and_unknown_elements() {
        let provider = sample();
        assert!(matches!(
            provider.measure(ElementHandle::new(3)),
            Err(ProviderError::Unmeasurable { .. })
        ));
        assert_eq!(
            provider.measure(ElementHandle::new(99)),
            Err(ProviderError::UnknownElement(ElementHandle::new(99)))
        );
        assert!(provider.children(ElementHandle::new(99)).is_empty());
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(matches!(
            SnapshotProvider::from_json_str("{ \"documents\": 3 }"),
            Err(SnapshotError::Json(_))
        ));
    }
}

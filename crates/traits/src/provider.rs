//! The box-model provider seam.
//!
//! A provider reads live geometry and computed style out of a rendered
//! document. The converter only consumes it: every element is measured once
//! during ingestion and never again within the same run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use weft_types::{Edges, ElementHandle, Rect};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Element {0} is unknown to the provider")]
    UnknownElement(ElementHandle),

    #[error("Element {element} could not be measured: {reason}")]
    Unmeasurable {
        element: ElementHandle,
        reason: String,
    },

    #[error("Provider failure: {0}")]
    Other(String),
}

/// One document the provider can convert: an output name and its root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRoot {
    pub name: String,
    /// `None` when the document has no convertible root element.
    pub root: Option<ElementHandle>,
}

/// Everything the converter learns about one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxMeasure {
    pub tag: String,
    /// Border box in document pixels.
    pub bounds: Rect,
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
    /// Computed style, property name to resolved value.
    pub style: BTreeMap<String, String>,
    /// Source attributes (`id`, `for`, `type`, `value`...).
    pub attributes: BTreeMap<String, String>,
    /// Present for text runs and for elements whose only content is text.
    pub text_content: Option<String>,
    pub image_src: Option<String>,
}

impl BoxMeasure {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

pub trait BoxModelProvider: Send + Sync {
    fn documents(&self) -> Vec<DocumentRoot>;

    fn measure(&self, element: ElementHandle) -> Result<BoxMeasure, ProviderError>;

    /// Child elements in source order, text runs included.
    fn children(&self, element: ElementHandle) -> Vec<ElementHandle>;
}

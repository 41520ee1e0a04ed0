//! Node arena, box-tree ingestion and the layout classifier.
//!
//! A measured box tree is ingested into a [`NodeTree`], then the
//! [`Classifier`] walks it bottom-up and decides, for every run of siblings,
//! which native container holds them.

use thiserror::Error;
use weft_traits::ProviderError;
use weft_types::ElementHandle;

pub mod classify;
pub mod config;
pub mod decision;
pub mod flags;
pub mod ingest;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_utils;

pub use classify::{Classifier, ClassifyOutcome};
pub use config::LayoutConfig;
pub use decision::{GridShape, LayoutDecision};
pub use flags::{ContainerType, LayoutFlags};
pub use ingest::{IngestReport, Ingestor};
pub use tree::{AttributeSet, Node, NodeKind, NodeTree, TreeError};

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Document root {0} could not be measured: {1}")]
    RootUnmeasurable(ElementHandle, ProviderError),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

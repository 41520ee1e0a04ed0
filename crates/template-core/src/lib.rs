//! Template assembly for the weft layout compiler.
//!
//! Classified nodes become [`Fragment`]s whose members are [`Placeholder`]
//! slots. The [`Assembler`] binds slots level by level, queues the ones
//! whose owner is not placed yet, and finally expands each document root
//! into a flat piece list that [`write_document`] turns into view XML.

use thiserror::Error;
use weft_layout::TreeError;
use weft_types::NodeId;

pub mod assembler;
pub mod dialect;
pub mod placeholder;
pub mod writer;

pub use assembler::{Assembler, Resolution};
pub use dialect::ViewDialect;
pub use placeholder::{Fragment, Piece, Placeholder};
pub use writer::write_document;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Node {node} renders under {parent} but is not among its render children")]
    NotARenderChild { node: NodeId, parent: NodeId },

    #[error("Reorder of {owner} rejected: {} member(s) have no fragment yet", missing.len())]
    PartialReorder { owner: NodeId, missing: Vec<NodeId> },
}

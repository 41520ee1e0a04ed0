//! The pipeline's error type.
//!
//! Almost everything a conversion runs into is recoverable and ends up in
//! [`Diagnostics`](crate::Diagnostics). What remains here either aborts the
//! whole run or comes from configuration and output handling.

use thiserror::Error;
use weft_layout::{LayoutError, TreeError};
use weft_template::TemplateError;
use weft_traits::{EmitError, ProviderError};
use weft_values::ValueError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No document had a convertible root element")]
    NoRoot,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Resource value error: {0}")]
    Value(#[from] ValueError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),
}

impl From<TreeError> for PipelineError {
    fn from(e: TreeError) -> Self {
        PipelineError::Layout(LayoutError::Tree(e))
    }
}

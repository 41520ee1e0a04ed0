//! Pipeline integration for the weft layout compiler.
//!
//! [`Converter`] drives a run end to end: it ingests every document a
//! [`BoxModelProvider`](weft_traits::BoxModelProvider) offers, waits once for
//! image sizes, classifies, assembles, deduplicates and resolves, and hands
//! back a [`ConversionOutput`] with the finished documents, the resource
//! tables and the diagnostics collected on the way.

pub mod android;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod hooks;
mod images;
pub mod output;
pub mod pipeline;

pub use android::AndroidDialect;
pub use config::ConversionConfig;
pub use context::{CancelFlag, ConversionContext, DocumentEntry};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::PipelineError;
pub use hooks::{Extension, HookAction, HookPoint, HookRegistry};
pub use output::{ConversionOutput, DocumentOutput};
pub use pipeline::{Converter, ConverterBuilder};

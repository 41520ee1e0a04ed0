//! weft: a layout compiler.
//!
//! Takes a measured, styled box tree (usually a headless browser dump) and
//! produces native view hierarchy documents plus deduplicated resource
//! tables. The work happens in the member crates; this crate re-exports
//! them under one roof and ships the `weft` binary.
//!
//! ```ignore
//! use weft::{Converter, SnapshotProvider};
//!
//! let provider = SnapshotProvider::from_json_str(&json)?;
//! let output = Converter::builder().build()?.convert_blocking(&provider)?;
//! for file in output.files()? {
//!     println!("{}", file.relative_path());
//! }
//! ```

pub use weft_core::{
    AndroidDialect, CancelFlag, ConversionConfig, ConversionContext, ConversionOutput, Converter,
    ConverterBuilder, Diagnostic, DiagnosticKind, Diagnostics, DocumentEntry, DocumentOutput,
    Extension, HookAction, HookPoint, PipelineError, Severity,
};
pub use weft_layout::{
    Classifier, ClassifyOutcome, ContainerType, GridShape, LayoutConfig, LayoutDecision,
    LayoutFlags, Node, NodeKind, NodeTree,
};
pub use weft_resource::{FilesystemEmitter, FilesystemResourceProvider, ResourceImageLoader};
pub use weft_source::{Snapshot, SnapshotError, SnapshotProvider};
pub use weft_template::{Assembler, ViewDialect};
pub use weft_traits::{
    BoxMeasure, BoxModelProvider, DocumentRoot, EmittedFile, FileEmitter, ImageLoader,
    InMemoryEmitter,
};
pub use weft_types::{Color, Edges, ElementHandle, NodeId, Rect, ResourceName, Size};
pub use weft_values::{
    DedupConfig, Deduplicator, Palette, ResourceTables, StyleEntry, ValueConfig, ValueStore,
};

/// Lower-level access to the member crates.
pub mod crates {
    pub use weft_core as core;
    pub use weft_layout as layout;
    pub use weft_style as style;
    pub use weft_template as template;
    pub use weft_values as values;
}

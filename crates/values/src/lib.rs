//! Named resources for the weft layout compiler.
//!
//! The [`ValueStore`] interns literal values (strings, colors, fonts,
//! dimensions, drawables) to stable names for one conversion run. The
//! [`Deduplicator`] factors repeated attribute sets into inheritable styles,
//! and [`ResourceTables`] serialises everything as sorted resource XML.

use thiserror::Error;

pub mod dedup;
pub mod drawable;
pub mod palette;
pub mod store;
pub mod tables;
mod xml;

pub use dedup::{DedupConfig, DedupMember, DedupResult, Deduplicator, StyleEntry};
pub use drawable::{Drawable, Stroke};
pub use palette::Palette;
pub use store::{DimenUnit, ValueConfig, ValueStore, format_number};
pub use tables::ResourceTables;

#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Failed to write resource XML: {0}")]
    Xml(String),

    #[error("Invalid palette entry '{name}': {reason}")]
    InvalidPalette { name: String, reason: String },
}

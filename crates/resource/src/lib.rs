//! Native platform implementations for weft.
//!
//! - [`FilesystemResourceProvider`]: asset bytes from a base directory
//! - [`FilesystemEmitter`]: writes emitted files below an output root
//! - [`ResourceImageLoader`]: intrinsic image sizes from any resource provider

mod filesystem;
mod images;

pub use filesystem::{FilesystemEmitter, FilesystemResourceProvider};
pub use images::ResourceImageLoader;

pub use weft_traits::InMemoryResourceProvider;

//! Platform abstraction traits for weft.
//!
//! The converter core talks to the outside world only through these seams:
//! box-model providers feed it, image loaders size images, resource providers
//! supply asset bytes and file emitters persist what it produces.

pub mod emitter;
pub mod images;
pub mod provider;
pub mod resource;

pub use emitter::{EmitError, EmittedFile, FileEmitter, InMemoryEmitter};
pub use images::{ImageError, ImageLoader, NoImages};
pub use provider::{BoxMeasure, BoxModelProvider, DocumentRoot, ProviderError};
pub use resource::{
    InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData, normalize_asset_path,
};

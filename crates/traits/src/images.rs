use futures::future::BoxFuture;
use thiserror::Error;
use weft_types::Size;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    #[error("Image '{0}' could not be loaded: {1}")]
    Load(String, String),

    #[error("Image '{0}' has an unsupported or corrupt header: {1}")]
    Decode(String, String),
}

/// Resolves the intrinsic pixel size of an image reference.
///
/// Loads are independent of each other; the converter fans them out and
/// waits for all of them once, before classification starts.
pub trait ImageLoader: Send + Sync {
    fn intrinsic_size<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Size, ImageError>>;
}

/// A loader that knows no images. Every lookup fails, so every image keeps
/// its measured box size.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageLoader for NoImages {
    fn intrinsic_size<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Size, ImageError>> {
        Box::pin(async move {
            Err(ImageError::Load(
                src.to_string(),
                "no image loader configured".to_string(),
            ))
        })
    }
}

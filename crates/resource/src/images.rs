use futures::future::BoxFuture;
use log::debug;
use std::io::Cursor;
use std::sync::Arc;
use weft_traits::{ImageError, ImageLoader, ResourceProvider};
use weft_types::Size;

/// Sizes images by reading their bytes through a [`ResourceProvider`] and
/// decoding only the header.
#[derive(Debug, Clone)]
pub struct ResourceImageLoader<P: ResourceProvider> {
    provider: Arc<P>,
}

impl<P: ResourceProvider> ResourceImageLoader<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    fn read_size(&self, src: &str) -> Result<Size, ImageError> {
        let bytes = self
            .provider
            .load(src)
            .map_err(|e| ImageError::Load(src.to_string(), e.to_string()))?;
        let (width, height) = image::ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(src.to_string(), e.to_string()))?
            .into_dimensions()
            .map_err(|e| ImageError::Decode(src.to_string(), e.to_string()))?;
        debug!(
            "Image '{}' via {} is {}x{}",
            src,
            self.provider.name(),
            width,
            height
        );
        Ok(Size::new(width as f32, height as f32))
    }
}

impl<P: ResourceProvider> ImageLoader for ResourceImageLoader<P> {
    fn intrinsic_size<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Size, ImageError>> {
        Box::pin(async move { self.read_size(src) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_traits::InMemoryResourceProvider;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::RgbImage::new(width, height)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_reads_png_dimensions() {
        let provider = Arc::new(InMemoryResourceProvider::new());
        provider.add("logo.png", png_bytes(48, 20)).unwrap();
        let loader = ResourceImageLoader::new(provider);

        let size = futures::executor::block_on(loader.intrinsic_size("logo.png")).unwrap();
        assert_eq!(size, Size::new(48.0, 20.0));
    }

    #[test]
    fn test_missing_and_corrupt_images() {
        let provider = Arc::new(InMemoryResourceProvider::new());
        provider.add("broken.png", b"not an image".to_vec()).unwrap();
        let loader = ResourceImageLoader::new(provider);

        let missing = futures::executor::block_on(loader.intrinsic_size("gone.png"));
        assert!(matches!(missing, Err(ImageError::Load(_, _))));
        let corrupt = futures::executor::block_on(loader.intrinsic_size("broken.png"));
        assert!(matches!(corrupt, Err(ImageError::Decode(_, _))));
    }
}

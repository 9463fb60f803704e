//! Still-image encoding.
//!
//! [`ImageEncoder`] turns a decoded frame into the bytes of an image file.
//! [`StandardEncoder`] is the default implementation, backed by the `image`
//! crate: PNG is lossless, JPEG uses the encoder's default quality.

use std::io::Cursor;

use image::{DynamicImage, codecs::jpeg::JpegEncoder, codecs::png::PngEncoder};

use crate::{error::ThumbnailError, format::ImageFormat};

/// Something that can encode a raster image into a file format.
pub trait ImageEncoder {
    /// Encode `image` as `format`.
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::EncodeFailed`] if the image cannot be encoded.
    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ThumbnailError>;
}

/// [`ImageEncoder`] backed by the `image` crate.
///
/// # Example
///
/// ```
/// use image::DynamicImage;
/// use vtg::{ImageEncoder, ImageFormat, StandardEncoder};
///
/// let frame = DynamicImage::new_rgb8(16, 9);
/// let bytes = StandardEncoder.encode(&frame, ImageFormat::Png)?;
/// assert!(bytes.starts_with(b"\x89PNG"));
/// # Ok::<(), vtg::ThumbnailError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEncoder;

impl ImageEncoder for StandardEncoder {
    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ThumbnailError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ThumbnailError::EncodeFailed(format!(
                "Cannot encode an empty {}x{} image",
                image.width(),
                image.height()
            )));
        }

        let mut bytes = Cursor::new(Vec::new());
        match format {
            ImageFormat::Png => image.write_with_encoder(PngEncoder::new(&mut bytes))?,
            ImageFormat::Jpeg => {
                // JPEG carries no alpha channel.
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new(&mut bytes))?;
            }
        }

        let bytes = bytes.into_inner();
        log::debug!(
            "Encoded {}x{} frame as {format} ({} bytes)",
            image.width(),
            image.height(),
            bytes.len()
        );
        Ok(bytes)
    }
}

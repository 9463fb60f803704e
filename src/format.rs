//! Output image formats.
//!
//! [`ImageFormat`] is the closed set of raster encodings a thumbnail can be
//! written in. Both the `jpg` and `jpeg` spellings select the JPEG encoder;
//! the canonical extension written for auto-derived paths is always `jpg`.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::ThumbnailError;

/// Image encoding of a generated thumbnail.
///
/// # Example
///
/// ```
/// use vtg::ImageFormat;
///
/// let format = ImageFormat::from_token(".jpeg").unwrap();
/// assert_eq!(format, ImageFormat::Jpeg);
/// assert_eq!(format.extension(), "jpg");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Lossless PNG. This is the default.
    #[default]
    Png,
    /// Baseline JPEG at the encoder's default quality.
    Jpeg,
}

impl ImageFormat {
    /// Every accepted spelling of a format token or file extension.
    pub const SUPPORTED_EXTENSIONS: [&'static str; 3] = ["png", "jpg", "jpeg"];

    /// Parse a user-supplied format token.
    ///
    /// A single leading `.` is stripped before matching. Matching is
    /// case-sensitive against `png`, `jpg` and `jpeg`.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::InvalidFormatToken`] carrying the original
    /// token when it names no known format.
    pub fn from_token(token: &str) -> Result<Self, ThumbnailError> {
        let normalized = token.strip_prefix('.').unwrap_or(token);
        Self::from_extension(normalized)
            .ok_or_else(|| ThumbnailError::InvalidFormatToken(token.to_string()))
    }

    /// Match a bare file extension (no dot) against the accepted spellings.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Canonical file extension, used when the output path is auto-derived.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// The `image` crate encoder this format maps to.
    pub fn encoder_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ThumbnailError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::from_token(token)
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

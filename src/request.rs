//! Thumbnail requests.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::format::ImageFormat;

/// A single, already-validated thumbnail request.
///
/// Built once from user input and consumed by the extractor and the output
/// resolver. Builder methods take `self` by value, so a request cannot be
/// changed once handed over.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use vtg::{ImageFormat, ThumbnailRequest};
///
/// let request = ThumbnailRequest::new("clip.mp4")
///     .with_timestamp(Duration::from_secs_f64(2.5))
///     .with_format(ImageFormat::Jpeg);
/// assert_eq!(request.format_override(), Some(ImageFormat::Jpeg));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ThumbnailRequest {
    input: PathBuf,
    timestamp: Option<Duration>,
    format_override: Option<ImageFormat>,
    output: Option<PathBuf>,
}

impl ThumbnailRequest {
    /// Create a request for the middle frame of `input`, written next to it
    /// as PNG.
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            timestamp: None,
            format_override: None,
            output: None,
        }
    }

    /// Extract the frame at `timestamp` instead of the middle of the video.
    pub fn with_timestamp(mut self, timestamp: Duration) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Override the output format. Ignored when an explicit output path is
    /// given, since its extension takes precedence.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format_override = Some(format);
        self
    }

    /// Write to `output` instead of a path derived from the input.
    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Path of the input video.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Requested timestamp, if any.
    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    /// Explicit format override, if any.
    pub fn format_override(&self) -> Option<ImageFormat> {
        self.format_override
    }

    /// Explicit output path, if any.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

//! Error types for the `vtg` crate.
//!
//! [`ThumbnailError`] is the single error type returned by every fallible
//! operation. Variants fall into three classes: validation errors (bad format
//! token, bad output extension), media errors (unreadable file, decode or
//! encode failure), and write errors.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

use crate::format::ImageFormat;

/// The unified error type for all `vtg` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ThumbnailError {
    /// An explicit output path has a missing or unsupported extension.
    #[error(
        "{} for output path {}. Supported extensions are: {}.",
        describe_extension(.extension),
        .path.display(),
        ImageFormat::SUPPORTED_EXTENSIONS.join(", ")
    )]
    UnsupportedExtension {
        /// The output path that was rejected.
        path: PathBuf,
        /// The offending extension, `None` if the path had none.
        extension: Option<String>,
    },

    /// A format token did not name a known image format.
    #[error(
        "'{0}' is not a supported format. Supported formats are {formats}.",
        formats = quoted_formats()
    )]
    InvalidFormatToken(String),

    /// The input could not be opened as media or has no usable video duration.
    #[error("Failed to open media file at {path}: {reason}")]
    UnreadableMedia {
        /// Path of the input file.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The requested frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    DecodeFailed(String),

    /// The decoded frame could not be encoded to the target image format.
    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    /// The encoded image could not be written to its destination.
    #[error("Failed to write image to {path}: {source}")]
    WriteFailed {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: IoError,
    },
}

impl ThumbnailError {
    /// Returns `true` for errors raised while validating user input, before
    /// any media I/O happened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ThumbnailError::UnsupportedExtension { .. } | ThumbnailError::InvalidFormatToken(_)
        )
    }

    /// Returns `true` for errors raised while reading, decoding, or encoding
    /// the frame.
    pub fn is_media_failure(&self) -> bool {
        matches!(
            self,
            ThumbnailError::UnreadableMedia { .. }
                | ThumbnailError::DecodeFailed(_)
                | ThumbnailError::EncodeFailed(_)
        )
    }
}

fn describe_extension(extension: &Option<String>) -> String {
    match extension {
        Some(extension) => format!("'{extension}' is not a supported extension"),
        None => format!(
            "Output path must include a file extension (e.g. .{} or .{})",
            ImageFormat::Png.extension(),
            ImageFormat::Jpeg.extension()
        ),
    }
}

fn quoted_formats() -> String {
    let quoted: Vec<String> = ImageFormat::SUPPORTED_EXTENSIONS
        .iter()
        .map(|extension| format!("'{extension}'"))
        .collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, and {last}", rest.join(", ")),
        _ => quoted.concat(),
    }
}

impl From<FfmpegError> for ThumbnailError {
    fn from(error: FfmpegError) -> Self {
        ThumbnailError::DecodeFailed(error.to_string())
    }
}

impl From<ImageError> for ThumbnailError {
    fn from(error: ImageError) -> Self {
        ThumbnailError::EncodeFailed(error.to_string())
    }
}

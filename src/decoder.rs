//! Media decoding capability.
//!
//! [`MediaDecoder`] is the seam between the frame extractor and whatever
//! demuxes and decodes the video. The crate ships an FFmpeg implementation,
//! [`FfmpegDecoder`](crate::FfmpegDecoder); tests substitute their own.

use std::{path::Path, time::Duration};

use image::DynamicImage;

use crate::{configuration::SeekTolerance, error::ThumbnailError};

/// A decoded still frame.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// The upright raster image.
    pub image: DynamicImage,
    /// Presentation time of the decoded frame, relative to the start of the
    /// video stream.
    pub timestamp: Duration,
}

impl DecodedFrame {
    /// Width of the frame in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the frame in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Something that can open a video and decode a frame at a given time.
pub trait MediaDecoder {
    /// An opened media container.
    type Media;

    /// Open `path` as a media container with a video stream.
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::UnreadableMedia`] if the file cannot be opened or
    /// holds no video.
    fn open(&self, path: &Path) -> Result<Self::Media, ThumbnailError>;

    /// Total duration of the media.
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::UnreadableMedia`] if no usable duration is known.
    fn duration(&self, media: &Self::Media) -> Result<Duration, ThumbnailError>;

    /// Decode the frame nearest `timestamp` within `tolerance`.
    ///
    /// Timestamps beyond the end of the video are not rejected; the backend
    /// decides which frame to return (the FFmpeg backend returns the last).
    ///
    /// # Errors
    ///
    /// [`ThumbnailError::DecodeFailed`] if no frame can be produced.
    fn frame_at(
        &self,
        media: &mut Self::Media,
        timestamp: Duration,
        tolerance: SeekTolerance,
    ) -> Result<DecodedFrame, ThumbnailError>;
}

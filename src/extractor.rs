//! Frame extraction.
//!
//! [`FrameExtractor`] turns "a video and maybe a timestamp" into one decoded
//! frame: it opens the input, picks the target time (the requested one, or
//! the middle of the video), and asks the decoder for the frame there.

use std::{path::Path, time::Duration};

use crate::{
    configuration::ExtractOptions,
    decoder::{DecodedFrame, MediaDecoder},
    error::ThumbnailError,
    ffmpeg::FfmpegDecoder,
};

/// Extracts a single frame from a video through a [`MediaDecoder`].
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use vtg::FrameExtractor;
///
/// let extractor = FrameExtractor::new();
/// let frame = extractor.extract_frame(Path::new("clip.mp4"), None)?;
/// println!("{}x{} at {:?}", frame.width(), frame.height(), frame.timestamp);
/// # Ok::<(), vtg::ThumbnailError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrameExtractor<D = FfmpegDecoder> {
    decoder: D,
    options: ExtractOptions,
}

impl FrameExtractor<FfmpegDecoder> {
    /// Create an extractor backed by FFmpeg with default options.
    pub fn new() -> Self {
        Self::with_decoder(FfmpegDecoder::default())
    }
}

impl Default for FrameExtractor<FfmpegDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: MediaDecoder> FrameExtractor<D> {
    /// Create an extractor around a custom decoder with default options.
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            options: ExtractOptions::default(),
        }
    }

    /// Replace the extraction options.
    #[must_use]
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// The decoder this extractor drives.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Decode the frame at `timestamp`, or at the middle of the video when
    /// `timestamp` is `None`.
    ///
    /// The timestamp is passed through without clamping.
    ///
    /// # Errors
    ///
    /// - [`ThumbnailError::UnreadableMedia`] if the input cannot be opened or
    ///   has no usable duration.
    /// - [`ThumbnailError::DecodeFailed`] if the frame cannot be decoded.
    pub fn extract_frame(
        &self,
        input: &Path,
        timestamp: Option<Duration>,
    ) -> Result<DecodedFrame, ThumbnailError> {
        let mut media = self.decoder.open(input)?;
        let duration = self.decoder.duration(&media)?;
        let target = timestamp.unwrap_or(duration / 2);

        log::debug!(
            "Extracting frame from {} at {:.3}s (duration={:.3}s, tolerance={:?})",
            input.display(),
            target.as_secs_f64(),
            duration.as_secs_f64(),
            self.options.tolerance,
        );

        self.decoder
            .frame_at(&mut media, target, self.options.tolerance)
    }
}

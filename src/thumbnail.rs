//! Thumbnail generation.
//!
//! [`Thumbnailer`] composes the pieces into the whole operation: validate the
//! requested format, decode the frame, resolve where it goes, encode it, and
//! write it atomically.

use crate::{
    configuration::ExtractOptions,
    decoder::MediaDecoder,
    encoder::{ImageEncoder, StandardEncoder},
    error::ThumbnailError,
    extractor::FrameExtractor,
    ffmpeg::FfmpegDecoder,
    output::{self, ResolvedOutput},
    request::ThumbnailRequest,
    writer,
};

/// Generates a single thumbnail per request.
///
/// # Example
///
/// ```no_run
/// use vtg::{ThumbnailRequest, Thumbnailer};
///
/// let thumbnailer = Thumbnailer::new();
/// let output = thumbnailer.generate(&ThumbnailRequest::new("clip.mp4"))?;
/// println!("output: {}", output.path.display());
/// # Ok::<(), vtg::ThumbnailError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Thumbnailer<D = FfmpegDecoder, E = StandardEncoder> {
    extractor: FrameExtractor<D>,
    encoder: E,
}

impl Thumbnailer<FfmpegDecoder, StandardEncoder> {
    /// Create a thumbnailer with the FFmpeg decoder and the standard encoder.
    pub fn new() -> Self {
        Self::with_backends(FfmpegDecoder::default(), StandardEncoder)
    }
}

impl Default for Thumbnailer<FfmpegDecoder, StandardEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: MediaDecoder, E: ImageEncoder> Thumbnailer<D, E> {
    /// Create a thumbnailer around custom decode and encode backends.
    pub fn with_backends(decoder: D, encoder: E) -> Self {
        Self {
            extractor: FrameExtractor::with_decoder(decoder),
            encoder,
        }
    }

    /// Replace the extraction options.
    #[must_use]
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.extractor = self.extractor.with_options(options);
        self
    }

    /// Generate the thumbnail described by `request`.
    ///
    /// Format validation happens before the input is touched. The output path
    /// is resolved after decoding, right before the write, so the collision
    /// check sees the filesystem as late as possible.
    ///
    /// # Errors
    ///
    /// Any [`ThumbnailError`]. On error no file is created at the output path.
    pub fn generate(&self, request: &ThumbnailRequest) -> Result<ResolvedOutput, ThumbnailError> {
        output::resolve_format(request.output(), request.format_override())?;

        let frame = self
            .extractor
            .extract_frame(request.input(), request.timestamp())?;

        let resolved = output::resolve(request.input(), request.output(), request.format_override())?;
        let bytes = self.encoder.encode(&frame.image, resolved.format)?;
        writer::write_atomic(&resolved, &bytes)?;

        log::info!(
            "Generated {} thumbnail of {} at {:.3}s: {}",
            resolved.format,
            request.input().display(),
            frame.timestamp.as_secs_f64(),
            resolved.path.display(),
        );
        Ok(resolved)
    }
}

//! FFmpeg decoding backend.
//!
//! [`FfmpegDecoder`] implements [`MediaDecoder`] on top of
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next). Frames are located
//! by seeking to the keyframe at or before the target and decoding forward,
//! so the returned frame is the one nearest the requested time rather than
//! whichever keyframe the seek happened to land on.
//!
//! FFmpeg keeps its own console logging, separate from the Rust
//! [`log`](https://crates.io/crates/log) facade. It defaults to
//! [`FfmpegLogLevel::Error`] here; use [`set_ffmpeg_log_level`] to change it.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input, stream::Stream},
    frame::{Video as VideoFrame, side_data::Type as FrameSideDataType},
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::log::Level,
};
#[cfg(not(ffmpeg_coded_side_data))]
use ffmpeg_next::packet::side_data::Type as PacketSideDataType;
use ffmpeg_sys_next::AV_NOPTS_VALUE;
#[cfg(ffmpeg_coded_side_data)]
use ffmpeg_sys_next::AVPacketSideDataType;
use image::{DynamicImage, RgbImage};

use crate::{
    configuration::SeekTolerance,
    decoder::{DecodedFrame, MediaDecoder},
    error::ThumbnailError,
    utilities::{self, FrameSelector, Orientation},
};

static FFMPEG_INITIALIZED: OnceLock<Result<(), ffmpeg_next::Error>> = OnceLock::new();

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions the process cannot survive.
    Panic,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors. This is the default.
    Error,
    /// Warnings.
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set FFmpeg's own log level.
///
/// Initialises FFmpeg first, so the level sticks even when called before any
/// media is opened.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    if let Err(error) = initialize() {
        log::warn!("FFmpeg initialisation failed: {error}");
    }
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

fn initialize() -> Result<(), ffmpeg_next::Error> {
    FFMPEG_INITIALIZED
        .get_or_init(|| {
            ffmpeg_next::init()?;
            ffmpeg_next::util::log::set_level(FfmpegLogLevel::Error.to_ffmpeg_level());
            Ok(())
        })
        .clone()
}

/// [`MediaDecoder`] backed by FFmpeg.
///
/// # Example
///
/// ```no_run
/// use std::{path::Path, time::Duration};
///
/// use vtg::{FfmpegDecoder, MediaDecoder, SeekTolerance};
///
/// let decoder = FfmpegDecoder::new();
/// let mut media = decoder.open(Path::new("clip.mp4"))?;
/// let duration = decoder.duration(&media)?;
/// let frame = decoder.frame_at(&mut media, duration / 2, SeekTolerance::ZERO)?;
/// # Ok::<(), vtg::ThumbnailError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    apply_display_transform: bool,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegDecoder {
    /// Create a decoder that rotates frames upright.
    pub fn new() -> Self {
        Self {
            apply_display_transform: true,
        }
    }

    /// Control whether the video track's rotation metadata is applied to
    /// decoded frames. Defaults to `true`.
    #[must_use]
    pub fn with_display_transform(mut self, apply: bool) -> Self {
        self.apply_display_transform = apply;
        self
    }
}

/// A media file opened by [`FfmpegDecoder`].
pub struct FfmpegMedia {
    input: Input,
    path: PathBuf,
    stream_index: usize,
    time_base: Rational,
    start_pts: i64,
    duration: Option<Duration>,
    stream_orientation: Option<Orientation>,
}

impl Debug for FfmpegMedia {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegMedia")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field(
                "time_base",
                &format_args!("{}/{}", self.time_base.numerator(), self.time_base.denominator()),
            )
            .field("start_pts", &self.start_pts)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl FfmpegMedia {
    /// Path the media was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MediaDecoder for FfmpegDecoder {
    type Media = FfmpegMedia;

    fn open(&self, path: &Path) -> Result<FfmpegMedia, ThumbnailError> {
        log::debug!("Opening media file: {}", path.display());

        let unreadable = |reason: String| ThumbnailError::UnreadableMedia {
            path: path.to_path_buf(),
            reason,
        };

        initialize().map_err(|error| unreadable(format!("FFmpeg initialisation failed: {error}")))?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| unreadable(error.to_string()))?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| unreadable("No video stream found in file".to_string()))?;

        let stream_index = stream.index();
        let time_base = stream.time_base();
        let start_pts = match stream.start_time() {
            AV_NOPTS_VALUE => 0,
            start => start,
        };

        let container_duration = input.duration();
        let duration = if container_duration > 0 {
            Some(Duration::from_micros(container_duration as u64))
        } else if stream.duration() != AV_NOPTS_VALUE && stream.duration() > 0 {
            Some(Duration::from_secs_f64(utilities::pts_to_seconds(
                stream.duration(),
                time_base,
            )))
        } else {
            None
        };

        // Older FFmpeg never copies the stream display matrix onto frames,
        // and newer muxers no longer write the rotate tag.
        let stream_orientation = stream_display_matrix(&stream)
            .and_then(|matrix| Orientation::from_display_matrix(&matrix))
            .or_else(|| {
                stream.metadata().get("rotate").and_then(|tag| {
                    let orientation = Orientation::from_rotate_tag(tag);
                    if orientation.is_none() {
                        log::warn!("Ignoring unusual rotate tag '{tag}'");
                    }
                    orientation
                })
            });

        log::debug!(
            "Opened {} (format={}, video stream={}, duration={:?}, orientation={:?})",
            path.display(),
            input.format().name(),
            stream_index,
            duration,
            stream_orientation,
        );

        Ok(FfmpegMedia {
            input,
            path: path.to_path_buf(),
            stream_index,
            time_base,
            start_pts,
            duration,
            stream_orientation,
        })
    }

    fn duration(&self, media: &FfmpegMedia) -> Result<Duration, ThumbnailError> {
        media
            .duration
            .filter(|duration| !duration.is_zero())
            .ok_or_else(|| ThumbnailError::UnreadableMedia {
                path: media.path.clone(),
                reason: "No decodable video duration".to_string(),
            })
    }

    fn frame_at(
        &self,
        media: &mut FfmpegMedia,
        timestamp: Duration,
        tolerance: SeekTolerance,
    ) -> Result<DecodedFrame, ThumbnailError> {
        let target_seconds = timestamp.as_secs_f64();
        let stream_index = media.stream_index;
        let (start_pts, time_base) = (media.start_pts, media.time_base);
        let frame_seconds = |pts: i64| utilities::pts_to_seconds(pts - start_pts, time_base);

        let mut decoder = {
            let stream = media.input.stream(stream_index).ok_or_else(|| {
                ThumbnailError::DecodeFailed(format!("Video stream {stream_index} disappeared"))
            })?;
            CodecContext::from_parameters(stream.parameters())?
                .decoder()
                .video()?
        };

        let start_seconds = utilities::pts_to_seconds(start_pts, time_base);
        let seek_timestamp = utilities::seconds_to_seek_timestamp(start_seconds + target_seconds);
        if let Err(error) = media.input.seek(seek_timestamp, ..seek_timestamp) {
            log::warn!(
                "Seek to {target_seconds:.3}s failed ({error}), decoding from the current position"
            );
        }

        let mut selector = FrameSelector::new(target_seconds, tolerance);
        let mut decoded_frame = VideoFrame::empty();
        let mut settled = false;

        'packets: for (stream, packet) in media.input.packets() {
            if stream.index() != stream_index {
                continue;
            }

            if let Err(error) = decoder.send_packet(&packet) {
                log::debug!("Skipping packet the decoder rejected: {error}");
                continue;
            }

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let Some(pts) = decoded_frame.timestamp() else {
                    continue;
                };
                let seconds = frame_seconds(pts);
                let frame = std::mem::replace(&mut decoded_frame, VideoFrame::empty());
                if selector.offer(seconds, frame) {
                    settled = true;
                    break 'packets;
                }
            }
        }

        if !settled {
            decoder.send_eof()?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let Some(pts) = decoded_frame.timestamp() else {
                    continue;
                };
                let seconds = frame_seconds(pts);
                let frame = std::mem::replace(&mut decoded_frame, VideoFrame::empty());
                if selector.offer(seconds, frame) {
                    break;
                }
            }
        }

        let (selected_seconds, frame) = selector.finish().ok_or_else(|| {
            ThumbnailError::DecodeFailed(format!(
                "No frame could be decoded near {target_seconds:.3}s"
            ))
        })?;

        log::debug!(
            "Requested {target_seconds:.3}s, decoded frame at {selected_seconds:.3}s ({}x{}, {:?})",
            frame.width(),
            frame.height(),
            frame.format(),
        );

        let mut image = convert_frame_to_image(&frame)?;
        if self.apply_display_transform {
            image = frame_orientation(&frame)
                .or(media.stream_orientation)
                .unwrap_or_default()
                .apply(image);
        }

        Ok(DecodedFrame {
            image,
            timestamp: Duration::from_secs_f64(selected_seconds.max(0.0)),
        })
    }
}

fn frame_orientation(frame: &VideoFrame) -> Option<Orientation> {
    let side_data = frame.side_data(FrameSideDataType::DisplayMatrix)?;
    Orientation::from_display_matrix(side_data.data())
}

/// Display matrix attached to the stream's codec parameters (FFmpeg 6.1+).
#[cfg(ffmpeg_coded_side_data)]
fn stream_display_matrix(stream: &Stream) -> Option<Vec<u8>> {
    unsafe {
        let parameters = (*stream.as_ptr()).codecpar;
        if parameters.is_null() {
            return None;
        }
        let side_data = ffmpeg_sys_next::av_packet_side_data_get(
            (*parameters).coded_side_data,
            (*parameters).nb_coded_side_data,
            AVPacketSideDataType::AV_PKT_DATA_DISPLAYMATRIX,
        );
        if side_data.is_null() || (*side_data).data.is_null() {
            return None;
        }
        Some(std::slice::from_raw_parts((*side_data).data, (*side_data).size).to_vec())
    }
}

/// Display matrix stored as stream side data (FFmpeg before 6.1).
#[cfg(not(ffmpeg_coded_side_data))]
fn stream_display_matrix(stream: &Stream) -> Option<Vec<u8>> {
    stream
        .side_data()
        .find(|side_data| side_data.kind() == PacketSideDataType::DisplayMatrix)
        .map(|side_data| side_data.data().to_vec())
}

/// Convert a decoded frame of any pixel format to an RGB8 image.
fn convert_frame_to_image(frame: &VideoFrame) -> Result<DynamicImage, ThumbnailError> {
    let (width, height) = (frame.width(), frame.height());
    if frame.format() == Pixel::None || width == 0 || height == 0 {
        return Err(ThumbnailError::DecodeFailed(
            "Decoded frame has no pixel data".to_string(),
        ));
    }

    let mut scaler = ScalingContext::get(
        frame.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;
    let mut rgb_frame = VideoFrame::empty();
    scaler.run(frame, &mut rgb_frame)?;

    let buffer = utilities::frame_to_buffer(&rgb_frame, width, height, 3);
    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ThumbnailError::DecodeFailed(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(rgb_image))
}

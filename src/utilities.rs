//! Internal utility functions.
//!
//! Pixel-data copying, timestamp conversion, nearest-frame selection and
//! orientation handling shared by the FFmpeg backend.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use image::DynamicImage;

use crate::configuration::SeekTolerance;

/// Copy pixel data from a packed FFmpeg video frame into a tightly-packed
/// buffer, dropping any per-row padding.
///
/// `bytes_per_pixel` is 3 for RGB24.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert seconds to a container-level seek timestamp in AV_TIME_BASE
/// (microseconds), as expected by `avformat_seek_file` with
/// `stream_index = -1`.
pub(crate) fn seconds_to_seek_timestamp(seconds: f64) -> i64 {
    (seconds * 1_000_000.0).round() as i64
}

/// Picks the frame to return out of a forward-decoded sequence.
///
/// Frames are offered in presentation order. With a zero tolerance the frame
/// nearest the target wins (the earlier one on a tie). With a non-zero
/// tolerance the first frame inside the window wins. If the sequence ends
/// before the target is reached, the last frame offered is kept.
#[derive(Debug)]
pub(crate) struct FrameSelector<T> {
    target: f64,
    tolerance: SeekTolerance,
    previous: Option<(f64, T)>,
    chosen: Option<(f64, T)>,
}

impl<T> FrameSelector<T> {
    pub(crate) fn new(target: f64, tolerance: SeekTolerance) -> Self {
        Self {
            target,
            tolerance,
            previous: None,
            chosen: None,
        }
    }

    /// Offer the next frame. Returns `true` once the choice is final and no
    /// further frames need decoding.
    pub(crate) fn offer(&mut self, seconds: f64, frame: T) -> bool {
        if self.chosen.is_some() {
            return true;
        }

        if !self.tolerance.is_zero() && self.tolerance.contains(self.target, seconds) {
            self.chosen = Some((seconds, frame));
            return true;
        }

        if seconds < self.target {
            self.previous = Some((seconds, frame));
            return false;
        }

        self.chosen = match self.previous.take() {
            Some((previous_seconds, previous))
                if self.target - previous_seconds <= seconds - self.target =>
            {
                Some((previous_seconds, previous))
            }
            _ => Some((seconds, frame)),
        };
        true
    }

    /// The selected frame and its time in seconds, if any frame was offered.
    pub(crate) fn finish(self) -> Option<(f64, T)> {
        self.chosen.or(self.previous)
    }
}

/// Clockwise rotation needed to display a frame upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Orientation {
    #[default]
    Upright,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Orientation {
    /// Map a clockwise angle in degrees onto the nearest quarter turn.
    ///
    /// Returns `None` for non-finite angles or angles that are not close to a
    /// multiple of 90 degrees.
    pub(crate) fn from_clockwise_degrees(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }
        let quarter_turns = degrees / 90.0;
        if (quarter_turns - quarter_turns.round()).abs() > 0.01 {
            return None;
        }
        match (quarter_turns.round() as i64).rem_euclid(4) {
            0 => Some(Orientation::Upright),
            1 => Some(Orientation::Clockwise90),
            2 => Some(Orientation::Clockwise180),
            _ => Some(Orientation::Clockwise270),
        }
    }

    /// Interpret a display matrix rotation, which FFmpeg reports as a
    /// counter-clockwise angle.
    pub(crate) fn from_display_rotation(counter_clockwise_degrees: f64) -> Option<Self> {
        Self::from_clockwise_degrees(-counter_clockwise_degrees)
    }

    /// Interpret a raw 3x3 display matrix as stored in FFmpeg side data.
    ///
    /// Returns `None` for truncated matrices and unusual angles.
    pub(crate) fn from_display_matrix(bytes: &[u8]) -> Option<Self> {
        let mut matrix = [0i32; 9];
        if bytes.len() < size_of_val(&matrix) {
            return None;
        }
        for (value, chunk) in matrix.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = i32::from_ne_bytes(chunk.try_into().ok()?);
        }

        let rotation = unsafe { ffmpeg_sys_next::av_display_rotation_get(matrix.as_ptr()) };
        let orientation = Self::from_display_rotation(rotation);
        if orientation.is_none() {
            log::warn!("Ignoring unusual display rotation of {rotation} degrees");
        }
        orientation
    }

    /// Interpret the legacy `rotate` stream tag (clockwise degrees).
    pub(crate) fn from_rotate_tag(tag: &str) -> Option<Self> {
        tag.trim()
            .parse::<f64>()
            .ok()
            .and_then(Self::from_clockwise_degrees)
    }

    pub(crate) fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Upright => image,
            Orientation::Clockwise90 => image.rotate90(),
            Orientation::Clockwise180 => image.rotate180(),
            Orientation::Clockwise270 => image.rotate270(),
        }
    }
}

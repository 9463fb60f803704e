//! Extraction configuration.
//!
//! [`ExtractOptions`] is a small builder carrying the knobs of the frame
//! extractor. Decoder-specific settings (such as whether rotation metadata
//! is honoured) live on the decoder itself, see
//! [`FfmpegDecoder`](crate::FfmpegDecoder).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use vtg::{ExtractOptions, SeekTolerance};
//!
//! // Accept any frame within half a second of the target.
//! let options = ExtractOptions::new()
//!     .with_tolerance(SeekTolerance::symmetric(Duration::from_millis(500)));
//! assert!(!options.tolerance().is_zero());
//! ```

use std::time::Duration;

/// Allowed deviation between a requested timestamp and the frame returned.
///
/// [`SeekTolerance::ZERO`] demands the frame whose presentation time is
/// nearest the requested time, never an arbitrary nearby keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekTolerance {
    /// How far before the target a frame may start and still be accepted.
    pub before: Duration,
    /// How far after the target a frame may start and still be accepted.
    pub after: Duration,
}

impl SeekTolerance {
    /// Exact nearest-frame precision. This is the default.
    pub const ZERO: SeekTolerance = SeekTolerance {
        before: Duration::ZERO,
        after: Duration::ZERO,
    };

    /// Create a tolerance window with distinct bounds.
    pub fn new(before: Duration, after: Duration) -> Self {
        Self { before, after }
    }

    /// Create a tolerance window with the same bound on both sides.
    pub fn symmetric(tolerance: Duration) -> Self {
        Self::new(tolerance, tolerance)
    }

    /// Returns `true` when both bounds are zero.
    pub fn is_zero(&self) -> bool {
        self.before.is_zero() && self.after.is_zero()
    }

    /// Returns `true` if a frame at `frame_seconds` is acceptable for a
    /// request at `target_seconds`.
    pub fn contains(&self, target_seconds: f64, frame_seconds: f64) -> bool {
        frame_seconds >= target_seconds - self.before.as_secs_f64()
            && frame_seconds <= target_seconds + self.after.as_secs_f64()
    }
}

/// Configuration for frame extraction.
///
/// A default-constructed value requests zero-tolerance seeking.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ExtractOptions {
    pub(crate) tolerance: SeekTolerance,
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            tolerance: SeekTolerance::ZERO,
        }
    }

    /// Set the seek tolerance.
    pub fn with_tolerance(mut self, tolerance: SeekTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The configured seek tolerance.
    pub fn tolerance(&self) -> SeekTolerance {
        self.tolerance
    }
}

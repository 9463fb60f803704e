//! # vtg
//!
//! Video thumbnail generator: extract a single still frame from a video file
//! and write it as a PNG or JPEG image.
//!
//! Frames are decoded with FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and encoded
//! with the [`image`](https://crates.io/crates/image) crate. Both backends sit
//! behind traits ([`MediaDecoder`], [`ImageEncoder`]) and can be swapped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use vtg::{ImageFormat, ThumbnailRequest, Thumbnailer};
//!
//! let thumbnailer = Thumbnailer::new();
//!
//! // Middle of the video, written next to it as clip.png (or "clip 2.png"
//! // if clip.png already exists).
//! let output = thumbnailer.generate(&ThumbnailRequest::new("clip.mp4"))?;
//! println!("output: {}", output.path.display());
//!
//! // Frame at 2.5s, written as clip.jpg.
//! let request = ThumbnailRequest::new("clip.mp4")
//!     .with_timestamp(Duration::from_secs_f64(2.5))
//!     .with_format(ImageFormat::Jpeg);
//! thumbnailer.generate(&request)?;
//! # Ok::<(), vtg::ThumbnailError>(())
//! ```
//!
//! ## Behaviour
//!
//! - **Format precedence**: the extension of an explicit output path, then an
//!   explicit format override, then PNG.
//! - **Collision avoidance**: auto-derived paths never overwrite; explicit
//!   paths may.
//! - **Precise seeking**: the frame nearest the requested time is returned,
//!   not the nearest keyframe ([`SeekTolerance::ZERO`]).
//! - **Upright frames**: rotation metadata is applied to the decoded frame.
//! - **Atomic writes**: the image appears complete or not at all.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod format;
pub mod output;
pub mod request;
pub mod thumbnail;
mod utilities;
pub mod writer;

pub use configuration::{ExtractOptions, SeekTolerance};
pub use decoder::{DecodedFrame, MediaDecoder};
pub use encoder::{ImageEncoder, StandardEncoder};
pub use error::ThumbnailError;
pub use extractor::FrameExtractor;
pub use ffmpeg::{FfmpegDecoder, FfmpegLogLevel, FfmpegMedia, set_ffmpeg_log_level};
pub use format::ImageFormat;
pub use output::{ResolvedOutput, resolve, resolve_format};
pub use request::ThumbnailRequest;
pub use thumbnail::Thumbnailer;
pub use writer::write_atomic;

//! End-to-end thumbnail generation tests with an in-memory decoder.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use vtg::{
    DecodedFrame, ImageFormat, MediaDecoder, SeekTolerance, StandardEncoder, ThumbnailError,
    ThumbnailRequest, Thumbnailer,
};

/// Decoder producing a solid 32x18 frame, or failing on demand.
struct SolidDecoder {
    fail_decode: bool,
}

impl MediaDecoder for SolidDecoder {
    type Media = ();

    fn open(&self, _path: &Path) -> Result<(), ThumbnailError> {
        Ok(())
    }

    fn duration(&self, _media: &()) -> Result<Duration, ThumbnailError> {
        Ok(Duration::from_secs(10))
    }

    fn frame_at(
        &self,
        _media: &mut (),
        timestamp: Duration,
        _tolerance: SeekTolerance,
    ) -> Result<DecodedFrame, ThumbnailError> {
        if self.fail_decode {
            return Err(ThumbnailError::DecodeFailed("corrupt packet".to_string()));
        }
        Ok(DecodedFrame {
            image: DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 18, Rgb([200, 40, 40]))),
            timestamp,
        })
    }
}

fn thumbnailer() -> Thumbnailer<SolidDecoder, StandardEncoder> {
    Thumbnailer::with_backends(SolidDecoder { fail_decode: false }, StandardEncoder)
}

fn video_in(directory: &Path) -> PathBuf {
    let input = directory.join("clip.mp4");
    fs::write(&input, b"stand-in video").expect("Failed to write input");
    input
}

fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn writes_png_next_to_input() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = video_in(directory.path());

    let output = thumbnailer().generate(&ThumbnailRequest::new(&input)).unwrap();
    assert_eq!(output.path, directory.path().join("clip.png"));
    assert_eq!(output.format, ImageFormat::Png);

    let image = image::open(&output.path).unwrap();
    assert_eq!(image.dimensions(), (32, 18));
    assert_eq!(file_names(directory.path()), ["clip.mp4", "clip.png"]);
}

#[test]
fn existing_thumbnail_is_never_overwritten() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = video_in(directory.path());
    let existing = directory.path().join("clip.png");
    fs::write(&existing, b"keep me").unwrap();

    let output = thumbnailer().generate(&ThumbnailRequest::new(&input)).unwrap();
    assert_eq!(output.path, directory.path().join("clip 2.png"));
    assert_eq!(fs::read(&existing).unwrap(), b"keep me");

    let output = thumbnailer().generate(&ThumbnailRequest::new(&input)).unwrap();
    assert_eq!(output.path, directory.path().join("clip 3.png"));
}

#[test]
fn format_override_selects_jpeg() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = video_in(directory.path());

    let request = ThumbnailRequest::new(&input)
        .with_timestamp(Duration::from_secs_f64(2.5))
        .with_format(ImageFormat::Jpeg);
    let output = thumbnailer().generate(&request).unwrap();

    assert_eq!(output.path, directory.path().join("clip.jpg"));
    let bytes = fs::read(&output.path).unwrap();
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[test]
fn explicit_output_overwrites_and_keeps_extension() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = video_in(directory.path());
    let target = directory.path().join("poster.jpeg");
    fs::write(&target, b"old").unwrap();

    let request = ThumbnailRequest::new(&input)
        .with_format(ImageFormat::Png)
        .with_output(&target);
    let first = thumbnailer().generate(&request).unwrap();
    let second = thumbnailer().generate(&request).unwrap();

    assert_eq!(first.path, target);
    assert_eq!(second.path, target);
    assert_eq!(first.format, ImageFormat::Jpeg);
    let bytes = fs::read(&target).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    assert_eq!(file_names(directory.path()), ["clip.mp4", "poster.jpeg"]);
}

#[test]
fn bad_output_extension_fails_before_decoding() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    // The input does not exist: validation must fire first.
    let request = ThumbnailRequest::new(directory.path().join("missing.mp4"))
        .with_output(directory.path().join("out.gif"));

    let failing = Thumbnailer::with_backends(SolidDecoder { fail_decode: true }, StandardEncoder);
    let error = failing.generate(&request).unwrap_err();
    assert!(error.is_validation(), "{error}");
    assert!(file_names(directory.path()).is_empty());
}

#[test]
fn decode_failure_leaves_no_file() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = video_in(directory.path());

    let failing = Thumbnailer::with_backends(SolidDecoder { fail_decode: true }, StandardEncoder);
    let error = failing.generate(&ThumbnailRequest::new(&input)).unwrap_err();

    assert!(matches!(error, ThumbnailError::DecodeFailed(_)));
    assert_eq!(file_names(directory.path()), ["clip.mp4"]);
}

#[test]
fn missing_output_directory_is_a_write_failure() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = video_in(directory.path());
    let target = directory.path().join("nope").join("out.png");

    let error = thumbnailer()
        .generate(&ThumbnailRequest::new(&input).with_output(&target))
        .unwrap_err();

    assert!(matches!(error, ThumbnailError::WriteFailed { .. }));
    assert!(!error.is_validation());
    assert!(!error.is_media_failure());
    assert!(!target.exists());
}

#[cfg(unix)]
#[test]
fn overwritten_output_keeps_regular_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = video_in(directory.path());
    let target = directory.path().join("poster.png");
    fs::write(&target, b"old").unwrap();
    let before = fs::metadata(&target).unwrap().permissions().mode() & 0o777;

    thumbnailer()
        .generate(&ThumbnailRequest::new(&input).with_output(&target))
        .unwrap();
    let derived = thumbnailer().generate(&ThumbnailRequest::new(&input)).unwrap();

    let after = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
    let derived_mode = fs::metadata(&derived.path).unwrap().permissions().mode() & 0o777;
    assert_eq!(after, before, "{after:o} != {before:o}");
    assert_eq!(derived_mode, before, "{derived_mode:o} != {before:o}");
}

//! Output path and format resolution.
//!
//! Decides where a thumbnail is written and in which encoding. The decision
//! is a value ([`ResolvedOutput`]) computed once per run and threaded through
//! the encode and write steps.
//!
//! Format precedence, highest first:
//!
//! 1. the extension of an explicit output path (required, `png`/`jpg`/`jpeg`),
//! 2. an explicit format override,
//! 3. PNG.
//!
//! Auto-derived paths never overwrite an existing file: when `clip.png` is
//! taken, `clip 2.png`, `clip 3.png`, ... are tried in order. Explicit paths
//! are used verbatim and may overwrite.

use std::{
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
};

use crate::{error::ThumbnailError, format::ImageFormat};

/// Base name used when the input path has no file stem.
const FALLBACK_BASE_NAME: &str = "thumbnail";

/// First counter tried when the auto-derived name is taken.
const FIRST_COLLISION_COUNTER: u64 = 2;

/// Final destination and encoding of a thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    /// Absolute destination path.
    pub path: PathBuf,
    /// Encoding to write.
    pub format: ImageFormat,
    /// `true` when the path was supplied by the user. Only explicit paths
    /// may replace an existing file.
    pub explicit: bool,
}

/// Apply the format precedence rules without touching the filesystem.
///
/// # Errors
///
/// Returns [`ThumbnailError::UnsupportedExtension`] if `explicit_output` has
/// no extension or one outside `png`/`jpg`/`jpeg` (matched case-sensitively).
pub fn resolve_format(
    explicit_output: Option<&Path>,
    format_override: Option<ImageFormat>,
) -> Result<ImageFormat, ThumbnailError> {
    match explicit_output {
        Some(path) => format_from_path(path),
        None => Ok(format_override.unwrap_or_default()),
    }
}

/// Resolve the output path and format for a thumbnail of `input`.
///
/// # Errors
///
/// - [`ThumbnailError::UnsupportedExtension`] for an explicit path with a
///   missing or unsupported extension.
/// - [`ThumbnailError::WriteFailed`] if a path cannot be made absolute.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use vtg::{ImageFormat, resolve};
///
/// let resolved = resolve(Path::new("videos/clip.mp4"), None, Some(ImageFormat::Jpeg))?;
/// assert!(resolved.path.ends_with("videos/clip.jpg"));
/// # Ok::<(), vtg::ThumbnailError>(())
/// ```
pub fn resolve(
    input: &Path,
    explicit_output: Option<&Path>,
    format_override: Option<ImageFormat>,
) -> Result<ResolvedOutput, ThumbnailError> {
    let format = resolve_format(explicit_output, format_override)?;

    if let Some(output) = explicit_output {
        return Ok(ResolvedOutput {
            path: absolute(output)?,
            format,
            explicit: true,
        });
    }

    let input = absolute(input)?;
    let directory = input.parent().map(Path::to_path_buf).unwrap_or_default();
    let base_name = input
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| OsString::from(FALLBACK_BASE_NAME));

    let path = first_free_path(&directory, &base_name, format.extension());
    log::debug!("Resolved output path: {} ({format})", path.display());

    Ok(ResolvedOutput {
        path,
        format,
        explicit: false,
    })
}

/// Find the first name in `directory` that is not taken, starting with
/// `<base>.<ext>` and continuing with `<base> 2.<ext>`, `<base> 3.<ext>`, ...
pub fn first_free_path(directory: &Path, base_name: &OsStr, extension: &str) -> PathBuf {
    let candidate = directory.join(file_name(base_name, None, extension));
    if !entry_exists(&candidate) {
        return candidate;
    }

    let mut counter = FIRST_COLLISION_COUNTER;
    loop {
        let candidate = directory.join(file_name(base_name, Some(counter), extension));
        if !entry_exists(&candidate) {
            log::debug!(
                "Output name taken, using collision-free variant {}",
                candidate.display()
            );
            return candidate;
        }
        counter += 1;
    }
}

fn format_from_path(path: &Path) -> Result<ImageFormat, ThumbnailError> {
    let extension = path.extension().map(|ext| ext.to_string_lossy().into_owned());
    extension
        .as_deref()
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| ThumbnailError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        })
}

fn file_name(base_name: &OsStr, counter: Option<u64>, extension: &str) -> OsString {
    let mut name = base_name.to_os_string();
    if let Some(counter) = counter {
        name.push(format!(" {counter}"));
    }
    name.push(".");
    name.push(extension);
    name
}

// Broken symlinks count as taken: renaming onto them would still clobber.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn absolute(path: &Path) -> Result<PathBuf, ThumbnailError> {
    std::path::absolute(path).map_err(|source| ThumbnailError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

//! All-or-nothing output writes.
//!
//! The encoded image is written to a temporary file in the destination
//! directory and renamed into place, so a crash or a full disk never leaves a
//! truncated image at the resolved path.

use std::{
    fs,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::{Builder, NamedTempFile};

use crate::{error::ThumbnailError, output::ResolvedOutput};

/// Atomically write `bytes` to `output.path`.
///
/// Explicit paths replace any existing file. Auto-derived paths refuse to,
/// so a file created between resolution and write is never clobbered. The
/// written file gets the same permissions a plain create would give it.
///
/// # Errors
///
/// [`ThumbnailError::WriteFailed`] carrying the underlying I/O error. The
/// temporary file is removed on every failure path.
pub fn write_atomic(output: &ResolvedOutput, bytes: &[u8]) -> Result<(), ThumbnailError> {
    let path = output.path.as_path();
    let write_failed = |source| ThumbnailError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let directory = parent_directory(path);
    let mut temporary = temporary_file_in(&directory).map_err(write_failed)?;
    temporary.write_all(bytes).map_err(write_failed)?;
    temporary.as_file().sync_all().map_err(write_failed)?;

    let persisted = if output.explicit {
        temporary.persist(path)
    } else {
        match temporary.persist_noclobber(path) {
            Err(error) if noclobber_unsupported(&error.error, path) => {
                log::warn!(
                    "Filesystem at {} cannot rename without replacing ({}), falling back to a plain rename",
                    directory.display(),
                    error.error
                );
                error.file.persist(path)
            }
            persisted => persisted,
        }
    };
    persisted.map_err(|error| write_failed(error.error))?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// Umask still applies, as for any newly created file.
fn temporary_file_in(directory: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".vtg-");
    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::fs::PermissionsExt};
        builder.permissions(Permissions::from_mode(0o666));
    }
    builder.tempfile_in(directory)
}

// No-replace renames need RENAME_NOREPLACE or hard links, which exFAT and
// some network mounts lack. The target must still be free to fall back.
fn noclobber_unsupported(error: &io::Error, path: &Path) -> bool {
    error.kind() != ErrorKind::AlreadyExists && fs::symlink_metadata(path).is_err()
}

fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        io::{Error, ErrorKind},
        path::Path,
    };

    use super::{noclobber_unsupported, parent_directory};

    #[test]
    fn unsupported_noclobber_falls_back_only_for_free_targets() {
        let directory = tempfile::tempdir().unwrap();
        let free = directory.path().join("clip.png");
        let unsupported = Error::new(ErrorKind::Unsupported, "operation not supported");

        assert!(noclobber_unsupported(&unsupported, &free));
        assert!(!noclobber_unsupported(
            &Error::new(ErrorKind::AlreadyExists, "exists"),
            &free
        ));

        fs::write(&free, b"taken").unwrap();
        assert!(!noclobber_unsupported(&unsupported, &free));
    }

    #[test]
    fn bare_file_name_writes_to_current_directory() {
        assert_eq!(parent_directory(Path::new("out.png")), Path::new("."));
        assert_eq!(parent_directory(Path::new("/tmp/out.png")), Path::new("/tmp"));
    }
}

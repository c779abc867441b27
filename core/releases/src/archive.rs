//! Extraction of a single binary from a build archive.
//!
//! Build archives are zips whose top-level entry of interest is named after
//! the product. The entry is streamed to the destination, which is created
//! or truncated and made executable.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use crate::errors::{ReleaseError, Result};
use crate::progress::{ProgressCallback, Reporter, Stage};

/// Copy buffer size for extraction.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Extracts the entry named `entry_name` from the zip at `archive_path` to
/// `destination`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened (`Filesystem`) or is not a zip (`InvalidArchive`)
/// - No entry is named exactly `entry_name` (`ArchiveEntryNotFound`)
/// - The destination cannot be created, written or made executable (`Filesystem`)
pub fn extract_binary(
    archive_path: &Path,
    entry_name: &str,
    destination: &Path,
    progress: Option<ProgressCallback>,
) -> Result<u64> {
    let file = std::fs::File::open(archive_path).map_err(|e| {
        ReleaseError::filesystem(
            format!("Failed to open archive {}", archive_path.display()),
            e,
        )
    })?;

    let mut archive =
        ZipArchive::new(file).map_err(|e| ReleaseError::invalid_archive(archive_path, e))?;

    let mut entry = match archive.by_name(entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(ReleaseError::archive_entry_not_found(entry_name));
        }
        Err(e) => return Err(ReleaseError::invalid_archive(archive_path, e)),
    };

    let mut output = open_executable(destination)?;
    let mut reporter = Reporter::start(progress, Stage::Extract, Some(entry.size()));
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

    loop {
        let read = entry.read(&mut buffer).map_err(|e| {
            ReleaseError::filesystem(format!("Failed to extract {entry_name}"), e)
        })?;
        if read == 0 {
            break;
        }
        output.write_all(&buffer[..read]).map_err(|e| {
            ReleaseError::filesystem(format!("Failed to write {}", destination.display()), e)
        })?;
        reporter.advance(read);
    }

    output.flush().map_err(|e| {
        ReleaseError::filesystem(format!("Failed to flush {}", destination.display()), e)
    })?;
    drop(output);

    set_executable_permissions(destination)?;

    Ok(reporter.finish())
}

/// Opens `path` for writing, creating or truncating it.
fn open_executable(path: &Path) -> Result<std::fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }

    options
        .open(path)
        .map_err(|e| ReleaseError::filesystem(format!("Failed to create {}", path.display()), e))
}

/// Sets mode `0755` on `path`.
///
/// The creation mode does not apply to a file that already existed, so the
/// mode is set explicitly after writing.
#[cfg(unix)]
pub fn set_executable_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        ReleaseError::filesystem(
            format!("Failed to set permissions on {}", path.display()),
            e,
        )
    })
}

/// Sets executable permissions (no-op on Windows).
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn set_executable_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Writes a zip containing the given `(name, content)` entries.
    fn create_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).expect("Should create file");
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).expect("Should start file");
            zip.write_all(content).expect("Should write content");
        }
        zip.finish().expect("Should finish zip");
    }

    fn temp_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().to_path_buf();
        (dir, path)
    }

    #[test]
    fn extracts_entry_named_after_product() {
        let (_guard, dir) = temp_dir();
        let archive = dir.join("consul.zip");
        let dest = dir.join("bin-consul");
        create_zip(&archive, &[("consul", b"#!/bin/sh\necho consul\n")]);

        let written = extract_binary(&archive, "consul", &dest, None).expect("Should extract");

        assert_eq!(written, 22);
        assert_eq!(
            std::fs::read(&dest).expect("Should read"),
            b"#!/bin/sh\necho consul\n"
        );
    }

    #[test]
    fn picks_exact_name_among_several_entries() {
        let (_guard, dir) = temp_dir();
        let archive = dir.join("multi.zip");
        let dest = dir.join("out");
        create_zip(
            &archive,
            &[
                ("README.md", b"readme"),
                ("vault.sig", b"sig"),
                ("vault", b"vault binary"),
            ],
        );

        extract_binary(&archive, "vault", &dest, None).expect("Should extract");
        assert_eq!(std::fs::read(&dest).expect("Should read"), b"vault binary");
    }

    #[test]
    fn missing_entry_is_reported_by_name() {
        let (_guard, dir) = temp_dir();
        let archive = dir.join("other.zip");
        let dest = dir.join("out");
        create_zip(&archive, &[("nomad", b"nomad")]);

        let err = extract_binary(&archive, "consul", &dest, None).unwrap_err();
        assert!(matches!(err, ReleaseError::ArchiveEntryNotFound { ref name } if name == "consul"));
        assert!(!dest.exists());
    }

    #[test]
    fn non_zip_input_is_an_invalid_archive() {
        let (_guard, dir) = temp_dir();
        let archive = dir.join("garbage.zip");
        let dest = dir.join("out");
        std::fs::write(&archive, b"definitely not a zip").expect("Should write");

        let err = extract_binary(&archive, "consul", &dest, None).unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidArchive { .. }));
    }

    #[test]
    fn existing_destination_is_truncated() {
        let (_guard, dir) = temp_dir();
        let archive = dir.join("short.zip");
        let dest = dir.join("out");
        std::fs::write(&dest, b"a much longer previous binary").expect("Should write");
        create_zip(&archive, &[("packer", b"new")]);

        extract_binary(&archive, "packer", &dest, None).expect("Should extract");
        assert_eq!(std::fs::read(&dest).expect("Should read"), b"new");
    }

    #[test]
    fn unwritable_destination_is_a_filesystem_error() {
        let (_guard, dir) = temp_dir();
        let archive = dir.join("ok.zip");
        create_zip(&archive, &[("consul", b"x")]);

        let dest = dir.join("no-such-dir").join("consul");
        let err = extract_binary(&archive, "consul", &dest, None).unwrap_err();
        assert!(matches!(err, ReleaseError::Filesystem { .. }));
    }

    #[cfg(unix)]
    mod unix_tests {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        #[test]
        fn destination_is_executable() {
            let (_guard, dir) = temp_dir();
            let archive = dir.join("exec.zip");
            let dest = dir.join("terraform");
            create_zip(&archive, &[("terraform", b"binary")]);

            extract_binary(&archive, "terraform", &dest, None).expect("Should extract");

            let mode = std::fs::metadata(&dest)
                .expect("Should get metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755, "destination should have 0o755 mode");
        }

        #[test]
        fn existing_destination_gains_executable_mode() {
            let (_guard, dir) = temp_dir();
            let archive = dir.join("exec.zip");
            let dest = dir.join("vagrant");
            std::fs::write(&dest, b"old").expect("Should write");
            std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o644))
                .expect("Should set initial perms");
            create_zip(&archive, &[("vagrant", b"binary")]);

            extract_binary(&archive, "vagrant", &dest, None).expect("Should extract");

            let mode = std::fs::metadata(&dest)
                .expect("Should get metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}

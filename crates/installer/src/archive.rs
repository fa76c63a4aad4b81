//! Checksum verification and binary extraction from release tarballs.

use crate::errors::{InstallError, Result};
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn verify_checksum(data: &[u8], expected: &str, file: &str) -> Result<()> {
    let actual = sha256_hex(data);
    if actual.eq_ignore_ascii_case(expected) {
        return Ok(());
    }
    Err(InstallError::ChecksumMismatch {
        file: file.to_string(),
        expected: expected.to_string(),
        actual,
    })
}

/// Copies the file called `binary` out of a `.tar.gz` into `dest_dir`, marked
/// executable. The target is replaced atomically.
pub fn extract_binary(
    archive_bytes: &[u8],
    archive_name: &str,
    binary: &str,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    let mut contents = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path()?;
        if path.file_name().and_then(|name| name.to_str()) != Some(binary) {
            continue;
        }
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        contents = Some(buf);
        break;
    }

    let contents = contents.ok_or_else(|| InstallError::BinaryNotInArchive {
        binary: binary.to_string(),
        archive: archive_name.to_string(),
    })?;

    let target = dest_dir.join(binary);
    write_executable(&target, &contents).map_err(|source| InstallError::Write {
        path: target.clone(),
        source,
    })?;
    debug!(path = %target.display(), bytes = contents.len(), "binary extracted");
    Ok(target)
}

fn write_executable(target: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    io::Write::write_all(&mut staged, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o755))?;
    }

    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

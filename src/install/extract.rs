//! Archive extraction behind a narrow seam.
//!
//! The install transaction treats the decoder as a black box: given a local
//! archive file and a destination directory, it produces the list of
//! extracted file paths. Hosts with unusual archive formats implement
//! [`ArchiveExtractor`] themselves; everyone else uses [`DefaultExtractor`],
//! which handles the formats GitHub release assets actually ship in.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::core::{Result, UpdateError};

/// Decodes a local archive file into a destination directory.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `dest`, creating `dest` as needed.
    ///
    /// Returns the paths of the extracted files, relative to `dest`.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>>;
}

/// Extractor for `.zip` and `.tar.gz`/`.tgz` archives.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtractor;

impl ArchiveExtractor for DefaultExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
        let name = archive.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let fail = |reason: String| UpdateError::ExtractionFailed {
            archive: name.to_string(),
            reason,
        };

        if name.ends_with(".zip") {
            extract_zip(archive, dest).map_err(|e| fail(e.to_string()))
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            extract_tar_gz(archive, dest).map_err(|e| fail(e.to_string()))
        } else {
            Err(fail("unsupported archive format".to_string()))
        }
    }
}

fn extract_zip(archive: &Path, dest: &Path) -> io::Result<Vec<PathBuf>> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let mut files = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| io::Error::other(e.to_string()))?;
        // Skip entries that would escape the destination.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let out_path = dest.join(&relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))?;
        }
        files.push(relative);
    }
    Ok(files)
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dest)?;
    let mut tar = tar::Archive::new(GzDecoder::new(File::open(archive)?));
    let mut files = Vec::new();
    for entry in tar.entries()? {
        let mut entry = entry?;
        let relative = entry.path()?.into_owned();
        let is_file = entry.header().entry_type().is_file();
        // unpack_in rejects paths that would escape the destination.
        if entry.unpack_in(dest)? && is_file {
            files.push(relative);
        }
    }
    Ok(files)
}

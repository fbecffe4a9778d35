//! Download and install releases, managing the on-disk layout.
//!
//! File layout under the host-supplied storage root:
//!
//! ```text
//! <storage_root>/
//!   install/
//!     <tag>/                          extracted release tree, one dir per tag
//!       tool_<version>/bin/tool
//!   download/
//!     tool-platform-<version>.zip     deleted after extraction
//! ```
//!
//! The presence of `install/<tag>/` is the sole signal that a version is
//! already installed. Files under `download/` exist only transiently during a
//! single download and are removed on both success and failure.
//!
//! Side effects are strictly ordered: the archive is never deleted before
//! extraction succeeds, and an existing `install/<tag>/` is never deleted
//! before the user's reuse-or-overwrite decision is known. A failed
//! transaction therefore never corrupts a working installation.

pub mod extract;

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::{Result, UpdateError};
use crate::github::{Asset, GithubClient, Release};
use crate::ui::{Options, ProgressWork, ReuseDecision, Ui};

pub use extract::{ArchiveExtractor, DefaultExtractor};

/// The two fixed subdirectories derived from the storage root.
#[derive(Debug, Clone)]
pub struct InstallDirs {
    /// Holds one extracted tree per installed release tag.
    pub install: PathBuf,
    /// Holds transient archive files during a download.
    pub download: PathBuf,
}

impl InstallDirs {
    /// Ensure `install/` and `download/` exist under `storage_root`.
    /// Idempotent.
    pub async fn create(storage_root: &Path) -> Result<Self> {
        let dirs = Self {
            install: storage_root.join("install"),
            download: storage_root.join("download"),
        };
        tokio::fs::create_dir_all(&dirs.install).await?;
        tokio::fs::create_dir_all(&dirs.download).await?;
        Ok(dirs)
    }
}

/// Download the archive `asset` of `release` and extract it under the
/// storage root.
///
/// `cancel` is triggered if the user cancels the installation; it also
/// cooperatively aborts an in-flight download. Returns the absolute path to
/// the installed executable.
///
/// # Errors
///
/// - [`UpdateError::AlreadyInstalled`] when the user dismisses the
///   reuse-or-overwrite prompt (the existing directory is left untouched)
/// - [`UpdateError::DownloadFailed`] when the transfer fails; the partial
///   file is removed best-effort
/// - [`UpdateError::ExecutableNotFound`] when the extracted tree contains no
///   file named after the executable
/// - [`UpdateError::Cancelled`] when `cancel` fires during the download
pub async fn install<U: Ui>(
    ui: &U,
    options: &Options,
    client: &GithubClient,
    extractor: &dyn ArchiveExtractor,
    release: &Release,
    asset: &Asset,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let dirs = InstallDirs::create(&ui.storage_root()).await?;
    let extract_root = dirs.install.join(&release.tag);

    if tokio::fs::try_exists(&extract_root).await? {
        match ui.should_reuse(&release.name).await {
            ReuseDecision::Dismissed => {
                // No choice was made; bail out without touching the directory.
                cancel.cancel();
                return Err(UpdateError::AlreadyInstalled {
                    executable: options.executable_name.clone(),
                    release: release.name.clone(),
                });
            }
            ReuseDecision::Reuse => {
                info!(dir = %extract_root.display(), "reusing existing installation");
                return find_executable_in_tree(&options.executable_name, &extract_root);
            }
            ReuseDecision::Overwrite => {
                info!(dir = %extract_root.display(), "removing old installation");
                tokio::fs::remove_dir_all(&extract_root).await?;
            }
        }
    }

    let archive_file = dirs.download.join(&asset.name);
    download(ui, client, &asset.download_url, &archive_file, cancel).await?;

    let title = format!("Extracting {}", asset.name);
    let files = ui
        .slow(
            &title,
            Box::pin(async { extractor.extract(&archive_file, &extract_root) }),
        )
        .await?;

    let executable = extract_root.join(find_executable(&options.executable_name, &files)?);
    set_executable_permissions(&executable).await?;
    tokio::fs::remove_file(&archive_file).await?;
    info!(executable = %executable.display(), "installed");
    Ok(executable)
}

/// Download `url` to `dest` behind the UI's cancellable progress indicator,
/// reporting `bytes_read / content_length` as the completed fraction.
async fn download<U: Ui>(
    ui: &U,
    client: &GithubClient,
    url: &str,
    dest: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    debug!(%url, dest = %dest.display(), "downloading");
    let file_name = dest.file_name().and_then(|n| n.to_str()).unwrap_or("archive");
    let title = format!("Downloading {file_name}");

    let work: ProgressWork<'_, ()> = Box::new(move |report| {
        Box::pin(async move {
            let failed = |reason: String| UpdateError::DownloadFailed {
                url: url.to_string(),
                reason,
            };

            let response =
                client.http().get(url).send().await.map_err(|e| failed(e.to_string()))?;
            if !response.status().is_success() {
                return Err(failed(format!("HTTP {}", response.status())));
            }

            let total = response.content_length().unwrap_or(0);
            let mut file = tokio::fs::File::create(dest).await?;
            let mut stream = response.bytes_stream();
            let mut read: u64 = 0;
            loop {
                let chunk = tokio::select! {
                    // Cancellation wins over a chunk that is also ready.
                    biased;
                    () = cancel.cancelled() => return Err(UpdateError::Cancelled),
                    chunk = stream.next() => chunk,
                };
                match chunk {
                    Some(Ok(bytes)) => {
                        file.write_all(&bytes).await?;
                        read += bytes.len() as u64;
                        if total > 0 {
                            report(read as f64 / total as f64);
                        }
                    }
                    Some(Err(e)) => return Err(failed(e.to_string())),
                    None => break,
                }
            }
            file.flush().await?;
            Ok(())
        })
    });

    let result = ui.progress(&title, cancel, work).await;
    if result.is_err() {
        // Clean up the partial file; the original error is the one that matters.
        if let Err(e) = tokio::fs::remove_file(dest).await {
            debug!(dest = %dest.display(), error = %e, "could not remove partial download");
        }
    }
    result
}

/// Find the executable among a set of paths by base name.
///
/// On Windows-like targets the platform executable extension is appended to
/// the configured name before matching.
pub fn find_executable(executable_name: &str, paths: &[PathBuf]) -> Result<PathBuf> {
    let file_name = format!("{executable_name}{}", std::env::consts::EXE_SUFFIX);
    paths
        .iter()
        .find(|path| path.file_name().is_some_and(|name| name == file_name.as_str()))
        .cloned()
        .ok_or_else(|| UpdateError::ExecutableNotFound {
            executable: executable_name.to_string(),
        })
}

/// Scan an existing installation tree for the executable.
fn find_executable_in_tree(executable_name: &str, root: &Path) -> Result<PathBuf> {
    let files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    find_executable(executable_name, &files)
}

#[cfg(unix)]
async fn set_executable_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_executable_permissions(path: &Path) -> Result<()> {
    let _ = path;
    Ok(())
}

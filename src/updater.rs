//! The top-level decision procedure.
//!
//! There are several entry points:
//! - installation explicitly requested ([`Updater::install_latest`])
//! - checking for updates, manual or automatic ([`Updater::check_updates`])
//! - no usable executable found, try to recover (reached from
//!   [`Updater::prepare`])
//!
//! These have different flows, but the same underlying mechanisms. Every
//! entry point resolves to a UI notification or to silence; no error escapes
//! to the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use binup::{AssetSelector, GithubClient, GithubId, Options, Updater, VersionParser};
//!
//! struct PickFirst;
//! impl AssetSelector for PickFirst {
//!     fn pick(&self, names: &[String]) -> Option<usize> {
//!         names.iter().position(|n| n.contains("linux"))
//!     }
//! }
//!
//! struct PlainParser;
//! impl VersionParser for PlainParser {
//!     fn parse(&self, output: &str) -> anyhow::Result<String> {
//!         Ok(output.trim().to_string())
//!     }
//! }
//!
//! # async fn example(ui: impl binup::Ui + 'static) {
//! let options = Options {
//!     executable_name: "tool".to_string(),
//!     version_flags: vec!["--version".to_string()],
//!     version_range: None,
//!     gh: GithubId { owner: "example".to_string(), repo: "tool".to_string() },
//!     selector: Box::new(PickFirst),
//!     parser: Box::new(PlainParser),
//! };
//! let updater = Arc::new(Updater::new(options, ui));
//!
//! // On startup: resolve the configured executable, check for updates in
//! // the background.
//! let status = updater.prepare(true).await;
//! if let Some(path) = &status.executable_path {
//!     println!("using {}", path.display());
//! }
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::{Result, UpdateError};
use crate::github::{self, GithubClient, Release};
use crate::install::{self, ArchiveExtractor, DefaultExtractor};
use crate::ui::{Options, Ui};
use crate::version::{self, UpgradeCheck};

/// The result of the startup decision.
///
/// `background` represents work still in flight (an update check or a
/// recovery prompt). The caller may proceed immediately and await or ignore
/// it; no ordering is guaranteed between the background task's prompts and
/// caller code that runs after [`Updater::prepare`] returns.
pub struct InstallStatus {
    /// Absolute path to the usable executable, or `None` if no valid
    /// executable is configured.
    pub executable_path: Option<PathBuf>,
    /// The background task that was started, exposed so callers and tests
    /// can await it.
    pub background: JoinHandle<()>,
}

/// Coordinates release resolution, version comparison, and installation for
/// one managed executable.
///
/// Construct with [`Updater::new`], wrap in an [`Arc`], and call the entry
/// points. The host's [`Ui`] owns all mutable state (the configured
/// executable path); the updater itself is immutable and shareable.
pub struct Updater<U: Ui> {
    options: Options,
    github: GithubClient,
    extractor: Box<dyn ArchiveExtractor>,
    ui: U,
}

impl<U: Ui + 'static> Updater<U> {
    /// Create an updater against the public GitHub API with the default
    /// archive extractor.
    pub fn new(options: Options, ui: U) -> Self {
        Self {
            options,
            github: GithubClient::new(),
            extractor: Box::new(DefaultExtractor),
            ui,
        }
    }

    /// Replace the registry client, e.g. to target a GitHub Enterprise
    /// instance or a test server.
    #[must_use]
    pub fn with_github(mut self, github: GithubClient) -> Self {
        self.github = github;
        self
    }

    /// Replace the archive extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn ArchiveExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// The host UI this updater reports through.
    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Main startup workflow: check whether the configured executable is
    /// usable. If not, offer to install one in the background. If so,
    /// optionally check for updates in the background.
    ///
    /// The state is recomputed from the configured path and the filesystem
    /// on every call; nothing is persisted across invocations.
    pub async fn prepare(self: Arc<Self>, check_updates: bool) -> InstallStatus {
        let configured = self.ui.executable_path();
        match resolve_executable(configured.as_deref()).await {
            Some(path) => {
                debug!(path = %path.display(), "configured executable resolved");
                let background = if check_updates {
                    tokio::spawn(async move { self.check_updates(false).await })
                } else {
                    tokio::spawn(async {})
                };
                InstallStatus { executable_path: Some(path), background }
            }
            None => {
                // Couldn't find the executable: start the recovery flow and
                // report that nothing is usable right now.
                debug!(configured = ?configured, "configured executable did not resolve");
                InstallStatus {
                    executable_path: None,
                    background: tokio::spawn(async move { self.recover().await }),
                }
            }
        }
    }

    /// The user has explicitly asked to install the latest available
    /// version. Do so without further prompting, or report an error with a
    /// manual-install affordance.
    ///
    /// On success the configured executable path is updated and the host is
    /// asked to reload. On failure the path is left untouched; user-initiated
    /// cancellation stays silent.
    pub async fn install_latest(&self) {
        let executable_name = &self.options.executable_name;
        let cancel = CancellationToken::new();
        match self.try_install(&cancel).await {
            Ok((release, path)) => {
                self.ui.set_executable_path(path.display().to_string());
                self.ui
                    .prompt_reload(&format!("{executable_name} {release} is now installed."))
                    .await;
            }
            Err(e) if e.is_silent() => {
                debug!(error = %e, "installation cancelled");
            }
            Err(e) => {
                warn!(error = %e, "failed to install {executable_name}");
                let mut message = format!("Failed to install {executable_name}: {e}");
                let url = self.ui.install_url();
                if url.is_some() {
                    message.push_str("\nYou may want to install it manually.");
                }
                self.ui.show_help(&message, url.as_deref());
            }
        }
    }

    async fn try_install(&self, cancel: &CancellationToken) -> Result<(String, PathBuf)> {
        let release = self.resolve_release().await?;
        let asset = github::choose_asset(
            &release,
            &self.options.executable_name,
            self.options.selector.as_ref(),
        )?;
        let path = install::install(
            &self.ui,
            &self.options,
            &self.github,
            self.extractor.as_ref(),
            &release,
            &asset,
            cancel,
        )
        .await?;
        Ok((release.name, path))
    }

    /// We have an apparently valid executable; see whether the registry
    /// offers something newer.
    ///
    /// An upgrade always prompts. "Up to date" and failures are reported
    /// only when `requested` is true: an unreachable registry should not nag
    /// an unattended user.
    pub async fn check_updates(&self, requested: bool) {
        let executable_name = &self.options.executable_name;
        let check = match self.try_check_updates().await {
            Ok(check) => check,
            Err(e) => {
                // We're not sure whether there's an upgrade: stay quiet
                // unless asked.
                debug!(error = %e, "failed to check for {executable_name} update");
                if requested {
                    self.ui.error(&format!("Failed to check for {executable_name} update: {e}"));
                }
                return;
            }
        };
        info!(available = %check.new, installed = %check.old, "checked for update");
        if !check.is_upgrade {
            if requested {
                self.ui.info(&format!(
                    "{executable_name} is up-to-date (you have {}, latest is {})",
                    check.old, check.new
                ));
            }
            return;
        }
        self.ui.prompt_update(&check.old, &check.new).await;
    }

    async fn try_check_updates(&self) -> Result<UpgradeCheck> {
        let release = self.resolve_release().await?;
        // Ensure a binary exists for this platform before offering anything.
        github::choose_asset(
            &release,
            &self.options.executable_name,
            self.options.selector.as_ref(),
        )?;
        let configured = self.ui.executable_path().unwrap_or_default();
        if configured.is_empty() {
            return Err(UpdateError::ExecutableNotFound {
                executable: self.options.executable_name.clone(),
            });
        }
        let executable = PathBuf::from(configured);
        version::check_upgrade(
            &release,
            &executable,
            &self.options.version_flags,
            self.options.parser.as_ref(),
        )
        .await
    }

    /// No usable executable was found. Inform the user and, if the registry
    /// offers something installable, offer to install it. Unlike
    /// [`install_latest`](Self::install_latest) there has been no explicit
    /// user request yet, so this path never installs anything itself.
    async fn recover(&self) {
        let executable_name = &self.options.executable_name;
        match self.try_recover().await {
            Ok(release) => self.ui.prompt_install(&release.name).await,
            Err(e) => {
                warn!(error = %e, "auto-install offer failed");
                self.ui.show_help(
                    &format!("The {executable_name} executable is not installed."),
                    self.ui.install_url().as_deref(),
                );
            }
        }
    }

    async fn try_recover(&self) -> Result<Release> {
        let release = self.resolve_release().await?;
        github::choose_asset(
            &release,
            &self.options.executable_name,
            self.options.selector.as_ref(),
        )?;
        Ok(release)
    }

    async fn resolve_release(&self) -> Result<Release> {
        self.github
            .resolve_release(
                &self.options.gh,
                self.options.version_range.as_deref(),
                &self.options.executable_name,
            )
            .await
    }
}

/// Resolve the configured executable location to an accessible file.
///
/// An absolute path must exist on disk; a bare name must resolve on the
/// search path. Anything else means "unresolved".
async fn resolve_executable(configured: Option<&str>) -> Option<PathBuf> {
    let configured = configured?;
    if configured.is_empty() {
        return None;
    }
    let path = PathBuf::from(configured);
    if path.is_absolute() {
        tokio::fs::metadata(&path).await.is_ok().then_some(path)
    } else {
        which::which(configured).ok()
    }
}

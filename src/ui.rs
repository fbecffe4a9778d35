//! Ports to the host editor or CLI.
//!
//! The installer core never renders anything itself. Everything user-facing
//! goes through the [`Ui`] trait, and everything platform-specific goes
//! through the two strategy traits, [`AssetSelector`] and [`VersionParser`].
//! A host embeds the core by implementing these three seams and handing them
//! to [`Updater`](crate::Updater) at configuration time.
//!
//! The configured executable path is genuinely external, owned-elsewhere
//! state: the core reads it at the start of an operation via
//! [`Ui::executable_path`] and writes a new value via
//! [`Ui::set_executable_path`] only after a successful install. Failed
//! operations never mutate it.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::core::Result;
use crate::github::GithubId;

/// Picks which release asset to install on this machine.
///
/// Platform and architecture logic is injected through this seam rather than
/// hard-coded: the host knows which asset naming conventions its tool uses.
pub trait AssetSelector: Send + Sync {
    /// Given the candidate asset names of a release, return the index of the
    /// asset to install, or `None` when no asset suits this platform/arch.
    ///
    /// The core validates the result; an out-of-range index is treated the
    /// same as `None`.
    fn pick(&self, asset_names: &[String]) -> Option<usize>;
}

/// Extracts a raw version token from an executable's version output.
pub trait VersionParser: Send + Sync {
    /// Parse the captured standard output of the executable invoked with its
    /// version flags.
    ///
    /// # Errors
    ///
    /// Fail when the output cannot be parsed, or cannot be meaningfully
    /// compared (e.g. vendor-branded builds). The failure propagates as a
    /// hard "cannot determine" result of the whole comparison, never as a
    /// silent "no upgrade".
    fn parse(&self, output: &str) -> anyhow::Result<String>;
}

/// Static configuration for one managed executable.
pub struct Options {
    /// The executable's base name, without the Windows extension. Used in
    /// user-facing text and to locate the binary inside extracted archives.
    pub executable_name: String,
    /// Flags that make the executable print its version on stdout.
    pub version_flags: Vec<String>,
    /// Optional range constraint; when set, the newest satisfying tag is
    /// installed instead of the latest release.
    pub version_range: Option<String>,
    /// Where releases are published.
    pub gh: GithubId,
    /// Platform-aware asset selection strategy.
    pub selector: Box<dyn AssetSelector>,
    /// Version-output parsing strategy.
    pub parser: Box<dyn VersionParser>,
}

/// The user's answer to "this version is already installed".
///
/// Modeled as an explicit tri-state so "user dismissed the prompt" stays
/// distinguishable from "user chose overwrite" at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReuseDecision {
    /// Keep the existing directory and use the executable inside it.
    Reuse,
    /// Delete the existing directory and install fresh.
    Overwrite,
    /// No choice was made; the operation is cancelled.
    Dismissed,
}

/// Progress callback handed to work running under [`Ui::progress`]; receives
/// the completed fraction in `[0, 1]`.
pub type ProgressFn = Box<dyn Fn(f64) + Send + Sync>;

/// Work to run under a progress indicator: a closure receiving the progress
/// callback and returning the future to drive.
pub type ProgressWork<'a, T> = Box<dyn FnOnce(ProgressFn) -> BoxFuture<'a, Result<T>> + Send + 'a>;

/// Abstracts the host editor's UI and configuration.
///
/// This keeps the installation flows shareable across hosts: each editor or
/// CLI implements this trait once. Display methods are fire-and-forget;
/// prompt methods may suspend while the user decides.
///
/// The [`slow`](Ui::slow) and [`progress`](Ui::progress) wrappers have
/// pass-through default implementations, so a headless host only implements
/// the state and display methods.
#[async_trait]
pub trait Ui: Send + Sync {
    /// Root directory for downloaded and installed files.
    fn storage_root(&self) -> PathBuf;

    /// The currently configured executable location, if any. May be an
    /// absolute path or a bare name to resolve on the search path.
    fn executable_path(&self) -> Option<String>;

    /// Persist a newly installed executable location. Called only after the
    /// install transaction verified the path points at an executable.
    fn set_executable_path(&self, path: String);

    /// Optional URL to manual installation instructions.
    fn install_url(&self) -> Option<String> {
        None
    }

    /// Show a generic informational message.
    fn info(&self, message: &str);

    /// Show a generic error message.
    fn error(&self, message: &str);

    /// Show a message and optionally direct the user to a website.
    fn show_help(&self, message: &str, url: Option<&str>);

    /// Ask the user to reload the host so the new executable takes effect.
    async fn prompt_reload(&self, message: &str);

    /// Offer to upgrade from `old_version` to `new_version`.
    async fn prompt_update(&self, old_version: &str, new_version: &str);

    /// Offer to install the missing executable at `release_name`.
    async fn prompt_install(&self, release_name: &str);

    /// Ask whether to reuse or overwrite an already-installed version.
    async fn should_reuse(&self, release_name: &str) -> ReuseDecision;

    /// Run `work` behind an indeterminate "this may take a while" indicator.
    ///
    /// Used for operations whose duration cannot be estimated up front, such
    /// as archive extraction.
    async fn slow<T>(&self, title: &str, work: BoxFuture<'_, Result<T>>) -> Result<T>
    where
        T: Send + 'static,
    {
        let _ = title;
        work.await
    }

    /// Run `work` behind a cancellable, fractional progress indicator.
    ///
    /// `work` receives a callback to report its completed fraction. A host
    /// wiring this to a progress dialog should cancel `cancel` when the user
    /// dismisses the dialog.
    async fn progress<T>(
        &self,
        title: &str,
        cancel: &CancellationToken,
        work: ProgressWork<'_, T>,
    ) -> Result<T>
    where
        T: Send + 'static,
    {
        let _ = (title, cancel);
        work(Box::new(|_| {})).await
    }
}

//! Error handling for binup
//!
//! This module provides the error types for every installer flow. The error
//! system is designed around two core principles:
//! 1. **Strongly-typed errors** so the orchestrator can decide, per variant,
//!    whether a failure is surfaced to the user or swallowed silently
//! 2. **User-facing messages** that are complete enough to be shown verbatim
//!    by the host editor or CLI
//!
//! # Error Categories
//!
//! Errors are organized into several categories:
//! - **Configuration**: [`UpdateError::InvalidConfig`] - a malformed version
//!   range; fatal and never retried
//! - **Registry**: [`UpdateError::RegistryUnavailable`],
//!   [`UpdateError::NoCompatibleVersion`], [`UpdateError::NoCompatibleAsset`] -
//!   the release registry is unreachable or offers nothing installable
//! - **Installation**: [`UpdateError::DownloadFailed`],
//!   [`UpdateError::ExtractionFailed`], [`UpdateError::ExecutableNotFound`] -
//!   failures while placing a new binary on disk
//! - **User decisions**: [`UpdateError::AlreadyInstalled`],
//!   [`UpdateError::Cancelled`] - the user dismissed or aborted an operation;
//!   these are silent by design
//!
//! # Propagation Policy
//!
//! Every variant is caught at the orchestrator boundary
//! ([`Updater`](crate::Updater)). Nothing escapes `prepare`, `install_latest`,
//! or `check_updates` as an unhandled failure; each top-level operation always
//! resolves to a UI notification or to silence. Use
//! [`UpdateError::is_silent`] to distinguish the two classes.
//!
//! # Examples
//!
//! ```rust
//! use binup::UpdateError;
//!
//! let err = UpdateError::Cancelled;
//! assert!(err.is_silent());
//!
//! let err = UpdateError::DownloadFailed {
//!     url: "https://example.com/tool.zip".to_string(),
//!     reason: "connection reset".to_string(),
//! };
//! assert!(!err.is_silent());
//! ```

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// The error type for all installer operations.
///
/// Each variant carries the context needed to render a useful message to the
/// user without further lookups; the orchestrator decides per variant whether
/// the message is shown at all.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The configured version-range constraint is not valid range syntax.
    ///
    /// This is a configuration mistake, surfaced to the configuring layer and
    /// never retried.
    #[error("invalid version range: {range}")]
    InvalidConfig {
        /// The offending range string as configured.
        range: String,
    },

    /// The release registry answered with a non-success status.
    #[error("can't fetch {url}: {status} {message}")]
    RegistryUnavailable {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The status message, used verbatim in error text.
        message: String,
    },

    /// No published tag satisfies the configured version range.
    #[error("could not find a compatible version for {executable}, expected {range}")]
    NoCompatibleVersion {
        /// The executable being managed.
        executable: String,
        /// The configured range that nothing satisfied.
        range: String,
    },

    /// The asset selector found nothing installable for this host.
    #[error("no {executable} {release} binary available for {platform}/{arch}")]
    NoCompatibleAsset {
        /// The executable being managed.
        executable: String,
        /// The release name, for error context.
        release: String,
        /// The host operating system.
        platform: String,
        /// The host architecture.
        arch: String,
    },

    /// The version is already installed and the user dismissed the
    /// reuse-or-overwrite prompt. Silent by design.
    #[error("{executable} {release} is already installed")]
    AlreadyInstalled {
        /// The executable being managed.
        executable: String,
        /// The release the user declined to decide on.
        release: String,
    },

    /// Downloading the release archive failed.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed {
        /// The asset download URL.
        url: String,
        /// Why the transfer failed.
        reason: String,
    },

    /// Unpacking the downloaded archive failed.
    #[error("failed to extract {archive}: {reason}")]
    ExtractionFailed {
        /// The archive file name.
        archive: String,
        /// Why extraction failed.
        reason: String,
    },

    /// The extracted tree contains no file with the executable's name.
    #[error("didn't find a {executable} executable in the archive")]
    ExecutableNotFound {
        /// The executable base name that was searched for.
        executable: String,
    },

    /// A version token could not be interpreted as a loose semantic version.
    #[error("could not parse '{input}' as a version")]
    VersionUnparseable {
        /// The raw token that failed to parse.
        input: String,
    },

    /// The user or the caller aborted the operation. Always silent.
    #[error("operation cancelled")]
    Cancelled,

    /// A local filesystem or process operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A network request failed before producing a response.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// An injected strategy (asset selector or version parser) failed.
    #[error(transparent)]
    Strategy(#[from] anyhow::Error),
}

impl UpdateError {
    /// Whether this failure should be swallowed without notifying the user.
    ///
    /// User-initiated aborts and dismissed prompts are deliberate choices,
    /// not failures the user needs to hear about again.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled | Self::AlreadyInstalled { .. })
    }
}

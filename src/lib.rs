//! binup - keeps a locally-managed executable up to date
//!
//! Automatically downloads an executable from a GitHub release, decides when
//! an installed copy should be upgraded, and safely places new binaries on
//! disk. The crate is the *core* of an auto-installer: it reasons about
//! partial state (half-downloaded archives, half-extracted directories,
//! ambiguous version strings) and never corrupts a working installation
//! while attempting to upgrade it. Rendering prompts and progress is left to
//! the embedding host, which supplies a [`Ui`] implementation.
//!
//! # Architecture Overview
//!
//! Data flows one direction per operation:
//!
//! ```text
//! Updater (orchestrator)
//!   └─> GithubClient (release resolution)
//!         └─> choose_asset (platform gate, injected AssetSelector)
//!               └─> install (download, extract, locate executable)
//!                     └─> Ui::set_executable_path + reload prompt
//! ```
//!
//! The version comparator runs only on the update-check path, never during
//! installation.
//!
//! # Core Modules
//!
//! - [`updater`] - the entry points: `prepare`, `install_latest`,
//!   `check_updates`, and the recovery flow
//! - [`github`] - registry client, release resolution, asset-selection gate
//! - [`version`] - loose version parsing and the upgrade decision
//! - [`install`] - the on-disk install transaction and archive extraction
//! - [`ui`] - the host-facing ports: [`Ui`], [`AssetSelector`],
//!   [`VersionParser`]
//! - [`core`] - the error taxonomy
//!
//! # On-disk layout
//!
//! Under the host-supplied storage root: `install/<tag>/` holds one
//! extracted tree per release tag (retained until reuse or overwrite), and
//! `download/` holds archive files transiently during a download.
//!
//! # Getting started
//!
//! Implement [`Ui`] for your host, build [`Options`] with your platform's
//! [`AssetSelector`] and [`VersionParser`], and drive an [`Updater`]:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use binup::{Options, Updater};
//! # async fn example(options: Options, ui: impl binup::Ui + 'static) {
//! let updater = Arc::new(Updater::new(options, ui));
//! let status = updater.prepare(/*check_updates=*/ true).await;
//! match status.executable_path {
//!     Some(path) => println!("ready: {}", path.display()),
//!     None => println!("not installed; recovery prompt is on its way"),
//! }
//! # }
//! ```

pub mod core;
pub mod github;
pub mod install;
pub mod ui;
pub mod updater;
pub mod version;

pub use crate::core::{Result, UpdateError};
pub use github::{Asset, GithubClient, GithubId, Release};
pub use install::{ArchiveExtractor, DefaultExtractor, InstallDirs};
pub use ui::{AssetSelector, Options, ProgressFn, ProgressWork, ReuseDecision, Ui, VersionParser};
pub use updater::{InstallStatus, Updater};
pub use version::UpgradeCheck;

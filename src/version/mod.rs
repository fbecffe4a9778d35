//! Version parsing and upgrade comparison.
//!
//! Version strings reach us from two untrusted places: a release's tag or
//! name on the registry, and whatever the installed executable prints when
//! invoked with its version flags. Both are frequently partial (`"10.0"`,
//! `"15"`) or decorated (`"v1.2.3"`), so exact semantic versions are the
//! wrong tool. This module interprets such tokens as *loose ranges*: a
//! partial version stands for every version it could plausibly denote, the
//! way npm-style range syntax treats partials.
//!
//! The upgrade decision is deliberately conservative: a release is an
//! upgrade only when the *minimum* version its token can denote lies beyond
//! *everything* the installed token can denote. `"5.2"` is not an upgrade
//! over an installed `"5"`, because the installation could already be any
//! 5.x build.
//!
//! Parse failures anywhere in this path are hard failures of the whole
//! comparison, never a default "no upgrade". The caller must be able to
//! distinguish "determined: up to date" from "cannot determine".
//!
//! # Examples
//!
//! ```rust
//! use binup::version::{LooseRange, range_greater};
//!
//! let installed = LooseRange::parse("5.0.0").unwrap();
//! let released = LooseRange::parse("10.0").unwrap();
//! assert!(range_greater(&released, &installed));
//! assert!(!range_greater(&installed, &released));
//! ```

use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use semver::{Prerelease, Version};
use tracing::debug;

use crate::core::{Result, UpdateError};
use crate::github::Release;
use crate::ui::VersionParser;

/// Leading `v`/`=` decoration, then up to three numeric components and an
/// optional pre-release suffix. Trailing text is ignored, matching how loose
/// parsers treat vendor suffixes.
static LOOSE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[vV=]?\s*(\d+)(?:\.(\d+))?(?:\.(\d+)(?:-([0-9A-Za-z][0-9A-Za-z.-]*))?)?")
        .expect("loose version pattern is valid")
});

/// A loosely-parsed version token, interpreted as a range.
///
/// A full `major.minor.patch` token denotes exactly one version. A partial
/// token denotes the half-open range it abbreviates: `"10"` is
/// `[10.0.0, 11.0.0)` and `"10.2"` is `[10.2.0, 10.3.0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseRange {
    raw: String,
    min: Version,
    /// Exclusive upper bound; `None` for an exact (fully-specified) token.
    upper: Option<Version>,
}

impl LooseRange {
    /// Parse a free-form version token.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::VersionUnparseable`] when the token has no
    /// leading numeric component.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = LOOSE_VERSION.captures(input).ok_or_else(|| UpdateError::VersionUnparseable {
            input: input.to_string(),
        })?;

        let component = |i: usize| -> Option<u64> { caps.get(i)?.as_str().parse().ok() };
        let major = component(1).ok_or_else(|| UpdateError::VersionUnparseable {
            input: input.to_string(),
        })?;

        let (min, upper) = match (component(2), component(3)) {
            (Some(minor), Some(patch)) => {
                let mut min = Version::new(major, minor, patch);
                if let Some(pre) = caps.get(4) {
                    min.pre = Prerelease::new(pre.as_str()).map_err(|_| {
                        UpdateError::VersionUnparseable { input: input.to_string() }
                    })?;
                }
                (min, None)
            }
            (Some(minor), None) => {
                (Version::new(major, minor, 0), Some(Version::new(major, minor + 1, 0)))
            }
            _ => (Version::new(major, 0, 0), Some(Version::new(major + 1, 0, 0))),
        };

        Ok(Self { raw: caps.get(0).map_or(input, |m| m.as_str()).trim().to_string(), min, upper })
    }

    /// The token as it appeared in the source, trimmed of surrounding text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The smallest version this token can denote.
    pub fn min_version(&self) -> &Version {
        &self.min
    }
}

/// Whether `new` is unambiguously newer than `old`.
///
/// True iff the minimum version satisfying `new` lies beyond every version
/// `old` can denote. Equal or overlapping ranges are not an upgrade, and
/// neither is a pre-release of the first version beyond `old`: `6.0.0-rc1`
/// does not clear an installed `"5"`, only the finished `6.0.0` does.
pub fn range_greater(new: &LooseRange, old: &LooseRange) -> bool {
    match &old.upper {
        Some(upper) => new.min >= *upper,
        None => new.min > old.min,
    }
}

/// The result of comparing an installed executable against a release.
#[derive(Debug, Clone)]
pub struct UpgradeCheck {
    /// The installed version token.
    pub old: String,
    /// The released version token.
    pub new: String,
    /// Whether the release is a genuine upgrade.
    pub is_upgrade: bool,
}

/// Compare the configured executable's self-reported version against a
/// release.
///
/// Runs `executable` with `version_flags`, extracts a raw version token via
/// the injected `parser`, and compares it loosely against the release's tag
/// (or name, when the tag does not parse).
///
/// # Errors
///
/// Any parse failure anywhere in this path is a hard failure of the whole
/// comparison: the parser rejecting the output, a token with no numeric
/// component, or a release whose tag and name both fail to parse.
pub async fn check_upgrade(
    release: &Release,
    executable: &Path,
    version_flags: &[String],
    parser: &dyn VersionParser,
) -> Result<UpgradeCheck> {
    let released = released_range(release)?;
    let installed = installed_range(executable, version_flags, parser).await?;
    Ok(UpgradeCheck {
        old: installed.raw().to_string(),
        new: released.raw().to_string(),
        is_upgrade: range_greater(&released, &installed),
    })
}

/// The version a release advertises: the tag, unless only the name parses.
pub fn released_range(release: &Release) -> Result<LooseRange> {
    match LooseRange::parse(&release.tag) {
        Ok(range) => Ok(range),
        Err(tag_err) => LooseRange::parse(&release.name).map_err(|_| tag_err),
    }
}

/// The version an installed executable reports for itself.
async fn installed_range(
    executable: &Path,
    version_flags: &[String],
    parser: &dyn VersionParser,
) -> Result<LooseRange> {
    let output = run_version_command(executable, version_flags).await?;
    debug!(executable = %executable.display(), flags = ?version_flags, %output, "version command output");
    let token = parser.parse(&output)?;
    LooseRange::parse(&token)
}

/// Run the executable with its version flags and capture standard output.
async fn run_version_command(executable: &Path, flags: &[String]) -> Result<String> {
    let output = tokio::process::Command::new(executable)
        .args(flags)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

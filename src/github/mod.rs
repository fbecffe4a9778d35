//! GitHub release registry client and release resolution.
//!
//! Two read-only endpoints are used:
//! - *get release*, optionally by tag
//!   (`/repos/OWNER/REPO/releases/{latest|tags/TAG}`)
//! - *list tag refs* (`/repos/OWNER/REPO/git/matching-refs/tags`)
//!
//! The tag-refs endpoint is used instead of `/repos/OWNER/REPO/tags` because
//! the latter paginates, while a matching-refs response carries every ref.
//!
//! Release metadata is fetched fresh on every check and never cached across
//! calls: the set of published tags is the ground truth of what can actually
//! be installed.
//!
//! The API base URL is injectable so tests can point the client at a local
//! fake server.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::{Result, UpdateError};
use crate::ui::AssetSelector;

/// Identifies where releases are published: a GitHub `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubId {
    /// Repository owner or organization.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

/// One published release and its downloadable artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Human-readable release name.
    pub name: String,
    /// The git tag the release was published from.
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Downloadable artifacts attached to the release.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One downloadable artifact attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// The artifact file name.
    pub name: String,
    /// Direct download URL.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// A git ref from the matching-refs endpoint, e.g. `refs/tags/1.2.3`.
#[derive(Debug, Deserialize)]
struct TagRef {
    #[serde(rename = "ref")]
    git_ref: String,
}

const TAG_REF_PREFIX: &str = "refs/tags/";

impl TagRef {
    /// The ref with the fixed `refs/tags/` prefix stripped.
    fn tag(&self) -> &str {
        self.git_ref.strip_prefix(TAG_REF_PREFIX).unwrap_or(&self.git_ref)
    }
}

/// Client for the GitHub release registry.
///
/// Wraps a [`reqwest::Client`] configured with the `Accept` and `User-Agent`
/// headers the GitHub REST API expects. Construct with [`GithubClient::new`]
/// for the public API, or [`GithubClient::with_api_url`] to point at a fake
/// server in tests.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClient {
    const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Create a client against the public GitHub API.
    pub fn new() -> Self {
        Self::with_api_url(Self::DEFAULT_API_URL)
    }

    /// Create a client against an alternate API base URL.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("binup/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("default reqwest client configuration is valid");
        Self { http, api_url: api_url.into() }
    }

    /// The underlying HTTP client, shared with the download path.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolve the release to install: the newest published release, or the
    /// newest tag satisfying `version_range` when one is configured.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::InvalidConfig`] when `version_range` is not valid
    ///   range syntax (fail fast, before any network traffic)
    /// - [`UpdateError::NoCompatibleVersion`] when no published tag satisfies
    ///   the range
    /// - [`UpdateError::RegistryUnavailable`] when the registry answers with
    ///   a non-success status
    pub async fn resolve_release(
        &self,
        gh: &GithubId,
        version_range: Option<&str>,
        executable_name: &str,
    ) -> Result<Release> {
        let tag = match version_range {
            None => None,
            Some(range) => {
                Some(self.latest_compatible_tag(gh, range, executable_name).await?)
            }
        };
        self.release(gh, tag.as_deref()).await
    }

    /// Fetch release metadata, by tag when given, otherwise the latest
    /// published release.
    pub async fn release(&self, gh: &GithubId, tag: Option<&str>) -> Result<Release> {
        let url = match tag {
            Some(tag) => {
                format!("{}/repos/{}/{}/releases/tags/{}", self.api_url, gh.owner, gh.repo, tag)
            }
            None => format!("{}/repos/{}/{}/releases/latest", self.api_url, gh.owner, gh.repo),
        };
        debug!(%url, "fetching release metadata");
        let response = self.get(&url).await?;
        Ok(response.json().await?)
    }

    /// The newest published tag whose version satisfies `range`.
    ///
    /// Tags that do not parse as semantic versions (after stripping a leading
    /// `v`) are ignored; the remaining tags are considered newest-first. The
    /// tie-break is "newest version satisfying the range", not the range's
    /// declared maximum, because published tags are what can actually be
    /// installed.
    async fn latest_compatible_tag(
        &self,
        gh: &GithubId,
        range: &str,
        executable_name: &str,
    ) -> Result<String> {
        let constraint = semver::VersionReq::parse(range)
            .map_err(|_| UpdateError::InvalidConfig { range: range.to_string() })?;

        let mut tags: Vec<(semver::Version, String)> = self
            .tag_refs(gh)
            .await?
            .iter()
            .filter_map(|tag_ref| {
                let tag = tag_ref.tag();
                let version = semver::Version::parse(tag.trim_start_matches(['v', 'V'])).ok()?;
                Some((version, tag.to_string()))
            })
            .collect();
        tags.sort_by(|a, b| b.0.cmp(&a.0));

        match tags.into_iter().find(|(version, _)| constraint.matches(version)) {
            Some((version, tag)) => {
                debug!(%version, %tag, %range, "resolved compatible tag");
                Ok(tag)
            }
            None => Err(UpdateError::NoCompatibleVersion {
                executable: executable_name.to_string(),
                range: range.to_string(),
            }),
        }
    }

    /// List every tag ref published in the repository.
    async fn tag_refs(&self, gh: &GithubId) -> Result<Vec<TagRef>> {
        let url = format!("{}/repos/{}/{}/git/matching-refs/tags", self.api_url, gh.owner, gh.repo);
        debug!(%url, "fetching tag refs");
        let response = self.get(&url).await?;
        Ok(response.json().await?)
    }

    /// Issue a GET against the registry, mapping non-success statuses to
    /// [`UpdateError::RegistryUnavailable`].
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "registry request failed");
            return Err(UpdateError::RegistryUnavailable {
                url: url.to_string(),
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            });
        }
        Ok(response)
    }
}

/// Determine which release asset should be installed on this machine.
///
/// Invokes the externally supplied, platform-aware `selector` against the
/// candidate asset names and validates the result: a missing or out-of-range
/// index means no asset suits this host.
///
/// This gate runs identically on the install, update-check, and recovery
/// paths; each needs to confirm an installable asset exists even though only
/// the install path downloads it.
pub fn choose_asset(
    release: &Release,
    executable_name: &str,
    selector: &dyn AssetSelector,
) -> Result<Asset> {
    let names: Vec<String> = release.assets.iter().map(|asset| asset.name.clone()).collect();
    selector
        .pick(&names)
        .and_then(|index| release.assets.get(index))
        .cloned()
        .ok_or_else(|| UpdateError::NoCompatibleAsset {
            executable: executable_name.to_string(),
            release: release.name.clone(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        })
}

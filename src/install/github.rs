//! GitHub API interaction module
//!
//! Resolves the most recent release tag and builds artifact download URLs.

use crate::error::InstallError;
use crate::types::{GitHubRelease, ReleaseSource};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use url::Url;

const USER_AGENT_VALUE: &str = concat!("sculk-installer/", env!("CARGO_PKG_VERSION"));

pub struct ReleaseClient {
    http: reqwest::Client,
    api_base: String,
    download_base: String,
    token: Option<String>,
}

impl ReleaseClient {
    pub fn new(api_base: &str, download_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            download_base: download_base.to_string(),
            token: None,
        }
    }

    /// Sends `Authorization: token ...` on API requests.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build the releases endpoint for `owner/repo`.
    pub fn releases_url(&self, owner: &str, repo: &str, source: ReleaseSource) -> String {
        match source {
            ReleaseSource::List => format!("{}/repos/{}/{}/releases", self.api_base, owner, repo),
            ReleaseSource::Latest => {
                format!("{}/repos/{}/{}/releases/latest", self.api_base, owner, repo)
            }
        }
    }

    /// Fetch the tag of the most recent release.
    pub async fn resolve_latest_release(
        &self,
        owner: &str,
        repo: &str,
        source: ReleaseSource,
    ) -> Result<String, InstallError> {
        if owner.is_empty() || repo.is_empty() {
            return Err(InstallError::NotFound(format!(
                "repository owner and name must be non-empty (got '{}/{}')",
                owner, repo
            )));
        }

        let url = self.releases_url(owner, repo, source);
        tracing::debug!("Fetching GitHub release info from: {}", url);

        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, USER_AGENT_VALUE);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
            tracing::debug!("Using GITHUB_TOKEN");
        }

        let response = request.send().await.map_err(|e| {
            InstallError::network(format!("could not reach {}", url), Some(e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::network(
                format!("GitHub API request to {} failed: {}", url, status),
                None,
            ));
        }

        let body = response.text().await.map_err(|e| {
            InstallError::network(format!("could not read response from {}", url), Some(e))
        })?;

        let tag = parse_release_tag(&body, source)
            .map_err(|reason| InstallError::NotFound(format!("{}/{}: {}", owner, repo, reason)))?;

        tracing::info!("Latest release of {}/{} is {}", owner, repo, tag);
        Ok(tag)
    }

    /// `{download_base}/{owner}/{repo}/releases/download/{release}/{artifact}`
    ///
    /// Each component is pushed as its own path segment so anything unsafe is
    /// percent-encoded. Slashes inside the release tag stay delimiters.
    pub fn artifact_url(
        &self,
        owner: &str,
        repo: &str,
        release: &str,
        artifact_name: &str,
    ) -> Result<Url, InstallError> {
        let mut url = Url::parse(&self.download_base).map_err(|e| {
            InstallError::download(self.download_base.clone(), format!("invalid base URL: {}", e))
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                InstallError::download(self.download_base.clone(), "base URL cannot have a path")
            })?;
            segments
                .pop_if_empty()
                .extend([owner, repo, "releases", "download"])
                .extend(release.split('/').filter(|s| !s.is_empty()))
                .push(artifact_name);
        }

        Ok(url)
    }
}

/// Pull the tag out of a releases response body.
pub fn parse_release_tag(body: &str, source: ReleaseSource) -> Result<String, String> {
    let release = match source {
        ReleaseSource::List => {
            let releases: Vec<GitHubRelease> = serde_json::from_str(body)
                .map_err(|e| format!("malformed release list: {}", e))?;
            if releases.is_empty() {
                return Err("the release list is empty".to_string());
            }
            releases
                .into_iter()
                .find(|r| !r.draft)
                .ok_or_else(|| "the release list only has drafts".to_string())?
        }
        ReleaseSource::Latest => serde_json::from_str::<GitHubRelease>(body)
            .map_err(|e| format!("malformed release: {}", e))?,
    };

    if release.tag_name.is_empty() {
        return Err("release has an empty tag".to_string());
    }
    if release.prerelease {
        tracing::debug!("{} is marked as a prerelease", release.tag_name);
    }
    Ok(release.tag_name)
}

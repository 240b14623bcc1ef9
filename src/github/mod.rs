use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::document::ReadmeSections;
use crate::fetch::{FetchError, HttpFetcher};

/// Default host serving raw repository files
pub const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// README downloads are bounded independently of the client default
pub const README_TIMEOUT: Duration = Duration::from_secs(10);

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(?:www\.)?github\.com/([^/]+)/([^/]+)/(?:tree|blob)/([^/]+)/(.+)")
        .expect("GitHub URL pattern is valid")
});

/// Location of a directory in a GitHub repository, taken from a tree or blob URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl SourceRef {
    /// Parse `https://github.com/<owner>/<repo>/(tree|blob)/<branch>/<path>`
    pub fn parse(url: &str) -> Option<Self> {
        let cap = GITHUB_URL.captures(url)?;

        Some(Self {
            owner: cap[1].to_string(),
            repo: cap[2].to_string(),
            branch: cap[3].to_string(),
            path: cap[4].to_string(),
        })
    }

    /// URL of the directory README on the raw content host
    pub fn raw_readme_url(&self, raw_base: &str) -> String {
        format!(
            "{}/{}/{}/refs/heads/{}/{}/README.md",
            raw_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch,
            self.path
        )
    }
}

/// Failures of a module details scrape, each rendered as a markdown error page
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Could not fetch README.md from {url}. Status code: {status}")]
    Status { url: String, status: u16 },

    #[error("Error fetching {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("Error processing {url}: {message}")]
    Processing { url: String, message: String },
}

impl ScrapeError {
    fn from_fetch(url: &str, error: FetchError) -> Self {
        match error.status() {
            Some(status) => ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            None => ScrapeError::Fetch {
                url: url.to_string(),
                source: error,
            },
        }
    }

    pub fn to_markdown(&self) -> String {
        format!("# Error\n\n{self}")
    }
}

/// Fetches module READMEs from the raw content host
#[derive(Clone, Debug)]
pub struct GitHubClient {
    fetcher: HttpFetcher,
    raw_base: String,
}

impl GitHubClient {
    pub fn new(fetcher: HttpFetcher, raw_base: &str) -> Self {
        Self {
            fetcher,
            raw_base: raw_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_readme(&self, source: &SourceRef) -> Result<String, FetchError> {
        let raw_url = source.raw_readme_url(&self.raw_base);
        tracing::info!("Fetching: {}", raw_url);
        self.fetcher.get_text(&raw_url, Some(README_TIMEOUT)).await
    }

    /// Extract the interesting README sections of the module at `url`
    pub async fn scrape_sections(&self, url: &str) -> Result<ReadmeSections, ScrapeError> {
        let source = SourceRef::parse(url).ok_or_else(|| ScrapeError::Processing {
            url: url.to_string(),
            message: "expected a URL like https://github.com/<owner>/<repo>/tree/<branch>/<path>"
                .to_string(),
        })?;

        let content = self
            .fetch_readme(&source)
            .await
            .map_err(|e| ScrapeError::from_fetch(url, e))?;

        Ok(ReadmeSections::extract(&content))
    }

    /// Markdown with the found sections, or a `# Error` page
    pub async fn scrape_details(&self, url: &str) -> String {
        match self.scrape_sections(url).await {
            Ok(sections) => {
                if sections.is_empty() {
                    tracing::warn!("No known sections found in README for {}", url);
                }
                sections.to_markdown()
            }
            Err(e) => {
                tracing::error!("{}", e);
                e.to_markdown()
            }
        }
    }
}

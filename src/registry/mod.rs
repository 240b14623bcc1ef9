use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::fetch::{FetchError, HttpFetcher};

/// Only repositories under this prefix are Azure Verified Modules
pub const AVM_PREFIX: &str = "bicep/avm/";

/// Base of the browsable module sources
pub const DOCUMENTATION_BASE: &str = "https://github.com/Azure/bicep-registry-modules/tree/main";

const MODULE_DESCRIPTION: &str = "Azure Verified Module";

/// Summary of one module returned by `list_modules`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub versions: Vec<String>,
    pub description: String,
    pub documentation: String,
}

impl ModuleDescriptor {
    pub fn new(name: &str, versions: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            versions,
            description: MODULE_DESCRIPTION.to_string(),
            documentation: documentation_url(name),
        }
    }
}

/// Link to the module sources; every `bicep` in the repository name is dropped
pub fn documentation_url(repository: &str) -> String {
    format!("{}{}", DOCUMENTATION_BASE, repository.replace("bicep", ""))
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    repositories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Vec<String>,
}

/// Normalized substrings derived from a user supplied module filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchTerms {
    terms: Vec<String>,
}

impl SearchTerms {
    /// Build the term set; `None` when the filter is absent or blank, meaning match-all
    pub fn from_filter(filter: Option<&str>) -> Option<Self> {
        let filter = filter?;
        if filter.trim().is_empty() {
            return None;
        }

        let normalized = filter.to_lowercase();
        let mut terms = vec![
            normalized.clone(),
            normalized.split_whitespace().collect::<String>(),
            normalized.split_whitespace().collect::<Vec<_>>().join("-"),
        ];
        terms.extend(normalized.split_whitespace().map(str::to_string));

        // Deduplicate
        let mut unique_terms: Vec<String> = Vec::with_capacity(terms.len());
        for term in terms {
            if !term.is_empty() && !unique_terms.contains(&term) {
                unique_terms.push(term);
            }
        }

        Some(Self {
            terms: unique_terms,
        })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Case-insensitive substring test against a repository name
    pub fn matches(&self, repository: &str) -> bool {
        let repository = repository.to_lowercase();
        self.terms.iter().any(|term| repository.contains(term.as_str()))
    }
}

/// Keep AVM repositories that satisfy the optional search terms, in catalog order
pub fn select_repositories<'a>(
    repositories: &'a [String],
    search: Option<&SearchTerms>,
) -> Vec<&'a str> {
    repositories
        .iter()
        .map(String::as_str)
        .filter(|repo| repo.starts_with(AVM_PREFIX))
        .filter(|repo| search.is_none_or(|terms| terms.matches(repo)))
        .collect()
}

/// Client for the container registry catalog and tag endpoints
#[derive(Clone, Debug)]
pub struct RegistryClient {
    fetcher: HttpFetcher,
    base_url: String,
    max_concurrent_requests: usize,
}

impl RegistryClient {
    pub fn new(fetcher: HttpFetcher, base_url: &str, max_concurrent_requests: usize) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Every repository name the registry hosts
    pub async fn catalog(&self) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/v2/_catalog?n=10000", self.base_url);
        let catalog: Catalog = self.fetcher.get_json(&url).await?;
        Ok(catalog.repositories)
    }

    /// Published tags of one repository
    pub async fn tags(&self, repository: &str) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/v2/{}/tags/list", self.base_url, repository);
        let tags: TagList = self.fetcher.get_json(&url).await?;
        Ok(tags.tags)
    }

    /// Fetch descriptors for all matching modules. Any failed request aborts the listing.
    pub async fn fetch_modules(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<ModuleDescriptor>, FetchError> {
        let repositories = self.catalog().await?;
        let search = SearchTerms::from_filter(filter);
        let selected: Vec<String> = select_repositories(&repositories, search.as_ref())
            .into_iter()
            .map(str::to_string)
            .collect();
        tracing::info!(
            "{} of {} catalog entries match filter {:?}",
            selected.len(),
            repositories.len(),
            filter
        );

        // `buffered` keeps catalog order while fetching several tag lists at once.
        // Owned names keep the future `Send` for every caller lifetime.
        stream::iter(selected)
            .map(|repo| async move {
                tracing::info!("Processing: {}", repo);
                let versions = self.tags(&repo).await?;
                Ok::<_, FetchError>(ModuleDescriptor::new(&repo, versions))
            })
            .buffered(self.max_concurrent_requests)
            .try_collect()
            .await
    }

    /// JSON listing of matching modules, or a JSON error object
    pub async fn list_modules(&self, filter: Option<&str>) -> String {
        let result = match self.fetch_modules(filter).await {
            Ok(modules) => serde_json::to_string_pretty(&modules),
            Err(e) => {
                tracing::error!("Failed to fetch modules: {}", e);
                serde_json::to_string_pretty(&json!({
                    "error": format!("Failed to fetch modules: {e}"),
                }))
            }
        };

        // Serializing plain strings and vectors cannot fail
        result.unwrap_or_default()
    }
}

use crate::cache::CacheStore;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Looks up pull-request metadata on the code host
#[async_trait]
pub trait PrLookup: Send + Sync {
    /// Name of the branch pull request `number` was merged into
    async fn destination_branch(&self, number: u64) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    base: PullRequestBase,
}

#[derive(Debug, Deserialize)]
struct PullRequestBase {
    #[serde(rename = "ref")]
    branch: String,
}

/// [`PrLookup`] backed by the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubPrLookup {
    client: Client,
    api_url: String,
    /// `owner/name`
    repo_name: String,
    token: String,
}

impl GithubPrLookup {
    pub fn new(api_url: &str, repo_name: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("gitdot/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo_name: repo_name.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl PrLookup for GithubPrLookup {
    async fn destination_branch(&self, number: u64) -> Result<String> {
        let url = format!("{}/repos/{}/pulls/{}", self.api_url, self.repo_name, number);
        debug!(%url, "Looking up pull request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .with_context(|| format!("Failed to request PR #{}", number))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            bail!("PR #{} not found in {}", number, self.repo_name);
        } else if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("GitHub API error for PR #{}: {} - {}", number, status, body);
        }

        let pull: PullRequest = response
            .json()
            .await
            .with_context(|| format!("Unexpected response for PR #{}", number))?;
        Ok(pull.base.branch)
    }
}

/// PR number -> destination branch, as persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrCache {
    entries: BTreeMap<u64, String>,
}

impl PrCache {
    pub fn get(&self, number: u64) -> Option<&str> {
        self.entries.get(&number).map(String::as_str)
    }

    pub fn insert(&mut self, number: u64, branch: String) {
        self.entries.insert(number, branch);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wraps a lookup with a [`PrCache`] that is loaded from `store` on creation
/// and written back by [`CachedPrLookup::save`].
pub struct CachedPrLookup<L> {
    inner: L,
    cache: Mutex<PrCache>,
    dirty: Mutex<bool>,
    store: Box<dyn CacheStore<PrCache>>,
}

impl<L: PrLookup> CachedPrLookup<L> {
    pub fn load(inner: L, store: Box<dyn CacheStore<PrCache>>) -> Result<Self> {
        let cache = store.load()?.unwrap_or_default();
        info!(entries = cache.len(), "Loaded PR cache");

        Ok(Self {
            inner,
            cache: Mutex::new(cache),
            dirty: Mutex::new(false),
            store,
        })
    }

    fn cached(&self, number: u64) -> Option<String> {
        self.cache.lock().ok()?.get(number).map(str::to_string)
    }

    /// Persist the cache if any lookup added to it
    pub fn save(&self) -> Result<()> {
        let mut dirty = self.dirty.lock().map_err(|_| anyhow::anyhow!("PR cache lock poisoned"))?;
        if !*dirty {
            return Ok(());
        }

        let cache = self.cache.lock().map_err(|_| anyhow::anyhow!("PR cache lock poisoned"))?;
        self.store.save(&cache)?;
        *dirty = false;
        Ok(())
    }
}

#[async_trait]
impl<L: PrLookup> PrLookup for CachedPrLookup<L> {
    async fn destination_branch(&self, number: u64) -> Result<String> {
        if let Some(branch) = self.cached(number) {
            return Ok(branch);
        }

        let branch = self.inner.destination_branch(number).await?;
        if let (Ok(mut cache), Ok(mut dirty)) = (self.cache.lock(), self.dirty.lock()) {
            cache.insert(number, branch.clone());
            *dirty = true;
        }
        Ok(branch)
    }
}

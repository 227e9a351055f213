use crate::pr::{GithubPrLookup, GITHUB_API_URL};
use anyhow::{Context, Result};
use graph::BranchColours;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Tool configuration, read from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitdotConfig {
    /// Name of the environment variable holding the GitHub token
    pub access_token_env_var: Option<String>,
    /// GitHub repository as `owner/name`
    pub repo_name: Option<String>,
    /// Override for GitHub Enterprise installations
    pub api_url: Option<String>,
}

impl GitdotConfig {
    /// Load from `path`; a missing file yields the default configuration
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Build a GitHub lookup if the repository and a token are available.
    ///
    /// `env` resolves environment variables.
    pub fn github_lookup(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<GithubPrLookup>> {
        let (Some(var), Some(repo_name)) = (&self.access_token_env_var, &self.repo_name) else {
            info!("PR lookup disabled: no repository or token variable configured");
            return Ok(None);
        };

        let Some(token) = env(var).filter(|t| !t.is_empty()) else {
            info!(variable = %var, "PR lookup disabled: token variable is not set");
            return Ok(None);
        };

        let api_url = self.api_url.as_deref().unwrap_or(GITHUB_API_URL);
        GithubPrLookup::new(api_url, repo_name, &token).map(Some)
    }
}

/// Load the branch colour table; a missing file yields `{ "main": "red" }`
pub fn load_branch_colours(path: &Path) -> Result<BranchColours> {
    if !path.is_file() {
        return Ok(BranchColours::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read branch colours {}", path.display()))?;
    let table: HashMap<String, String> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid branch colours {}", path.display()))?;
    Ok(BranchColours::from_map(table))
}

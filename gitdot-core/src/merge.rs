use crate::pr::PrLookup;
use crate::repository::Repository;
use anyhow::Result;
use async_trait::async_trait;
use graph::MergeInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

static MERGE_PR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Merge pull request #(\d+) from \S+/(\S+)").expect("valid regex"));
static MERGE_LOCAL_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Merge branch '(\S+)' into (\S+)").expect("valid regex"));
static MERGE_REMOTE_BRANCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Merge remote-tracking branch 'origin/(\S+)' into (\S+)").expect("valid regex")
});

/// Recognised shape of a merge commit summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeSummary {
    PullRequest { number: u64, branch: String },
    Branch { src: String, dst: String },
    Other(String),
}

impl MergeSummary {
    pub fn parse(summary: &str) -> Self {
        if let Some(caps) = MERGE_PR.captures(summary) {
            if let Ok(number) = caps[1].parse() {
                return MergeSummary::PullRequest {
                    number,
                    branch: caps[2].to_string(),
                };
            }
        }

        let branch = MERGE_LOCAL_BRANCH
            .captures(summary)
            .or_else(|| MERGE_REMOTE_BRANCH.captures(summary));
        match branch {
            Some(caps) => MergeSummary::Branch {
                src: caps[1].to_string(),
                dst: caps[2].to_string(),
            },
            None => MergeSummary::Other(summary.to_string()),
        }
    }
}

/// Resolves merge metadata for a merge commit
#[async_trait(?Send)]
pub trait MergeInfoSource {
    async fn merge_info(&self, commit: &str) -> Result<MergeInfo>;
}

/// Turns merge commit summaries into [`MergeInfo`], asking the code host for
/// the destination of pull-request merges when a lookup is configured.
pub struct MergeInformant<'r> {
    repo: &'r Repository,
    pr_lookup: Option<Arc<dyn PrLookup>>,
}

impl<'r> MergeInformant<'r> {
    pub fn new(repo: &'r Repository, pr_lookup: Option<Arc<dyn PrLookup>>) -> Self {
        Self { repo, pr_lookup }
    }

    pub fn can_look_up_prs(&self) -> bool {
        self.pr_lookup.is_some()
    }

    /// Interpret a summary line. A failed PR lookup leaves the destination
    /// unknown instead of failing.
    pub async fn describe(&self, summary: &str) -> MergeInfo {
        match MergeSummary::parse(summary) {
            MergeSummary::PullRequest { number, branch } => {
                let dst = match &self.pr_lookup {
                    Some(lookup) => match lookup.destination_branch(number).await {
                        Ok(dst) => Some(dst),
                        Err(e) => {
                            warn!("Could not look up PR #{}: {:#}", number, e);
                            None
                        }
                    },
                    None => None,
                };
                MergeInfo::Branches {
                    src: format!("PR #{} {}", number, branch),
                    dst,
                }
            }
            MergeSummary::Branch { src, dst } => MergeInfo::Branches { src, dst: Some(dst) },
            MergeSummary::Other(summary) => MergeInfo::Summary(summary),
        }
    }
}

#[async_trait(?Send)]
impl MergeInfoSource for MergeInformant<'_> {
    async fn merge_info(&self, commit: &str) -> Result<MergeInfo> {
        let summary = self.repo.commit_summary(commit)?;
        Ok(self.describe(&summary).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::tests::FakeLookup;
    use crate::repository::tests::{commit_to_repo, create_test_repo};

    #[test]
    fn test_parse_summaries() {
        assert_eq!(
            MergeSummary::parse("Merge pull request #42 from octo/fix-login"),
            MergeSummary::PullRequest {
                number: 42,
                branch: "fix-login".to_string(),
            }
        );
        assert_eq!(
            MergeSummary::parse("Merge branch 'feature/x' into develop"),
            MergeSummary::Branch {
                src: "feature/x".to_string(),
                dst: "develop".to_string(),
            }
        );
        assert_eq!(
            MergeSummary::parse("Merge remote-tracking branch 'origin/hotfix' into main"),
            MergeSummary::Branch {
                src: "hotfix".to_string(),
                dst: "main".to_string(),
            }
        );
        assert_eq!(
            MergeSummary::parse("Merge branch 'topic'"),
            MergeSummary::Other("Merge branch 'topic'".to_string())
        );
        assert_eq!(
            MergeSummary::parse("Revert: Merge branch 'a' into b"),
            MergeSummary::Other("Revert: Merge branch 'a' into b".to_string())
        );
    }

    #[tokio::test]
    async fn test_describe_pull_request() -> Result<()> {
        let (dir, _git_repo) = create_test_repo()?;
        let repo = Repository::open(dir.path())?;

        let lookup: Arc<dyn PrLookup> = Arc::new(FakeLookup::with(&[(42, "main")]));
        let informant = MergeInformant::new(&repo, Some(lookup));
        assert!(informant.can_look_up_prs());

        assert_eq!(
            informant.describe("Merge pull request #42 from octo/fix-login").await,
            MergeInfo::Branches {
                src: "PR #42 fix-login".to_string(),
                dst: Some("main".to_string()),
            }
        );
        // Unknown PR: still rendered, just without a destination
        assert_eq!(
            informant.describe("Merge pull request #7 from octo/old").await,
            MergeInfo::Branches {
                src: "PR #7 old".to_string(),
                dst: None,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_info_reads_commit_summary() -> Result<()> {
        let (dir, git_repo) = create_test_repo()?;
        let base = commit_to_repo(&git_repo, "Base", &[], Some("HEAD"))?;
        let left = commit_to_repo(&git_repo, "Left", &[base], Some("HEAD"))?;
        let right = commit_to_repo(&git_repo, "Right", &[base], None)?;
        let merge = commit_to_repo(
            &git_repo,
            "Merge remote-tracking branch 'origin/right' into main\n\nDetails",
            &[left, right],
            Some("HEAD"),
        )?;

        let repo = Repository::open(dir.path())?;
        let informant = MergeInformant::new(&repo, None);
        assert!(!informant.can_look_up_prs());

        assert_eq!(
            informant.merge_info(&merge.to_string()).await?,
            MergeInfo::Branches {
                src: "right".to_string(),
                dst: Some("main".to_string()),
            }
        );
        assert!(informant.merge_info("0000000").await.is_err());
        Ok(())
    }
}

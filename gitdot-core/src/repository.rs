use anyhow::{bail, Context, Result};
use git2::{Commit, Oid, Repository as Git2Repository, Revwalk, Sort};
use std::path::Path;
use tracing::{debug, warn};

/// Produces `"%p -> %h"` log lines for a commit range
pub trait LogSource {
    fn log_lines(&self, range: &str) -> Result<Vec<String>>;
}

/// Read-only view of a git repository for graph input and merge metadata
pub struct Repository {
    git_repo: Git2Repository,
}

/// A parsed `git log` style range argument
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RangeSpec {
    /// Revisions to walk from
    include: Vec<String>,
    /// Revisions whose ancestry is excluded
    exclude: Vec<String>,
    /// `A...B` pairs, walked down to their merge base
    symmetric: Vec<(String, String)>,
    limit: Option<usize>,
}

impl RangeSpec {
    fn parse(range: &str) -> Result<Self> {
        let mut spec = RangeSpec::default();

        for token in range.split_whitespace() {
            if let Some(count) = token.strip_prefix("--max-count=") {
                let count = count
                    .parse::<usize>()
                    .with_context(|| format!("Invalid count in '{}'", range))?;
                spec.limit = Some(count);
            } else if let Some(count) = token.strip_prefix('-') {
                let count = count
                    .parse::<usize>()
                    .with_context(|| format!("Unsupported option '{}' in '{}'", token, range))?;
                spec.limit = Some(count);
            } else if let Some((a, b)) = token.split_once("...") {
                spec.symmetric.push((or_head(a), or_head(b)));
            } else if let Some((a, b)) = token.split_once("..") {
                spec.exclude.push(or_head(a));
                spec.include.push(or_head(b));
            } else if let Some(rev) = token.strip_prefix('^') {
                spec.exclude.push(rev.to_string());
            } else {
                spec.include.push(token.to_string());
            }
        }

        if spec.include.is_empty() && spec.symmetric.is_empty() {
            bail!("No revision to walk in '{}'", range);
        }
        Ok(spec)
    }
}

fn or_head(rev: &str) -> String {
    if rev.is_empty() { "HEAD".to_string() } else { rev.to_string() }
}

impl Repository {
    /// Open the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let git_repo = Git2Repository::discover(path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;

        Ok(Repository { git_repo })
    }

    /// Resolve a revision (hash, short hash, ref name, `HEAD~2`, ...) to a commit
    pub fn resolve(&self, rev: &str) -> Result<Commit<'_>> {
        self.git_repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .with_context(|| format!("Unknown revision '{}'", rev))
    }

    fn resolve_oid(&self, rev: &str) -> Result<Oid> {
        Ok(self.resolve(rev)?.id())
    }

    /// One `"<parents> -> <hash>"` line per commit in the range, with
    /// abbreviated hashes, as printed by `git log <range> --format="%p -> %h"`.
    ///
    /// Accepts revisions, `A..B`, `A...B`, `^A`, and `-N` / `--max-count=N`.
    pub fn log_records(&self, range: &str) -> Result<Vec<String>> {
        let spec = RangeSpec::parse(range)?;
        let revwalk = self.walk(&spec)?;

        let mut lines = Vec::new();
        for oid in revwalk {
            if spec.limit.is_some_and(|limit| lines.len() >= limit) {
                break;
            }
            let commit = self.git_repo.find_commit(oid?)?;
            lines.push(self.format_record(&commit)?);
        }

        debug!(%range, commits = lines.len(), "Walked commit range");
        Ok(lines)
    }

    fn walk(&self, spec: &RangeSpec) -> Result<Revwalk<'_>> {
        let mut revwalk = self.git_repo.revwalk()?;
        // Same ordering git log uses for graph output
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        for rev in &spec.include {
            revwalk.push(self.resolve_oid(rev)?)?;
        }
        for rev in &spec.exclude {
            revwalk.hide(self.resolve_oid(rev)?)?;
        }
        for (a, b) in &spec.symmetric {
            let (a, b) = (self.resolve_oid(a)?, self.resolve_oid(b)?);
            revwalk.push(a)?;
            revwalk.push(b)?;
            if let Ok(base) = self.git_repo.merge_base(a, b) {
                revwalk.hide(base)?;
            }
        }

        Ok(revwalk)
    }

    fn format_record(&self, commit: &Commit) -> Result<String> {
        let mut parents = Vec::with_capacity(commit.parent_count());
        for parent in commit.parents() {
            parents.push(short_id(&parent)?);
        }
        Ok(format!("{} -> {}", parents.join(" "), short_id(commit)?))
    }

    /// Full hash of the best common ancestor of two revisions
    pub fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        let (a_oid, b_oid) = (self.resolve_oid(a)?, self.resolve_oid(b)?);
        let base = self
            .git_repo
            .merge_base(a_oid, b_oid)
            .with_context(|| format!("No merge base between '{}' and '{}'", a, b))?;
        Ok(base.to_string())
    }

    /// Whether `ancestor` is reachable from `descendant`; a commit counts as
    /// its own ancestor. Unknown revisions are never ancestors.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let (anc, desc) = match (self.resolve_oid(ancestor), self.resolve_oid(descendant)) {
            (Ok(anc), Ok(desc)) => (anc, desc),
            (Err(e), _) | (_, Err(e)) => {
                warn!("{:#}", e);
                return false;
            }
        };

        anc == desc || self.git_repo.graph_descendant_of(desc, anc).unwrap_or(false)
    }

    /// First line of a commit's message
    pub fn commit_summary(&self, rev: &str) -> Result<String> {
        let commit = self.resolve(rev)?;
        Ok(commit.summary().unwrap_or("").to_string())
    }

    /// Ranges showing how two diverged commits relate to their merge base:
    /// the base alone, then base..a and base..b.
    ///
    /// Returns `None` when one commit descends from the other.
    pub fn pincer_ranges(&self, a: &str, b: &str) -> Result<Option<Vec<String>>> {
        if self.is_ancestor(a, b) || self.is_ancestor(b, a) {
            return Ok(None);
        }

        let base = self.merge_base(a, b)?;
        Ok(Some(vec![
            format!("{} -1", base),
            format!("{}..{}", base, a),
            format!("{}..{}", base, b),
        ]))
    }
}

impl LogSource for Repository {
    fn log_lines(&self, range: &str) -> Result<Vec<String>> {
        self.log_records(range)
    }
}

fn short_id(commit: &Commit) -> Result<String> {
    let buf = commit.as_object().short_id()?;
    Ok(buf.as_str().unwrap_or_default().to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    pub(crate) fn create_test_repo() -> Result<(TempDir, Git2Repository)> {
        let dir = TempDir::new()?;
        let repo = Git2Repository::init(dir.path())?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok((dir, repo))
    }

    pub(crate) fn commit_to_repo(
        repo: &Git2Repository,
        message: &str,
        parents: &[Oid],
        update_ref: Option<&str>,
    ) -> Result<Oid> {
        let sig = Signature::now("Test User", "test@example.com")?;
        let tree_id = repo.index()?.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let parents: Vec<Commit> = parents
            .iter()
            .map(|oid| repo.find_commit(*oid))
            .collect::<std::result::Result<_, _>>()?;
        let parent_refs: Vec<&Commit> = parents.iter().collect();

        Ok(repo.commit(update_ref, &sig, &sig, message, &tree, &parent_refs)?)
    }

    fn short(repo: &Git2Repository, oid: Oid) -> String {
        repo.find_object(oid, None)
            .unwrap()
            .short_id()
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    /// base -> main1 -> merge <- side1 <- base
    fn diverged_repo() -> Result<(TempDir, Git2Repository, [Oid; 4])> {
        let (dir, repo) = create_test_repo()?;
        let base = commit_to_repo(&repo, "Base commit", &[], Some("HEAD"))?;
        let main1 = commit_to_repo(&repo, "Main work", &[base], Some("HEAD"))?;
        let side1 = commit_to_repo(&repo, "Side work", &[base], None)?;
        let merge = commit_to_repo(
            &repo,
            "Merge branch 'side' into main",
            &[main1, side1],
            Some("HEAD"),
        )?;
        Ok((dir, repo, [base, main1, side1, merge]))
    }

    #[test]
    fn test_log_records_format() -> Result<()> {
        let (dir, git_repo, [base, main1, side1, merge]) = diverged_repo()?;
        let repo = Repository::open(dir.path())?;

        let mut lines = repo.log_records("HEAD")?;
        lines.sort();

        let mut expected = vec![
            format!(" -> {}", short(&git_repo, base)),
            format!("{} -> {}", short(&git_repo, base), short(&git_repo, main1)),
            format!("{} -> {}", short(&git_repo, base), short(&git_repo, side1)),
            format!(
                "{} {} -> {}",
                short(&git_repo, main1),
                short(&git_repo, side1),
                short(&git_repo, merge)
            ),
        ];
        expected.sort();
        assert_eq!(lines, expected);

        Ok(())
    }

    #[test]
    fn test_ranges_and_limits() -> Result<()> {
        let (dir, _git_repo, [base, main1, side1, merge]) = diverged_repo()?;
        let repo = Repository::open(dir.path())?;

        assert_eq!(repo.log_records(&format!("{} -1", merge))?.len(), 1);
        assert_eq!(repo.log_records(&format!("{}..{}", base, merge))?.len(), 3);
        assert_eq!(repo.log_records(&format!("{}...{}", main1, side1))?.len(), 2);
        assert_eq!(repo.log_records(&format!("{} ^{}", merge, main1))?.len(), 2);
        assert!(repo.log_records("--oneline").is_err());
        assert!(repo.log_records("no-such-branch").is_err());

        Ok(())
    }

    #[test]
    fn test_ancestry_queries() -> Result<()> {
        let (dir, _git_repo, [base, main1, side1, merge]) = diverged_repo()?;
        let repo = Repository::open(dir.path())?;
        let (base, main1, side1, merge) =
            (base.to_string(), main1.to_string(), side1.to_string(), merge.to_string());

        assert!(repo.is_ancestor(&base, &merge));
        assert!(repo.is_ancestor(&merge, &merge));
        assert!(!repo.is_ancestor(&merge, &base));
        assert!(!repo.is_ancestor(&main1, &side1));
        assert!(!repo.is_ancestor("deadbeef", &merge));

        assert_eq!(repo.merge_base(&main1, &side1)?, base);
        assert_eq!(repo.commit_summary(&merge)?, "Merge branch 'side' into main");

        Ok(())
    }

    #[test]
    fn test_pincer_ranges() -> Result<()> {
        let (dir, _git_repo, [base, main1, side1, merge]) = diverged_repo()?;
        let repo = Repository::open(dir.path())?;
        let (base, main1, side1, merge) =
            (base.to_string(), main1.to_string(), side1.to_string(), merge.to_string());

        assert_eq!(
            repo.pincer_ranges(&main1, &side1)?,
            Some(vec![
                format!("{} -1", base),
                format!("{}..{}", base, main1),
                format!("{}..{}", base, side1),
            ])
        );
        assert_eq!(repo.pincer_ranges(&base, &merge)?, None);

        Ok(())
    }
}

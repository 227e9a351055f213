use super::classify::classify;
use super::contract::{ChainContractor, SquashedLinks};
use crate::core::{Dag, Edge, GraphBuilder};
use crate::error::Result;
use crate::parse::Record;
use std::collections::HashSet;
use tracing::info;

/// A commit in the squashed graph as seen by a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNode {
    pub id: String,
    pub is_merge: bool,
}

/// Final nodes and edges with their merge / squashed flags, in sorted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<Edge>,
}

/// Counts from one squash pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquashSummary {
    pub chains: usize,
    pub removed_commits: usize,
}

/// Builds the ancestry graph from records and contracts its linear history
#[derive(Debug, Default)]
pub struct GraphAnalyser {
    dag: Dag,
    merge_commits: HashSet<String>,
    /// Commits that survived an earlier pass and are never contracted later
    settled: HashSet<String>,
    squashed_links: SquashedLinks,
}

impl GraphAnalyser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from a complete batch of records, then squash it.
    ///
    /// The analyser is left untouched if the batch cannot be built or
    /// contracted.
    pub fn process(&mut self, records: &[Record]) -> Result<SquashSummary> {
        let mut builder = GraphBuilder::new();
        builder.add_records(records)?;
        if builder.duplicate_edges() > 0 {
            info!(duplicates = builder.duplicate_edges(), "Ignored repeated edges");
        }

        let mut next = GraphAnalyser {
            dag: builder.build(),
            ..Self::default()
        };
        let summary = next.squash()?;
        *self = next;
        Ok(summary)
    }

    /// Classify the current graph and contract every linear chain.
    ///
    /// Commits kept by an earlier pass, merge commits included, are never
    /// contracted, so running this on a squashed graph changes nothing. On
    /// error the graph and links are left as they were.
    pub fn squash(&mut self) -> Result<SquashSummary> {
        let classification = classify(&self.dag);

        let mut candidates = classification.candidates;
        candidates.retain(|id, _| !self.settled.contains(id));

        let mut dag = self.dag.clone();
        let mut links = self.squashed_links.clone();
        let chains = ChainContractor::new(&mut dag, candidates).run(&mut links)?;

        self.merge_commits.extend(classification.merge_commits);
        self.settled.extend(dag.node_ids().into_iter().map(str::to_string));
        self.dag = dag;
        self.squashed_links = links;

        let summary = SquashSummary {
            chains: chains.len(),
            removed_commits: chains.iter().map(|c| c.interior.len()).sum(),
        };
        info!(
            chains = summary.chains,
            removed = summary.removed_commits,
            remaining = self.dag.node_count(),
            "Squashed linear history"
        );
        Ok(summary)
    }

    pub fn graph(&self) -> &Dag {
        &self.dag
    }

    pub fn is_merge_commit(&self, commit: &str) -> bool {
        self.merge_commits.contains(commit)
    }

    pub fn is_squashed_link(&self, parent: &str, child: &str) -> bool {
        self.squashed_links.contains(parent, child)
    }

    /// Merge commits in sorted order
    pub fn merge_commits(&self) -> Vec<&str> {
        let mut merges: Vec<&str> = self.merge_commits.iter().map(String::as_str).collect();
        merges.sort_unstable();
        merges
    }

    pub fn squashed_links(&self) -> &SquashedLinks {
        &self.squashed_links
    }

    /// Node and edge view of the current graph for rendering
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .dag
            .node_ids()
            .into_iter()
            .map(|id| SnapshotNode {
                id: id.to_string(),
                is_merge: self.is_merge_commit(id),
            })
            .collect();

        let edges = self
            .dag
            .edges()
            .into_iter()
            .map(|(parent, child)| {
                if self.is_squashed_link(parent, child) {
                    Edge::squashed(parent, child)
                } else if self.is_merge_commit(child) {
                    Edge::merge(parent, child)
                } else {
                    Edge::new(parent, child)
                }
            })
            .collect();

        GraphSnapshot { nodes, edges }
    }
}

use crate::core::Dag;
use std::collections::{HashMap, HashSet};

/// A commit with exactly one parent and one child, eligible for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub parent: String,
    pub node: String,
    pub child: String,
}

/// Outcome of one classification pass over a DAG
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Commits with more than one parent
    pub merge_commits: HashSet<String>,
    /// Squash candidates keyed by their own hash
    pub candidates: HashMap<String, Candidate>,
}

/// Snapshot the DAG's degrees into merge commits and squash candidates.
///
/// Roots, leaves and fan-out commits land in neither set.
pub fn classify(dag: &Dag) -> Classification {
    let mut classification = Classification::default();

    for node in dag.nodes() {
        if node.is_merge() {
            classification.merge_commits.insert(node.id.clone());
            continue;
        }

        if let (Some(parent), Some(child)) = (node.single_parent(), node.single_child()) {
            classification.candidates.insert(
                node.id.clone(),
                Candidate {
                    parent: parent.to_string(),
                    node: node.id.clone(),
                    child: child.to_string(),
                },
            );
        }
    }

    classification
}

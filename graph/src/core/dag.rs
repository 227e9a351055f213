use super::node::CommitNode;
use crate::error::{GraphError, Result};
use std::collections::HashMap;

/// Directed Acyclic Graph representing commit ancestry
///
/// Edges are stored as adjacency on both endpoints, so a (parent, child)
/// pair is present at most once no matter how often it is added.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    /// All nodes indexed by commit ID
    nodes: HashMap<String, CommitNode>,
    edge_count: usize,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit node, returning the existing one if already present
    pub fn add_node(&mut self, id: &str) -> &mut CommitNode {
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| CommitNode::new(id))
    }

    /// Add a directed edge, creating unseen endpoints.
    ///
    /// Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<bool> {
        if parent == child {
            return Err(GraphError::CycleDetected {
                node: child.to_string(),
            });
        }

        let inserted = self.add_node(parent).children.insert(child.to_string());
        self.add_node(child).parents.insert(parent.to_string());

        if inserted {
            self.edge_count += 1;
        }
        Ok(inserted)
    }

    /// Remove a node along with all of its incident edges
    pub fn remove_node(&mut self, id: &str) -> Option<CommitNode> {
        let node = self.nodes.remove(id)?;

        for parent in &node.parents {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.remove(id);
            }
        }
        for child in &node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parents.remove(id);
            }
        }
        self.edge_count -= node.parents.len() + node.children.len();

        Some(node)
    }

    pub fn get(&self, id: &str) -> Option<&CommitNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, parent: &str, child: &str) -> bool {
        self.nodes
            .get(parent)
            .is_some_and(|node| node.children.contains(child))
    }

    /// Check that `path` is a chain of consecutive edges
    pub fn is_path(&self, path: &[&str]) -> bool {
        match path {
            [] => false,
            [only] => self.contains_node(only),
            _ => path.windows(2).all(|w| self.contains_edge(w[0], w[1])),
        }
    }

    /// Iterate over all nodes in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &CommitNode> {
        self.nodes.values()
    }

    /// Node IDs in sorted order
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// All edges as (parent, child) pairs in sorted order
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .nodes
            .values()
            .flat_map(|node| {
                node.children
                    .iter()
                    .map(move |child| (node.id.as_str(), child.as_str()))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Get all root commits (no parents)
    pub fn roots(&self) -> Vec<&CommitNode> {
        self.nodes.values().filter(|node| node.is_root()).collect()
    }

    /// Get all leaf commits (no children)
    pub fn leaves(&self) -> Vec<&CommitNode> {
        self.nodes.values().filter(|node| node.is_leaf()).collect()
    }

    /// Count of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Count of edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if DAG contains orphan branches
    pub fn has_orphan_branches(&self) -> bool {
        self.roots().len() > 1
    }

    /// Get statistics about the DAG
    pub fn stats(&self) -> DagStats {
        DagStats {
            total_commits: self.nodes.len(),
            total_edges: self.edge_count,
            merge_commits: self.nodes.values().filter(|n| n.is_merge()).count(),
            root_commits: self.roots().len(),
            leaf_commits: self.leaves().len(),
            has_orphans: self.has_orphan_branches(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagStats {
    pub total_commits: usize,
    pub total_edges: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub leaf_commits: usize,
    pub has_orphans: bool,
}

use std::collections::BTreeSet;

/// A commit in the ancestry DAG together with its adjacency
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitNode {
    /// Commit hash, exactly as it appeared in the input
    pub id: String,
    /// Parent commit hashes
    pub parents: BTreeSet<String>,
    /// Child commit hashes
    pub children: BTreeSet<String>,
}

impl CommitNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a leaf commit (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Exactly one parent and exactly one child
    pub fn is_linear(&self) -> bool {
        self.parents.len() == 1 && self.children.len() == 1
    }

    pub fn single_parent(&self) -> Option<&str> {
        match self.parents.len() {
            1 => self.parents.iter().next().map(String::as_str),
            _ => None,
        }
    }

    pub fn single_child(&self) -> Option<&str> {
        match self.children.len() {
            1 => self.children.iter().next().map(String::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_predicates() {
        let mut node = CommitNode::new("b");
        assert!(node.is_root());
        assert!(node.is_leaf());
        assert_eq!(node.single_parent(), None);

        node.parents.insert("a".to_string());
        node.children.insert("c".to_string());
        assert!(node.is_linear());
        assert!(!node.is_merge());
        assert_eq!(node.single_parent(), Some("a"));
        assert_eq!(node.single_child(), Some("c"));

        node.children.insert("d".to_string());
        assert!(!node.is_linear());
        assert!(!node.is_merge());
        assert_eq!(node.single_child(), None);

        node.parents.insert("x".to_string());
        assert!(node.is_merge());
    }
}

/// An edge connecting a parent commit to one of its children
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Parent commit ID
    pub parent: String,
    /// Child commit ID
    pub child: String,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeType {
    /// Regular parent-child relationship
    Regular,
    /// Edge into a merge commit
    Merge,
    /// Synthetic edge standing in for a contracted linear chain
    Squashed,
}

impl Edge {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            edge_type: EdgeType::Regular,
        }
    }

    pub fn merge(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            edge_type: EdgeType::Merge,
            ..Self::new(parent, child)
        }
    }

    pub fn squashed(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            edge_type: EdgeType::Squashed,
            ..Self::new(parent, child)
        }
    }

    pub fn is_squashed(&self) -> bool {
        self.edge_type == EdgeType::Squashed
    }
}

use super::classify::Candidate;
use crate::core::Dag;
use crate::error::{GraphError, Result};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Synthetic edges that replaced contracted chains, queryable by exact pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquashedLinks {
    links: BTreeSet<(String, String)>,
}

impl SquashedLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parent: &str, child: &str) -> bool {
        self.links.insert((parent.to_string(), child.to_string()))
    }

    pub fn contains(&self, parent: &str, child: &str) -> bool {
        self.links
            .contains(&(parent.to_string(), child.to_string()))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Links in sorted (parent, child) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}

/// One contracted run of linear commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Surviving commit the run hangs from
    pub parent: String,
    /// Removed commits, oldest first
    pub interior: Vec<String>,
    /// Surviving commit the run leads into
    pub child: String,
}

/// Drains squash candidates, replacing each maximal linear run with one edge.
///
/// Every candidate is popped from the worklist exactly once, so the work is
/// linear in the number of candidates whatever shape the chains take.
pub struct ChainContractor<'a> {
    dag: &'a mut Dag,
    candidates: HashMap<String, Candidate>,
}

impl<'a> ChainContractor<'a> {
    pub fn new(dag: &'a mut Dag, candidates: HashMap<String, Candidate>) -> Self {
        Self { dag, candidates }
    }

    /// Contract every chain, recording the replacement edges in `links`
    pub fn run(mut self, links: &mut SquashedLinks) -> Result<Vec<Chain>> {
        // Sorted seeds keep runs reproducible; the resulting graph does not
        // depend on this order.
        let mut worklist: Vec<String> = self.candidates.keys().cloned().collect();
        worklist.sort_unstable();

        let mut chains = Vec::new();
        for seed in worklist {
            // Already absorbed into an earlier chain
            let Some(candidate) = self.candidates.remove(&seed) else {
                continue;
            };

            let chain = self.extend(candidate)?;
            self.splice(&chain)?;
            links.insert(&chain.parent, &chain.child);

            debug!(
                parent = %chain.parent,
                child = %chain.child,
                squashed = chain.interior.len(),
                "Contracted chain"
            );
            chains.push(chain);
        }

        Ok(chains)
    }

    /// Walk backward and forward from a seed through adjacent candidates
    fn extend(&mut self, seed: Candidate) -> Result<Chain> {
        let mut on_walk = HashSet::from([seed.node.clone()]);
        let mut interior = VecDeque::from([seed.node]);
        let mut parent = seed.parent;
        let mut child = seed.child;

        while let Some(prev) = self.candidates.remove(&parent) {
            on_walk.insert(prev.node.clone());
            interior.push_front(prev.node);
            parent = prev.parent;
            if on_walk.contains(&parent) {
                return Err(GraphError::CycleDetected { node: parent });
            }
        }

        while let Some(next) = self.candidates.remove(&child) {
            on_walk.insert(next.node.clone());
            interior.push_back(next.node);
            child = next.child;
            if on_walk.contains(&child) {
                return Err(GraphError::CycleDetected { node: child });
            }
        }

        if parent == child || on_walk.contains(&parent) {
            return Err(GraphError::CycleDetected { node: parent });
        }

        Ok(Chain {
            parent,
            interior: interior.into(),
            child,
        })
    }

    /// Replace a chain's interior with a single edge between its endpoints
    fn splice(&mut self, chain: &Chain) -> Result<()> {
        for endpoint in [&chain.parent, &chain.child] {
            if !self.dag.contains_node(endpoint) {
                return Err(GraphError::Invariant {
                    node: endpoint.clone(),
                    detail: format!(
                        "endpoint of chain {} -> {} is missing from the graph",
                        chain.parent, chain.child
                    ),
                });
            }
        }

        for node in &chain.interior {
            if self.dag.remove_node(node).is_none() {
                return Err(GraphError::Invariant {
                    node: node.clone(),
                    detail: format!(
                        "member of chain {} -> {} is missing from the graph",
                        chain.parent, chain.child
                    ),
                });
            }
        }

        self.dag.add_edge(&chain.parent, &chain.child)?;
        Ok(())
    }
}

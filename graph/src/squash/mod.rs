//! Merge/squash classification and linear chain contraction.

pub mod analyser;
pub mod classify;
pub mod contract;

pub use analyser::{GraphAnalyser, GraphSnapshot, SnapshotNode, SquashSummary};
pub use classify::{classify, Candidate, Classification};
pub use contract::{Chain, ChainContractor, SquashedLinks};

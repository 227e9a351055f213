//! Commit ancestry graph squashing.
//!
//! Parses `"%p -> %h"` log records into a DAG, collapses runs of linear
//! history into single squashed links, and renders the result as DOT.

pub mod core;
pub mod decor;
pub mod error;
pub mod parse;
pub mod render;
pub mod squash;

pub use self::core::{CommitNode, Dag, DagStats, Edge, EdgeType, GraphBuilder};
pub use decor::{BranchColours, Decoration, MergeDecorator, MergeInfo};
pub use error::{GraphError, Result};
pub use parse::{parse_records, Record};
pub use render::DotWriter;
pub use squash::{GraphAnalyser, GraphSnapshot, SnapshotNode, SquashSummary, SquashedLinks};

pub mod node;
pub mod edge;
pub mod dag;
pub mod builder;

pub use node::CommitNode;
pub use edge::{Edge, EdgeType};
pub use dag::{Dag, DagStats};
pub use builder::GraphBuilder;

pub mod dot;

pub use dot::{escape_label, node_id, DotWriter};

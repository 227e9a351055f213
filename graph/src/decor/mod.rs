pub mod colours;
pub mod merge;

pub use colours::BranchColours;
pub use merge::{Decoration, MergeDecorator, MergeInfo};

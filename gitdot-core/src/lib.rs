pub mod repository;
pub mod cache;
pub mod ranges;
pub mod merge;
pub mod pr;
pub mod config;

pub use repository::{LogSource, Repository};
pub use cache::{CacheStore, JsonFileStore, MemoryStore};
pub use ranges::{collect_log_lines, HistoryCheck, LastSeenResults, RangeGatherer};
pub use merge::{MergeInfoSource, MergeInformant, MergeSummary};
pub use pr::{CachedPrLookup, GithubPrLookup, PrCache, PrLookup};
pub use config::{load_branch_colours, GitdotConfig};

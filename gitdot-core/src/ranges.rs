use crate::cache::CacheStore;
use crate::repository::LogSource;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Ranges requested by the previous run and the log lines they produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSeenResults {
    pub commit_ranges: Vec<String>,
    pub uniq_git_log_lines: Vec<String>,
}

/// How a newly requested range list compares with the cached one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCheck {
    /// Every range so far matches the cached ranges in order
    Followed { matched: usize },
    /// The new ranges extend past the end of the cached ones
    Beyond { matched: usize },
    /// A range differs from, or stops short of, the cached ones
    Defied,
}

impl LastSeenResults {
    pub fn check(&self, ranges: &[String]) -> HistoryCheck {
        let matched = self
            .commit_ranges
            .iter()
            .zip(ranges)
            .take_while(|(cached, requested)| cached == requested)
            .count();

        if matched < self.commit_ranges.len() {
            // Diverged, or asked for fewer ranges than the cached lines cover
            HistoryCheck::Defied
        } else if matched < ranges.len() {
            HistoryCheck::Beyond { matched }
        } else {
            HistoryCheck::Followed { matched }
        }
    }
}

/// Union of the log lines of several ranges, in first-seen order
#[derive(Debug, Default)]
struct UniqueLines {
    lines: Vec<String>,
    seen: HashSet<String>,
}

impl UniqueLines {
    fn from_lines(lines: Vec<String>) -> Self {
        let mut unique = Self::default();
        unique.extend(lines);
        unique
    }

    fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            if self.seen.insert(line.clone()) {
                self.lines.push(line);
            }
        }
    }
}

/// Log lines of all `ranges`, de-duplicated, without any caching
pub fn collect_log_lines<S: LogSource + ?Sized>(
    source: &S,
    ranges: &[String],
) -> Result<Vec<String>> {
    let mut unique = UniqueLines::default();
    for range in ranges {
        unique.extend(source.log_lines(range)?);
    }
    Ok(unique.lines)
}

/// Gathers log lines for a list of commit ranges, re-using the previous
/// run's lines when the list only grew at the end.
pub struct RangeGatherer<S> {
    store: S,
    last_seen: LastSeenResults,
}

impl<S: CacheStore<LastSeenResults>> RangeGatherer<S> {
    pub fn load(store: S) -> Result<Self> {
        let last_seen = store.load()?.unwrap_or_default();
        Ok(Self { store, last_seen })
    }

    /// Blank ranges are ignored. The cache is saved before returning.
    pub fn gather<L: LogSource + ?Sized>(
        &mut self,
        source: &L,
        ranges: &[String],
    ) -> Result<Vec<String>> {
        let ranges: Vec<String> = ranges
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();

        let check = self.last_seen.check(&ranges);
        let (mut unique, to_scan) = match check {
            HistoryCheck::Followed { matched } | HistoryCheck::Beyond { matched } => (
                UniqueLines::from_lines(std::mem::take(&mut self.last_seen.uniq_git_log_lines)),
                &ranges[matched..],
            ),
            HistoryCheck::Defied => (UniqueLines::default(), &ranges[..]),
        };
        info!(?check, scanning = to_scan.len(), "Gathering commit ranges");

        for range in to_scan {
            let lines = source.log_lines(range)?;
            debug!(%range, lines = lines.len(), "Scanned range");
            unique.extend(lines);
        }

        self.last_seen = LastSeenResults {
            commit_ranges: ranges,
            uniq_git_log_lines: unique.lines,
        };
        self.store.save(&self.last_seen)?;

        Ok(self.last_seen.uniq_git_log_lines.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct FakeLog {
        ranges: HashMap<&'static str, Vec<&'static str>>,
        scanned: RefCell<Vec<String>>,
    }

    impl FakeLog {
        fn new() -> Self {
            Self {
                ranges: HashMap::from([
                    ("base -1", vec![" -> base"]),
                    ("base..a", vec!["x -> a", "base -> x"]),
                    ("base..b", vec!["y -> b", "base -> y", ""]),
                    ("base..c", vec!["y -> c", "base -> y"]),
                ]),
                scanned: RefCell::new(Vec::new()),
            }
        }
    }

    impl LogSource for FakeLog {
        fn log_lines(&self, range: &str) -> Result<Vec<String>> {
            self.scanned.borrow_mut().push(range.to_string());
            let lines = self
                .ranges
                .get(range)
                .ok_or_else(|| anyhow::anyhow!("unknown range {}", range))?;
            Ok(lines.iter().map(|l| l.to_string()).collect())
        }
    }

    fn ranges(list: &[&str]) -> Vec<String> {
        list.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_collect_dedups_in_order() -> Result<()> {
        let log = FakeLog::new();
        let lines = collect_log_lines(&log, &ranges(&["base..b", "base..c"]))?;
        assert_eq!(lines, vec!["y -> b", "base -> y", "y -> c"]);
        Ok(())
    }

    #[test]
    fn test_history_check() {
        let cached = LastSeenResults {
            commit_ranges: ranges(&["base -1", "base..a"]),
            uniq_git_log_lines: vec![],
        };
        assert_eq!(
            cached.check(&ranges(&["base -1", "base..a"])),
            HistoryCheck::Followed { matched: 2 }
        );
        assert_eq!(
            cached.check(&ranges(&["base -1", "base..a", "base..b"])),
            HistoryCheck::Beyond { matched: 2 }
        );
        assert_eq!(cached.check(&ranges(&["base -1", "base..b"])), HistoryCheck::Defied);
        assert_eq!(cached.check(&ranges(&["base -1"])), HistoryCheck::Defied);
        assert_eq!(
            LastSeenResults::default().check(&ranges(&["base -1"])),
            HistoryCheck::Beyond { matched: 0 }
        );
    }

    #[test]
    fn test_gather_reuses_cache_when_history_followed() -> Result<()> {
        let store = Arc::new(MemoryStore::<LastSeenResults>::default());
        let log = FakeLog::new();

        let mut gatherer = RangeGatherer::load(store.clone())?;
        let first = gatherer.gather(&log, &ranges(&["base -1", "", "base..a"]))?;
        assert_eq!(first, vec![" -> base", "x -> a", "base -> x"]);

        // A new run with one more range only scans the new one
        let log = FakeLog::new();
        let mut gatherer = RangeGatherer::load(store.clone())?;
        let second = gatherer.gather(&log, &ranges(&["base -1", "base..a", "base..b"]))?;
        assert_eq!(*log.scanned.borrow(), vec!["base..b"]);
        assert_eq!(second, vec![" -> base", "x -> a", "base -> x", "y -> b", "base -> y"]);

        let saved: LastSeenResults = store.load()?.unwrap();
        assert_eq!(saved.commit_ranges, ranges(&["base -1", "base..a", "base..b"]));
        Ok(())
    }

    #[test]
    fn test_gather_rescans_when_history_defied() -> Result<()> {
        let store = Arc::new(MemoryStore::new(Some(LastSeenResults {
            commit_ranges: ranges(&["base -1", "base..a"]),
            uniq_git_log_lines: ranges(&["stale -> line"]),
        })));
        let log = FakeLog::new();

        let mut gatherer = RangeGatherer::load(store)?;
        let lines = gatherer.gather(&log, &ranges(&["base -1", "base..c"]))?;
        assert_eq!(*log.scanned.borrow(), vec!["base -1", "base..c"]);
        assert_eq!(lines, vec![" -> base", "y -> c", "base -> y"]);
        Ok(())
    }
}

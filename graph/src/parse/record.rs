//! Parsing of `git log --format="%p -> %h"` lines.

use crate::error::{GraphError, Result};
use std::str::FromStr;

/// Token separating the parent list from the child hash
pub const SEPARATOR: &str = "->";

/// One log record: a commit and the parents it was created from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Parent hashes in the order they were listed. Empty for a root commit.
    pub parents: Vec<String>,
    pub child: String,
}

impl Record {
    pub fn parse(line: &str) -> Result<Self> {
        let mut sides = line.trim().split(SEPARATOR);

        let (lhs, rhs) = match (sides.next(), sides.next(), sides.next()) {
            (Some(lhs), Some(rhs), None) => (lhs, rhs),
            (_, None, _) => return Err(GraphError::malformed(line, "missing '->' separator")),
            _ => return Err(GraphError::malformed(line, "more than one '->' separator")),
        };

        let child = rhs.trim();
        if child.is_empty() {
            return Err(GraphError::malformed(line, "no hash on the child side"));
        }
        if child.contains(char::is_whitespace) {
            return Err(GraphError::malformed(line, "more than one hash on the child side"));
        }

        Ok(Self {
            parents: lhs.split_whitespace().map(str::to_string).collect(),
            child: child.to_string(),
        })
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_multi_parent(&self) -> bool {
        self.parents.len() > 1
    }

    /// (parent, child) pairs declared by this record
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parents
            .iter()
            .map(move |parent| (parent.as_str(), self.child.as_str()))
    }
}

impl FromStr for Record {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        Record::parse(s)
    }
}

/// Parse a batch of lines, skipping blank ones.
///
/// The first malformed line fails the whole batch.
pub fn parse_records<I, S>(lines: I) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        records.push(Record::parse(line).map_err(|e| e.at_line(idx + 1))?);
    }
    Ok(records)
}

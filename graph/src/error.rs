use thiserror::Error;

/// Result type for graph squashing operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while parsing records, building the DAG or contracting chains
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Malformed record at line {line}: {reason}\n{text}")]
    MalformedRecord {
        /// 1-based line number in the input batch (1 for a single record)
        line: usize,
        /// Offending line as given
        text: String,
        reason: &'static str,
    },

    #[error("Cycle detected at commit {node}")]
    CycleDetected { node: String },

    #[error("Inconsistent graph at commit {node}: {detail}")]
    Invariant { node: String, detail: String },
}

impl GraphError {
    pub(crate) fn malformed(text: &str, reason: &'static str) -> Self {
        GraphError::MalformedRecord {
            line: 1,
            text: text.trim_end().to_string(),
            reason,
        }
    }

    /// Re-anchor a record error to its position in a batch
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            GraphError::MalformedRecord { text, reason, .. } => {
                GraphError::MalformedRecord { line, text, reason }
            }
            other => other,
        }
    }
}

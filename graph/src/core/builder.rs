use super::dag::Dag;
use crate::error::Result;
use crate::parse::Record;

/// Accumulates parsed records into a [`Dag`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    dag: Dag,
    duplicate_edges: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one edge per parent of the record, creating unseen commits
    pub fn add_record(&mut self, record: &Record) -> Result<()> {
        // Root commits have no edges but still belong in the graph
        self.dag.add_node(&record.child);

        for (parent, child) in record.edges() {
            if !self.dag.add_edge(parent, child)? {
                self.duplicate_edges += 1;
            }
        }
        Ok(())
    }

    pub fn add_records<'r>(&mut self, records: impl IntoIterator<Item = &'r Record>) -> Result<()> {
        for record in records {
            self.add_record(record)?;
        }
        Ok(())
    }

    /// Number of edges that were declared more than once
    pub fn duplicate_edges(&self) -> usize {
        self.duplicate_edges
    }

    pub fn build(self) -> Dag {
        self.dag
    }
}

//! Graphviz DOT output for a squashed commit graph.

use crate::decor::MergeDecorator;
use crate::squash::GraphSnapshot;
use std::fmt::Write;

const INDENT: &str = "    ";
const SQUASHED_STYLE: &str = r#"[style="dashed, bold", color="red"]"#;

/// Node identifier for a commit hash. Hashes may start with a digit, which
/// DOT does not accept in a bare ID.
pub fn node_id(commit_id: &str) -> String {
    let mut id = String::with_capacity(commit_id.len() + 1);
    id.push('_');
    id.extend(
        commit_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    id
}

/// Escape special characters for a quoted DOT string
pub fn escape_label(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes a [`GraphSnapshot`] as DOT, styling merges and squashed links
pub struct DotWriter<'a> {
    decorator: &'a MergeDecorator,
}

impl<'a> DotWriter<'a> {
    pub fn new(decorator: &'a MergeDecorator) -> Self {
        Self { decorator }
    }

    pub fn render(&self, snapshot: &GraphSnapshot) -> String {
        let mut out = String::with_capacity(64 * (snapshot.nodes.len() + snapshot.edges.len()));

        out.push_str("digraph {\n");
        let _ = writeln!(out, "{INDENT}rankdir=TD");
        let _ = writeln!(
            out,
            r#"{INDENT}node [shape="box", style="filled", fillcolor="white"]"#
        );
        out.push('\n');

        for node in &snapshot.nodes {
            self.write_node(&mut out, &node.id, node.is_merge);
        }
        out.push('\n');

        for edge in &snapshot.edges {
            let _ = write!(out, "{INDENT}{} -> {}", node_id(&edge.parent), node_id(&edge.child));
            if edge.is_squashed() {
                let _ = write!(out, " {SQUASHED_STYLE}");
            }
            out.push('\n');
        }

        out.push_str("}\n");
        out
    }

    fn write_node(&self, out: &mut String, commit_id: &str, is_merge: bool) {
        let decoration = self.decorator.decorate(commit_id, is_merge);

        let _ = write!(
            out,
            r#"{INDENT}{} [fillcolor="{}""#,
            node_id(commit_id),
            escape_label(&decoration.fillcolor)
        );
        if let Some(lines) = &decoration.label {
            let label: Vec<String> = lines.iter().map(|l| escape_label(l)).collect();
            // `\n` is DOT's own line break inside a label
            let _ = write!(out, r#", label="{}""#, label.join("\\n"));
        }
        out.push_str("]\n");
    }
}

use super::colours::{BranchColours, PLAIN_COLOUR};
use std::collections::HashMap;

/// What is known about where a merge commit came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeInfo {
    /// Summary line that did not match any known merge message
    Summary(String),
    /// Source label (branch or `PR #n branch`) and destination branch
    Branches { src: String, dst: Option<String> },
}

impl MergeInfo {
    pub fn destination(&self) -> Option<&str> {
        match self {
            MergeInfo::Branches { dst, .. } => dst.as_deref(),
            MergeInfo::Summary(_) => None,
        }
    }

    /// Label lines shown under the commit hash
    pub fn describe(&self) -> Vec<String> {
        match self {
            MergeInfo::Summary(summary) => vec![summary.clone()],
            MergeInfo::Branches { src, dst } => {
                let mut lines = vec![format!("src: {}", src)];
                if let Some(dst) = dst {
                    lines.push(format!("dst: {}", dst));
                }
                lines
            }
        }
    }
}

/// Visual attributes of one commit node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub fillcolor: String,
    /// Multi-line label; `None` keeps the default label (the node id)
    pub label: Option<Vec<String>>,
}

/// Decorates commit nodes from resolved merge metadata and branch colours
#[derive(Debug, Clone, Default)]
pub struct MergeDecorator {
    infos: HashMap<String, MergeInfo>,
    colours: BranchColours,
}

impl MergeDecorator {
    pub fn new(colours: BranchColours) -> Self {
        Self {
            infos: HashMap::new(),
            colours,
        }
    }

    pub fn add_info(&mut self, commit_id: impl Into<String>, info: MergeInfo) {
        self.infos.insert(commit_id.into(), info);
    }

    pub fn decorate(&self, commit_id: &str, is_merge: bool) -> Decoration {
        if !is_merge {
            return Decoration {
                fillcolor: PLAIN_COLOUR.to_string(),
                label: None,
            };
        }

        let info = self.infos.get(commit_id);
        let mut label = vec![commit_id.to_string()];
        if let Some(info) = info {
            label.extend(info.describe());
        }

        Decoration {
            fillcolor: self
                .colours
                .merge_colour(info.and_then(MergeInfo::destination))
                .to_string(),
            label: Some(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_commit() {
        let decorator = MergeDecorator::default();
        let decoration = decorator.decorate("abc", false);
        assert_eq!(decoration.fillcolor, "white");
        assert_eq!(decoration.label, None);
    }

    #[test]
    fn test_merge_into_coloured_branch() {
        let mut decorator = MergeDecorator::new(BranchColours::default());
        decorator.add_info(
            "m1",
            MergeInfo::Branches {
                src: "PR #12 fix-login".to_string(),
                dst: Some("main".to_string()),
            },
        );

        let decoration = decorator.decorate("m1", true);
        assert_eq!(decoration.fillcolor, "red");
        assert_eq!(
            decoration.label,
            Some(vec![
                "m1".to_string(),
                "src: PR #12 fix-login".to_string(),
                "dst: main".to_string(),
            ])
        );
    }

    #[test]
    fn test_merge_with_free_summary_or_no_info() {
        let mut decorator = MergeDecorator::default();
        decorator.add_info("m2", MergeInfo::Summary("Octopus merge".to_string()));

        let summarised = decorator.decorate("m2", true);
        assert_eq!(summarised.fillcolor, "yellow");
        assert_eq!(
            summarised.label,
            Some(vec!["m2".to_string(), "Octopus merge".to_string()])
        );

        let unknown = decorator.decorate("m3", true);
        assert_eq!(unknown.label, Some(vec!["m3".to_string()]));
    }
}

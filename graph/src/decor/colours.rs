use std::collections::HashMap;

/// Fill colour of commits that are not merge commits
pub const PLAIN_COLOUR: &str = "white";
/// Fill colour of merge commits whose destination branch has no entry
pub const MERGE_COLOUR: &str = "yellow";

/// Destination branch name -> Graphviz fill colour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchColours {
    colours: HashMap<String, String>,
}

impl Default for BranchColours {
    fn default() -> Self {
        Self::from_map(HashMap::from([("main".to_string(), "red".to_string())]))
    }
}

impl BranchColours {
    pub fn from_map(colours: HashMap<String, String>) -> Self {
        Self { colours }
    }

    pub fn set(&mut self, branch: impl Into<String>, colour: impl Into<String>) {
        self.colours.insert(branch.into(), colour.into());
    }

    /// Colour for a merge into `branch`
    pub fn merge_colour(&self, branch: Option<&str>) -> &str {
        branch
            .and_then(|b| self.colours.get(b))
            .map(String::as_str)
            .unwrap_or(MERGE_COLOUR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let colours = BranchColours::default();
        assert_eq!(colours.merge_colour(Some("main")), "red");
        assert_eq!(colours.merge_colour(Some("develop")), MERGE_COLOUR);
        assert_eq!(colours.merge_colour(None), MERGE_COLOUR);
    }

    #[test]
    fn test_custom_table_replaces_default() {
        let mut colours = BranchColours::from_map(HashMap::new());
        colours.set("release", "green");
        assert_eq!(colours.merge_colour(Some("release")), "green");
        assert_eq!(colours.merge_colour(Some("main")), MERGE_COLOUR);
    }
}

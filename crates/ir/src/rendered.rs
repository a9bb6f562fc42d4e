//! Rendered migration bodies

use serde::{Deserialize, Serialize};

/// The `up` and `down` bodies of a migration, one entry per output line.
///
/// Lines carry their own indentation except the first, which the migration
/// stub already indents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMigration {
    pub up: Vec<String>,
    pub down: Vec<String>,
}

impl RenderedMigration {
    pub fn new(up: Vec<String>, down: Vec<String>) -> Self {
        Self { up, down }
    }

    /// `up` body ready for templating
    pub fn up_text(&self) -> String {
        self.up.join("\n")
    }

    /// `down` body ready for templating
    pub fn down_text(&self) -> String {
        self.down.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_joins_lines() {
        let rendered = RenderedMigration::new(
            vec!["a".to_string(), "    b".to_string()],
            vec!["c".to_string()],
        );
        assert_eq!(rendered.up_text(), "a\n    b");
        assert_eq!(rendered.down_text(), "c");
    }
}

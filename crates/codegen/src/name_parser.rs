//! # Name Interpreter
//!
//! Decodes a migration name into a [`MigrationIntent`].
//!
//! ```text
//! create_posts_table              → Create posts
//! add_views_to_posts_table        → Add    posts
//! add_user_id_to_comments_table   → Add    comments (related: users)
//! remove_votes_from_posts_table   → Remove posts
//! ```

use forge_core::{ForgeError, ForgeResult, Validatable, naming};
use forge_ir::vocabulary::TABLE_SUFFIX;
use forge_ir::{MigrationAction, MigrationIntent};
use serde::{Deserialize, Serialize};

/// What to do when a migration name does not start with a known verb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbFallback {
    /// Read the whole name as the target of an `add` migration
    #[default]
    Add,
    /// Fail with `InvalidName`
    Reject,
}

/// Parses migration names into intents
#[derive(Debug, Clone, Copy, Default)]
pub struct NameParser {
    fallback: VerbFallback,
}

impl NameParser {
    pub fn new(fallback: VerbFallback) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> VerbFallback {
        self.fallback
    }

    /// Parse a migration name.
    ///
    /// # Errors
    ///
    /// `InvalidName` if the name is blank, names no table, or (with
    /// [`VerbFallback::Reject`]) lacks a recognized verb.
    pub fn parse(&self, name: &str) -> ForgeResult<MigrationIntent> {
        let raw = name.trim();
        if raw.is_empty() {
            return Err(ForgeError::invalid_name(name, "migration name is empty"));
        }

        let normalized = naming::snake(raw);
        let mut words: Vec<&str> = normalized.split('_').filter(|w| !w.is_empty()).collect();
        if words.is_empty() {
            return Err(ForgeError::invalid_name(raw, "migration name has no words"));
        }

        let action = match MigrationAction::from_verb(words[0]) {
            Some(action) => {
                words.remove(0);
                action
            }
            None => match self.fallback {
                VerbFallback::Add => {
                    tracing::warn!(
                        name = raw,
                        "no recognized verb in migration name, treating it as an add migration"
                    );
                    MigrationAction::Add
                }
                VerbFallback::Reject => {
                    return Err(ForgeError::invalid_name(
                        raw,
                        format!("'{}' is not a recognized verb", words[0]),
                    ));
                }
            },
        };

        if words.last() == Some(&TABLE_SUFFIX) {
            words.pop();
        }

        let intent = match action {
            MigrationAction::Create => {
                if words.is_empty() {
                    return Err(ForgeError::invalid_name(raw, "no table name"));
                }
                MigrationIntent::create(&normalized, naming::pluralize(&words.join("_")))
            }
            MigrationAction::Add | MigrationAction::Remove => {
                let split = words
                    .iter()
                    .rposition(|w| action.connectives().contains(w));
                let (hint, target) = match split {
                    Some(i) => (&words[..i], &words[i + 1..]),
                    None => (&words[..0], &words[..]),
                };
                if target.is_empty() {
                    return Err(ForgeError::invalid_name(raw, "no table name"));
                }

                let mut intent = MigrationIntent::new(
                    &normalized,
                    action,
                    naming::pluralize(&target.join("_")),
                );
                if let Some(related) = related_table(hint) {
                    intent = intent.with_related_table(related);
                }
                intent
            }
        };

        intent.validate().map_err(|e| match e {
            ForgeError::Validation(reason) => ForgeError::invalid_name(raw, reason),
            other => other,
        })?;

        tracing::debug!(
            action = %intent.action,
            table = %intent.table,
            related = ?intent.related_table,
            "parsed migration name"
        );

        Ok(intent)
    }
}

/// `user_id` → `users`; anything not ending in `_id` names no table
fn related_table(hint: &[&str]) -> Option<String> {
    match hint.split_last() {
        Some((&"id", rest)) if !rest.is_empty() => Some(naming::pluralize(&rest.join("_"))),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> MigrationIntent {
        NameParser::default().parse(name).unwrap()
    }

    #[test]
    fn test_create() {
        let intent = parse("create_posts_table");
        assert_eq!(intent.action, MigrationAction::Create);
        assert_eq!(intent.table, "posts");
        assert_eq!(intent.related_table, None);
        assert_eq!(intent.class_name(), "CreatePostsTable");
    }

    #[test]
    fn test_create_pluralizes_and_lowercases() {
        assert_eq!(parse("create_post_table").table, "posts");
        assert_eq!(parse("CreateBlogPostTable").table, "blog_posts");
        assert_eq!(parse("create_category").table, "categories");
        assert_eq!(parse("CREATE_USERS_TABLE").table, "users");
    }

    #[test]
    fn test_add_with_connective() {
        let intent = parse("add_views_to_posts_table");
        assert_eq!(intent.action, MigrationAction::Add);
        assert_eq!(intent.table, "posts");
        assert_eq!(intent.related_table, None);
    }

    #[test]
    fn test_add_foreign_key_hint_sets_related_table() {
        let intent = parse("add_user_id_to_comments_table");
        assert_eq!(intent.table, "comments");
        assert_eq!(intent.related_table.as_deref(), Some("users"));
    }

    #[test]
    fn test_remove_with_connective() {
        let intent = parse("remove_votes_from_posts_table");
        assert_eq!(intent.action, MigrationAction::Remove);
        assert_eq!(intent.table, "posts");

        assert_eq!(parse("drop_votes_from_posts").action, MigrationAction::Remove);
        assert_eq!(parse("delete_votes_from_posts").action, MigrationAction::Remove);
    }

    #[test]
    fn test_insert_is_add() {
        let intent = parse("insert_slug_into_articles_table");
        assert_eq!(intent.action, MigrationAction::Add);
        assert_eq!(intent.table, "articles");
    }

    #[test]
    fn test_last_connective_wins() {
        let intent = parse("add_path_to_file_to_uploads_table");
        assert_eq!(intent.table, "uploads");
    }

    #[test]
    fn test_add_without_connective() {
        let intent = parse("add_posts_table");
        assert_eq!(intent.action, MigrationAction::Add);
        assert_eq!(intent.table, "posts");
        assert_eq!(intent.related_table, None);
    }

    #[test]
    fn test_from_is_not_an_add_connective() {
        let intent = parse("add_views_from_posts");
        assert_eq!(intent.table, "views_from_posts");
    }

    #[test]
    fn test_unknown_verb_falls_back_to_add() {
        let intent = parse("views_to_posts_table");
        assert_eq!(intent.action, MigrationAction::Add);
        assert_eq!(intent.table, "posts");
    }

    #[test]
    fn test_unknown_verb_rejected_when_strict() {
        let err = NameParser::new(VerbFallback::Reject)
            .parse("rename_posts_table")
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidName { .. }));
        assert!(err.to_string().contains("'rename' is not a recognized verb"));
    }

    #[test]
    fn test_empty_name_is_invalid() {
        for name in ["", "   ", "\t\n"] {
            let err = NameParser::default().parse(name).unwrap_err();
            assert!(matches!(err, ForgeError::InvalidName { .. }), "{name:?}");
        }
    }

    #[test]
    fn test_missing_table_is_invalid() {
        for name in ["create_table", "create", "add_views_to", "remove_votes_from_table"] {
            let err = NameParser::default().parse(name).unwrap_err();
            assert!(matches!(err, ForgeError::InvalidName { .. }), "{name}");
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = NameParser::default();
        assert_eq!(
            parser.parse("add_user_id_to_comments_table").unwrap(),
            parser.parse("add_user_id_to_comments_table").unwrap()
        );
    }
}

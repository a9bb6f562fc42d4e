//! Migration intents
//!
//! A `MigrationIntent` is what a migration name means: which action to take
//! and on which table. A `PivotIntent` describes a join table between two
//! tables.

use forge_core::{ForgeError, ForgeResult, Validatable, is_identifier, naming};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocabulary::{ADD_CONNECTIVES, REMOVE_CONNECTIVES, VERBS};

// ============================================================================
// MigrationAction
// ============================================================================

/// What a migration does to its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationAction {
    /// Create a new table
    Create,
    /// Add columns to an existing table
    Add,
    /// Remove columns from an existing table
    Remove,
}

impl MigrationAction {
    /// Look up a leading verb token (case-insensitive)
    pub fn from_verb(verb: &str) -> Option<Self> {
        let verb = verb.to_ascii_lowercase();
        VERBS
            .iter()
            .find(|(keyword, _)| *keyword == verb)
            .map(|(_, action)| *action)
    }

    /// Tokens that separate the column hint from the table name
    pub fn connectives(&self) -> &'static [&'static str] {
        match self {
            MigrationAction::Create => &[],
            MigrationAction::Add => ADD_CONNECTIVES,
            MigrationAction::Remove => REMOVE_CONNECTIVES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationAction::Create => "create",
            MigrationAction::Add => "add",
            MigrationAction::Remove => "remove",
        }
    }
}

impl fmt::Display for MigrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MigrationIntent
// ============================================================================

/// The decoded meaning of a migration name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationIntent {
    /// Normalized (snake_case) migration name
    pub name: String,

    /// Action to perform
    pub action: MigrationAction,

    /// Target table (snake_case, plural)
    pub table: String,

    /// Table referenced by the column hint of an add/remove migration
    /// (e.g. `users` for `add_user_id_to_comments_table`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_table: Option<String>,
}

impl MigrationIntent {
    /// Create an intent with the given action
    pub fn new(name: impl Into<String>, action: MigrationAction, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action,
            table: table.into(),
            related_table: None,
        }
    }

    /// Intent for a `create_<table>_table` migration
    pub fn create(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(name, MigrationAction::Create, table)
    }

    /// Intent for an `add_<columns>_to_<table>_table` migration
    pub fn add(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(name, MigrationAction::Add, table)
    }

    /// Intent for a `remove_<columns>_from_<table>_table` migration
    pub fn remove(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(name, MigrationAction::Remove, table)
    }

    /// Set the related table
    pub fn with_related_table(mut self, table: impl Into<String>) -> Self {
        self.related_table = Some(table.into());
        self
    }

    /// Class name of the generated migration (e.g. `CreatePostsTable`)
    pub fn class_name(&self) -> String {
        naming::class_name(&self.name)
    }

    /// Name of the companion model (e.g. `Post` for `posts`)
    pub fn model_name(&self) -> String {
        naming::model_name(&self.table)
    }
}

impl Validatable for MigrationIntent {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.trim().is_empty() {
            return Err(ForgeError::validation("Migration name cannot be empty"));
        }
        if !is_identifier(&self.table) {
            return Err(ForgeError::validation(format!(
                "Table name '{}' is not a valid identifier",
                self.table
            )));
        }
        match (self.action, &self.related_table) {
            (MigrationAction::Create, Some(related)) => Err(ForgeError::validation(format!(
                "A create migration cannot reference a related table ('{}')",
                related
            ))),
            (_, Some(related)) if !is_identifier(related) => Err(ForgeError::validation(format!(
                "Related table name '{}' is not a valid identifier",
                related
            ))),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// PivotIntent
// ============================================================================

/// A join table between two tables. Both sides are stored singular and in
/// alphabetical order, so `pivot(tags, posts)` and `pivot(posts, tags)` are
/// the same table: `post_tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotIntent {
    first: String,
    second: String,
}

impl PivotIntent {
    pub fn new(table_one: &str, table_two: &str) -> Self {
        let mut pair = [
            naming::singularize(table_one),
            naming::singularize(table_two),
        ];
        pair.sort();
        let [first, second] = pair;
        Self { first, second }
    }

    /// Singular name of the first side (e.g. `post`)
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Singular name of the second side (e.g. `tag`)
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Pivot table name (e.g. `post_tag`)
    pub fn table(&self) -> String {
        format!("{}_{}", self.first, self.second)
    }

    /// Migration name (e.g. `create_post_tag_pivot_table`)
    pub fn name(&self) -> String {
        format!("create_{}_pivot_table", self.table())
    }

    pub fn class_name(&self) -> String {
        naming::class_name(&self.name())
    }

    /// Referenced tables, in column order (e.g. `posts`, `tags`)
    pub fn tables(&self) -> [String; 2] {
        [
            naming::pluralize(&self.first),
            naming::pluralize(&self.second),
        ]
    }

    /// Foreign-key columns, in column order (e.g. `post_id`, `tag_id`)
    pub fn columns(&self) -> [String; 2] {
        [format!("{}_id", self.first), format!("{}_id", self.second)]
    }
}

impl Validatable for PivotIntent {
    fn validate(&self) -> ForgeResult<()> {
        for side in [&self.first, &self.second] {
            if !is_identifier(side) {
                return Err(ForgeError::validation(format!(
                    "Pivot table side '{}' is not a valid identifier",
                    side
                )));
            }
        }
        if self.first == self.second {
            return Err(ForgeError::validation(format!(
                "A pivot table needs two different tables, got '{}' twice",
                self.first
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

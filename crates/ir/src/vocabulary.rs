//! Keyword tables shared by the name interpreter and the schema parser.
//!
//! All lookups are case-insensitive; keys here are lower-case.

use crate::field::Modifier;
use crate::intent::MigrationAction;

/// Leading verbs of a migration name
pub const VERBS: &[(&str, MigrationAction)] = &[
    ("create", MigrationAction::Create),
    ("add", MigrationAction::Add),
    ("insert", MigrationAction::Add),
    ("remove", MigrationAction::Remove),
    ("delete", MigrationAction::Remove),
    ("drop", MigrationAction::Remove),
];

/// Separate the column hint from the table in `add_<cols>_to_<table>`
pub const ADD_CONNECTIVES: &[&str] = &["to", "into"];

/// Separate the column hint from the table in `remove_<cols>_from_<table>`
pub const REMOVE_CONNECTIVES: &[&str] = &["from"];

/// Optional trailing token of a migration name
pub const TABLE_SUFFIX: &str = "table";

/// Modifier keywords accepted in a schema string
pub const MODIFIERS: &[(&str, Modifier)] = &[
    ("unsigned", Modifier::Unsigned),
    ("unique", Modifier::Unique),
    ("index", Modifier::Index),
    ("nullable", Modifier::Nullable),
    ("default", Modifier::Default),
    ("comment", Modifier::Comment),
    ("foreign", Modifier::Foreign),
    ("cascade", Modifier::Cascade),
];

/// Bare tokens that count as literals in an argument list
pub const LITERAL_KEYWORDS: &[&str] = &["true", "false", "null"];

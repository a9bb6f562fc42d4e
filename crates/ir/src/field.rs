//! Field descriptors
//!
//! This module contains the `FieldDescriptor` struct and the closed sets it
//! is built from: column types (`FieldType`) and column modifiers
//! (`Modifier`).

use forge_core::{ForgeError, ForgeResult, Validatable, is_identifier, naming};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::vocabulary::MODIFIERS;

// ============================================================================
// FieldType
// ============================================================================

/// Column type tags understood by the schema builder.
///
/// Tokens outside the recognized set are kept verbatim in `Custom` and
/// rendered as the builder method name as typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    Char,
    Text,
    MediumText,
    LongText,
    Integer,
    TinyInteger,
    SmallInteger,
    MediumInteger,
    BigInteger,
    UnsignedInteger,
    UnsignedBigInteger,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    DateTimeTz,
    Time,
    Timestamp,
    TimestampTz,
    Year,
    Binary,
    Json,
    Jsonb,
    Uuid,
    /// Enumeration; arguments are the allowed values
    Enum,
    /// Foreign-key reference marker; implies a constraint statement
    ForeignKey,
    /// Unrecognized type token, passed through unchanged
    Custom(String),
}

impl FieldType {
    /// Resolve a type token (case-insensitive, with a few aliases)
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "string" | "varchar" => FieldType::String,
            "char" => FieldType::Char,
            "text" => FieldType::Text,
            "mediumtext" => FieldType::MediumText,
            "longtext" => FieldType::LongText,
            "integer" | "int" => FieldType::Integer,
            "tinyinteger" | "tinyint" => FieldType::TinyInteger,
            "smallinteger" | "smallint" => FieldType::SmallInteger,
            "mediuminteger" | "mediumint" => FieldType::MediumInteger,
            "biginteger" | "bigint" => FieldType::BigInteger,
            "unsignedinteger" => FieldType::UnsignedInteger,
            "unsignedbiginteger" => FieldType::UnsignedBigInteger,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "decimal" => FieldType::Decimal,
            "boolean" | "bool" => FieldType::Boolean,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "datetimetz" => FieldType::DateTimeTz,
            "time" => FieldType::Time,
            "timestamp" => FieldType::Timestamp,
            "timestamptz" => FieldType::TimestampTz,
            "year" => FieldType::Year,
            "binary" => FieldType::Binary,
            "json" => FieldType::Json,
            "jsonb" => FieldType::Jsonb,
            "uuid" => FieldType::Uuid,
            "enum" => FieldType::Enum,
            "foreign" | "foreignid" | "references" => FieldType::ForeignKey,
            _ => FieldType::Custom(token.to_string()),
        }
    }

    /// Schema-builder method that declares a column of this type
    pub fn method(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Char => "char",
            FieldType::Text => "text",
            FieldType::MediumText => "mediumText",
            FieldType::LongText => "longText",
            FieldType::Integer => "integer",
            FieldType::TinyInteger => "tinyInteger",
            FieldType::SmallInteger => "smallInteger",
            FieldType::MediumInteger => "mediumInteger",
            FieldType::BigInteger => "bigInteger",
            FieldType::UnsignedInteger => "unsignedInteger",
            FieldType::UnsignedBigInteger | FieldType::ForeignKey => "unsignedBigInteger",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "dateTime",
            FieldType::DateTimeTz => "dateTimeTz",
            FieldType::Time => "time",
            FieldType::Timestamp => "timestamp",
            FieldType::TimestampTz => "timestampTz",
            FieldType::Year => "year",
            FieldType::Binary => "binary",
            FieldType::Json => "json",
            FieldType::Jsonb => "jsonb",
            FieldType::Uuid => "uuid",
            FieldType::Enum => "enum",
            FieldType::Custom(token) => token,
        }
    }

    /// Whether this is the foreign-key reference marker
    pub fn is_foreign_key(&self) -> bool {
        matches!(self, FieldType::ForeignKey)
    }

    /// Whether bare identifiers are accepted as constructor arguments
    /// (enum values, foreign-key targets)
    pub fn takes_identifier_arguments(&self) -> bool {
        matches!(self, FieldType::Enum | FieldType::ForeignKey)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

// ============================================================================
// Modifier
// ============================================================================

/// Column modifiers recognized in a schema string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    Unsigned,
    Unique,
    Index,
    Nullable,
    Default,
    Comment,
    /// Adds a foreign-key constraint, optionally naming the target
    Foreign,
    /// Cascades deletes through the foreign-key constraint
    Cascade,
}

/// How a modifier takes its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    /// Present or absent; an explicit value must be `true` or `false`
    Flag,
    /// Requires a literal value in parentheses
    Literal,
    /// Flag that may carry an optional value
    OptionalLiteral,
}

impl Modifier {
    /// Order in which modifiers are chained onto a column declaration,
    /// independent of the order they were written in.
    pub const CANONICAL_ORDER: [Modifier; 6] = [
        Modifier::Unsigned,
        Modifier::Unique,
        Modifier::Index,
        Modifier::Nullable,
        Modifier::Default,
        Modifier::Comment,
    ];

    /// Look up a modifier keyword (case-insensitive)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.to_ascii_lowercase();
        MODIFIERS
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, modifier)| *modifier)
    }

    /// Schema-builder method name
    pub fn keyword(&self) -> &'static str {
        match self {
            Modifier::Unsigned => "unsigned",
            Modifier::Unique => "unique",
            Modifier::Index => "index",
            Modifier::Nullable => "nullable",
            Modifier::Default => "default",
            Modifier::Comment => "comment",
            Modifier::Foreign => "foreign",
            Modifier::Cascade => "cascade",
        }
    }

    pub fn kind(&self) -> ModifierKind {
        match self {
            Modifier::Unsigned
            | Modifier::Unique
            | Modifier::Index
            | Modifier::Nullable
            | Modifier::Cascade => ModifierKind::Flag,
            Modifier::Default | Modifier::Comment => ModifierKind::Literal,
            Modifier::Foreign => ModifierKind::OptionalLiteral,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Value attached to a modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierValue {
    /// Modifier given without a value
    Flag,
    /// Literal value, emitted exactly as written
    Literal(String),
}

impl ModifierValue {
    pub fn literal(&self) -> Option<&str> {
        match self {
            ModifierValue::Flag => None,
            ModifierValue::Literal(value) => Some(value),
        }
    }
}

// ============================================================================
// ForeignKeyRef
// ============================================================================

/// Target of a foreign-key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// Referenced table
    pub table: String,

    /// Referenced column
    pub column: String,

    /// Referential action on delete (e.g. `cascade`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

impl ForeignKeyRef {
    /// Reference to `table.id`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: "id".to_string(),
            on_delete: None,
        }
    }

    /// Parse an explicit target: `table` or `table.column`
    pub fn parse_target(target: &str) -> Self {
        let target = target.trim().trim_matches(|c| c == '\'' || c == '"');
        match target.split_once('.') {
            Some((table, column)) => Self::new(table).with_column(column),
            None => Self::new(target),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = Some(action.into());
        self
    }
}

// ============================================================================
// FieldDescriptor
// ============================================================================

/// One column parsed from a schema string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name
    pub name: String,

    /// Column type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Literal constructor arguments (length, precision, enum values, ...)
    pub arguments: Vec<String>,

    /// Modifiers keyed by the recognized modifier set
    pub options: BTreeMap<Modifier, ModifierValue>,
}

impl FieldDescriptor {
    /// Create a field with no arguments and no modifiers
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            arguments: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Append a constructor argument
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Set a value-less modifier
    pub fn with_flag(mut self, modifier: Modifier) -> Self {
        self.options.insert(modifier, ModifierValue::Flag);
        self
    }

    /// Set a modifier with a literal value
    pub fn with_value(mut self, modifier: Modifier, value: impl Into<String>) -> Self {
        self.options.insert(modifier, ModifierValue::Literal(value.into()));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn has(&self, modifier: Modifier) -> bool {
        self.options.contains_key(&modifier)
    }

    /// Literal value of a modifier, if any
    pub fn value(&self, modifier: Modifier) -> Option<&str> {
        self.options.get(&modifier).and_then(ModifierValue::literal)
    }

    pub fn is_unique(&self) -> bool {
        self.has(Modifier::Unique)
    }

    pub fn is_nullable(&self) -> bool {
        self.has(Modifier::Nullable)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.value(Modifier::Default)
    }

    /// Arguments passed to the column declaration. Foreign-key marker
    /// arguments name the constraint target instead.
    pub fn column_arguments(&self) -> &[String] {
        if self.field_type.is_foreign_key() {
            &[]
        } else {
            &self.arguments
        }
    }

    /// Foreign-key constraint implied by this field, if any.
    ///
    /// The target is taken from `foreign(<target>)`, then from the first
    /// argument of a foreign-key typed field, and otherwise inferred from the
    /// column name (`user_id` → `users.id`).
    pub fn foreign_key(&self) -> Option<ForeignKeyRef> {
        if !self.field_type.is_foreign_key() && !self.has(Modifier::Foreign) {
            return None;
        }

        let explicit = self.value(Modifier::Foreign).or_else(|| {
            self.arguments
                .first()
                .map(String::as_str)
                .filter(|_| self.field_type.is_foreign_key())
        });

        let mut reference = match explicit {
            Some(target) => ForeignKeyRef::parse_target(target),
            None => ForeignKeyRef::new(naming::foreign_table(&self.name)),
        };

        if self.field_type.is_foreign_key() && self.value(Modifier::Foreign).is_none() {
            if let Some(column) = self.arguments.get(1) {
                reference = reference.with_column(column.trim_matches(|c| c == '\'' || c == '"'));
            }
        }

        if self.has(Modifier::Cascade) {
            reference = reference.on_delete("cascade");
        }

        Some(reference)
    }
}

impl Validatable for FieldDescriptor {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.is_empty() {
            return Err(ForgeError::validation("missing column name"));
        }
        if !is_identifier(&self.name) {
            return Err(ForgeError::validation(format!(
                "'{}' is not a valid column name",
                self.name
            )));
        }
        if let FieldType::Custom(token) = &self.field_type {
            if !is_identifier(token) {
                return Err(ForgeError::validation(format!(
                    "'{}' is not a valid column type",
                    token
                )));
            }
        }
        for (modifier, value) in &self.options {
            match (modifier.kind(), value) {
                (ModifierKind::Flag, ModifierValue::Literal(_)) => {
                    return Err(ForgeError::validation(format!(
                        "modifier '{}' does not take a value",
                        modifier
                    )));
                }
                (ModifierKind::Literal, ModifierValue::Flag) => {
                    return Err(ForgeError::validation(format!(
                        "modifier '{}' requires a value",
                        modifier
                    )));
                }
                _ => {}
            }
        }
        if self.has(Modifier::Cascade) && self.foreign_key().is_none() {
            return Err(ForgeError::validation(
                "modifier 'cascade' needs a foreign key",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

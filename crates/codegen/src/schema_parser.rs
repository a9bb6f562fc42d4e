//! # Schema Grammar Parser
//!
//! Parses a compact schema string into an ordered list of
//! [`FieldDescriptor`]s.
//!
//! ## Grammar
//!
//! ```text
//! schema   := field ("," field)*
//! field    := name ":" type ["(" args ")"] (":" segment)*
//! segment  := item ("," item)*
//! item     := keyword ["(" value ")"] | literal
//! ```
//!
//! The first segment after the type holds constructor arguments when it is
//! made of literals (`decimal:8,2`), or of identifiers for types that take
//! them (`enum:draft,published`, `foreign:users`). Every other segment is a
//! list of modifiers. Commas and colons inside parentheses or quotes are
//! literal. A comma-separated piece continues the previous field only when it
//! is a literal, a recognized modifier, or another enum value, so
//! `email:string:100:unique,nullable,views:integer` is two fields and the
//! `body` in `title:string:nullable, body` is a second, malformed field.

use forge_core::{ForgeError, ForgeResult, Validatable, is_identifier};
use forge_ir::vocabulary::LITERAL_KEYWORDS;
use forge_ir::{FieldDescriptor, FieldType, Modifier, ModifierKind, ModifierValue};
use serde::{Deserialize, Serialize};

/// What to do with modifier keywords outside the recognized set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierPolicy {
    /// Fail with `UnsupportedModifier`
    #[default]
    Reject,
    /// Drop the modifier and log a warning
    Ignore,
}

/// Parses schema strings into field descriptors
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaParser {
    policy: ModifierPolicy,
}

impl SchemaParser {
    pub fn new(policy: ModifierPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ModifierPolicy {
        self.policy
    }

    /// Parse a schema string. An empty string yields no fields.
    ///
    /// # Errors
    ///
    /// `MalformedField` for a chunk missing its name or type, or with a
    /// modifier value that cannot be used; `UnsupportedModifier` for an
    /// unknown modifier under [`ModifierPolicy::Reject`].
    pub fn parse(&self, schema: &str) -> ForgeResult<Vec<FieldDescriptor>> {
        field_chunks(schema)
            .iter()
            .enumerate()
            .map(|(i, chunk)| self.parse_field(i + 1, chunk))
            .collect()
    }

    fn parse_field(&self, index: usize, chunk: &str) -> ForgeResult<FieldDescriptor> {
        let malformed = |reason: &str| ForgeError::malformed_field(index, chunk, reason);

        if !is_balanced(chunk) {
            return Err(malformed("unbalanced parentheses or quotes"));
        }

        let segments: Vec<&str> = split_top_level(chunk, ':').into_iter().map(str::trim).collect();

        let name = segments[0];
        if name.is_empty() {
            return Err(malformed("missing column name"));
        }
        let type_token = match segments.get(1) {
            Some(token) if !token.is_empty() => *token,
            _ => return Err(malformed("missing column type")),
        };

        let (type_name, inline_arguments) = split_call(type_token).map_err(|r| malformed(r))?;
        if type_name.is_empty() {
            return Err(malformed("missing column type"));
        }

        let mut field = FieldDescriptor::new(name, FieldType::from_token(type_name));
        if let Some(arguments) = inline_arguments {
            field.arguments = split_list(arguments);
        }

        let mut rest = &segments[2..];
        if let Some(first) = rest.first() {
            let items = split_list(first);
            if is_argument_list(&items, &field.field_type) {
                if !field.arguments.is_empty() {
                    return Err(malformed("constructor arguments given twice"));
                }
                field.arguments = items;
                rest = &rest[1..];
            }
        }

        for segment in rest {
            for item in split_list(segment) {
                self.apply_modifier(index, chunk, &mut field, &item)?;
            }
        }

        field.validate().map_err(|e| match e {
            ForgeError::Validation(reason) => malformed(&reason),
            other => other,
        })?;

        tracing::debug!(
            index,
            name = %field.name,
            field_type = %field.field_type,
            arguments = ?field.arguments,
            "parsed field"
        );

        Ok(field)
    }

    fn apply_modifier(
        &self,
        index: usize,
        chunk: &str,
        field: &mut FieldDescriptor,
        item: &str,
    ) -> ForgeResult<()> {
        let malformed = |reason: String| ForgeError::malformed_field(index, chunk, reason);

        let (keyword, value) = split_call(item).map_err(|r| malformed(r.to_string()))?;

        let Some(modifier) = Modifier::from_keyword(keyword) else {
            return match self.policy {
                ModifierPolicy::Reject => Err(ForgeError::unsupported_modifier(index, keyword)),
                ModifierPolicy::Ignore => {
                    tracing::warn!(index, modifier = keyword, "ignoring unsupported modifier");
                    Ok(())
                }
            };
        };

        match (modifier.kind(), value) {
            (ModifierKind::Flag | ModifierKind::OptionalLiteral, None) => {
                field.options.insert(modifier, ModifierValue::Flag);
            }
            (ModifierKind::Flag, Some(value)) => match value.trim().to_ascii_lowercase().as_str() {
                "true" => {
                    field.options.insert(modifier, ModifierValue::Flag);
                }
                "false" => {
                    field.options.remove(&modifier);
                }
                _ => {
                    return Err(malformed(format!(
                        "modifier '{}' expects true or false, got '{}'",
                        modifier, value
                    )));
                }
            },
            (ModifierKind::Literal, None) => {
                return Err(malformed(format!("modifier '{}' requires a value", modifier)));
            }
            (ModifierKind::Literal | ModifierKind::OptionalLiteral, Some(value)) => {
                if value.trim().is_empty() {
                    return Err(malformed(format!("modifier '{}' has an empty value", modifier)));
                }
                field
                    .options
                    .insert(modifier, ModifierValue::Literal(value.to_string()));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Lexical helpers
// ============================================================================

/// Split the schema into one chunk per field, gluing modifier continuations
/// back onto the field they belong to.
fn field_chunks(schema: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();

    for piece in split_top_level(schema, ',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }

        match chunks.last_mut() {
            Some(prev) if continues_previous(prev, piece) => {
                prev.push(',');
                prev.push_str(piece);
            }
            _ => chunks.push(piece.to_string()),
        }
    }

    chunks
}

/// Whether `piece` belongs to the segment list of `prev`.
///
/// Only a field that already has a segment past its type can be continued.
/// The piece must then start with a literal (`2:default(0)` after
/// `decimal:8`), have a modifier where a type would be
/// (`published:default('draft')`), be a bare recognized modifier
/// (`nullable`), or be another identifier in an enum value list
/// (`status:enum:draft, published`). Anything else starts a new field.
fn continues_previous(prev: &str, piece: &str) -> bool {
    let prev_segments = split_top_level(prev, ':');
    if prev_segments.len() <= 2 {
        return false;
    }

    let segments = split_top_level(piece, ':');
    let head = segments[0].trim();
    if is_literal(head) {
        return true;
    }

    if let Some(second) = segments.get(1) {
        let second = keyword_of(second);
        return Modifier::from_keyword(second).is_some()
            && matches!(FieldType::from_token(second), FieldType::Custom(_));
    }

    Modifier::from_keyword(keyword_of(head)).is_some() || extends_enum_values(&prev_segments, head)
}

/// `status:enum:draft` followed by a bare `published`
fn extends_enum_values(prev_segments: &[&str], item: &str) -> bool {
    prev_segments.len() == 3
        && matches!(FieldType::from_token(keyword_of(prev_segments[1])), FieldType::Enum)
        && split_list(prev_segments[2])
            .iter()
            .all(|value| Modifier::from_keyword(keyword_of(value)).is_none())
        && is_identifier(item)
}

/// Split on `delim` outside parentheses and quotes
fn split_top_level(input: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == delim && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Every quote closed and every parenthesis matched
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && quote.is_none()
}

/// Comma-separated items of a segment, trimmed, empty ones dropped
fn split_list(segment: &str) -> Vec<String> {
    split_top_level(segment, ',')
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// `keyword(value)` → (`keyword`, Some(`value`)); `keyword` → (`keyword`, None).
/// The value is everything inside the outermost parentheses, verbatim.
fn split_call(item: &str) -> Result<(&str, Option<&str>), &'static str> {
    match item.find('(') {
        None => Ok((item.trim(), None)),
        Some(open) => {
            let value = item[open + 1..]
                .strip_suffix(')')
                .ok_or("expected ')' at the end of a call")?;
            Ok((item[..open].trim(), Some(value)))
        }
    }
}

fn keyword_of(item: &str) -> &str {
    item.split('(').next().unwrap_or(item).trim()
}

fn is_literal(item: &str) -> bool {
    let quoted = item.len() >= 2
        && ((item.starts_with('"') && item.ends_with('"'))
            || (item.starts_with('\'') && item.ends_with('\'')));
    quoted
        || (item.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
            && item.parse::<f64>().is_ok())
        || LITERAL_KEYWORDS.contains(&item.to_ascii_lowercase().as_str())
}

fn is_argument_list(items: &[String], field_type: &FieldType) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| Modifier::from_keyword(keyword_of(item)).is_none())
        && (field_type.takes_identifier_arguments() || items.iter().all(|item| is_literal(item)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(schema: &str) -> Vec<FieldDescriptor> {
        SchemaParser::default().parse(schema).unwrap()
    }

    #[test]
    fn test_empty_schema() {
        assert!(parse("").is_empty());
        assert!(parse("  ").is_empty());
        assert!(parse(",,").is_empty());
    }

    #[test]
    fn test_name_and_type() {
        let fields = parse("views:integer");
        assert_eq!(fields, vec![FieldDescriptor::new("views", FieldType::Integer)]);
    }

    #[test]
    fn test_full_field() {
        let fields = parse(r#"email:string:100:unique,nullable,default("foo@example.com")"#);
        assert_eq!(
            fields,
            vec![
                FieldDescriptor::new("email", FieldType::String)
                    .with_argument("100")
                    .with_flag(Modifier::Unique)
                    .with_flag(Modifier::Nullable)
                    .with_value(Modifier::Default, r#""foo@example.com""#)
            ]
        );
    }

    #[test]
    fn test_multiple_fields_keep_order() {
        let fields = parse("title:string, body:text:nullable, views:integer:unsigned,default(0), slug:string:unique,");
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title", "body", "views", "slug"]);
        assert!(fields[1].is_nullable());
        assert_eq!(fields[2].default_value(), Some("0"));
        assert!(fields[2].has(Modifier::Unsigned));
        assert!(fields[3].is_unique());
    }

    #[test]
    fn test_decimal_arguments() {
        let fields = parse("price:decimal:8,2:default(0.00), tax:decimal(5, 2)");
        assert_eq!(fields[0].arguments, vec!["8", "2"]);
        assert_eq!(fields[0].default_value(), Some("0.00"));
        assert_eq!(fields[1].field_type, FieldType::Decimal);
        assert_eq!(fields[1].arguments, vec!["5", "2"]);
    }

    #[test]
    fn test_colon_separated_modifiers() {
        let fields = parse("email:string:unique:nullable");
        assert!(fields[0].is_unique());
        assert!(fields[0].is_nullable());
        assert!(fields[0].arguments.is_empty());
    }

    #[test]
    fn test_default_value_is_verbatim() {
        let fields = parse(r#"motto:string:default('a, b: (c)'), flag:boolean:default(true)"#);
        assert_eq!(fields[0].default_value(), Some("'a, b: (c)'"));
        assert_eq!(fields[1].default_value(), Some("true"));
    }

    #[test]
    fn test_boolean_flag_values() {
        let fields = parse("email:string:unique(true),nullable(false)");
        assert!(fields[0].is_unique());
        assert!(!fields[0].is_nullable());

        let err = SchemaParser::default().parse("email:string:unique(maybe)").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedField { index: 1, .. }));
    }

    #[test]
    fn test_default_requires_value() {
        let err = SchemaParser::default().parse("views:integer:default").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedField { index: 1, .. }));

        let err = SchemaParser::default().parse("views:integer:default()").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedField { index: 1, .. }));
    }

    #[test]
    fn test_enum_arguments() {
        let fields = parse("status:enum:draft,published:default('draft')");
        assert_eq!(fields[0].field_type, FieldType::Enum);
        assert_eq!(fields[0].arguments, vec!["draft", "published"]);
        assert_eq!(fields[0].default_value(), Some("'draft'"));
    }

    #[test]
    fn test_foreign_key_marker() {
        let fields = parse("user_id:foreign, author_id:foreign:users:cascade");
        assert_eq!(fields[0].foreign_key().unwrap().table, "users");
        let fk = fields[1].foreign_key().unwrap();
        assert_eq!(fk.table, "users");
        assert_eq!(fk.on_delete.as_deref(), Some("cascade"));
    }

    #[test]
    fn test_foreign_modifier() {
        let fields = parse("user_id:integer:unsigned,foreign, owner_id:integer:foreign(accounts)");
        assert!(fields[0].has(Modifier::Unsigned));
        assert_eq!(fields[0].foreign_key().unwrap().table, "users");
        assert_eq!(fields[1].foreign_key().unwrap().table, "accounts");
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let fields = parse("location:point:nullable");
        assert_eq!(fields[0].field_type, FieldType::Custom("point".to_string()));
        assert!(fields[0].is_nullable());
    }

    #[test]
    fn test_missing_name() {
        let err = SchemaParser::default().parse(":string").unwrap_err();
        match err {
            ForgeError::MalformedField { index, chunk, .. } => {
                assert_eq!(index, 1);
                assert_eq!(chunk, ":string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_type_reports_position() {
        let err = SchemaParser::default().parse("title:string, body").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedField { index: 2, .. }));

        let err = SchemaParser::default().parse("title:string, body:").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedField { index: 2, .. }));
    }

    #[test]
    fn test_invalid_column_name() {
        let err = SchemaParser::default().parse("first-name:string").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedField { index: 1, .. }));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = SchemaParser::default().parse("bio:text:default('x'").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedField { index: 1, .. }));
    }

    #[test]
    fn test_unknown_modifier_rejected() {
        let err = SchemaParser::default()
            .parse("title:string, email:string:sparkly,unique")
            .unwrap_err();
        match err {
            ForgeError::UnsupportedModifier { index, modifier } => {
                assert_eq!(index, 2);
                assert_eq!(modifier, "sparkly");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_misspelled_modifier_is_not_an_argument() {
        let err = SchemaParser::default().parse("name:string:unsgined").unwrap_err();
        assert!(matches!(err, ForgeError::UnsupportedModifier { index: 1, .. }));
    }

    #[test]
    fn test_unknown_modifier_ignored() {
        let fields = SchemaParser::new(ModifierPolicy::Ignore)
            .parse("email:string:sparkly(3),unique,nullable")
            .unwrap();
        assert_eq!(
            fields,
            vec![
                FieldDescriptor::new("email", FieldType::String)
                    .with_flag(Modifier::Unique)
                    .with_flag(Modifier::Nullable)
            ]
        );
    }

    #[test]
    fn test_bare_name_after_modifiers_is_a_new_field() {
        for policy in [ModifierPolicy::Reject, ModifierPolicy::Ignore] {
            let err = SchemaParser::new(policy)
                .parse("title:string:nullable, body")
                .unwrap_err();
            match err {
                ForgeError::MalformedField { index, chunk, .. } => {
                    assert_eq!(index, 2);
                    assert_eq!(chunk, "body");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_bare_modifier_continues_previous_field() {
        let fields = parse("title:string:unique, index");
        assert_eq!(fields.len(), 1);
        assert!(fields[0].has(Modifier::Unique));
        assert!(fields[0].has(Modifier::Index));

        let fields = parse("title:string:unique, index:integer");
        assert_eq!(fields.len(), 2);
        assert!(!fields[0].has(Modifier::Index));
        assert_eq!(fields[1].name, "index");
        assert_eq!(fields[1].field_type, FieldType::Integer);
    }

    #[test]
    fn test_enum_values_after_space() {
        let fields = parse("status:enum:draft, published, title:string");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].arguments, vec!["draft", "published"]);
        assert_eq!(fields[1].name, "title");
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        assert_eq!(split_top_level("a,(b,c),'d,e'", ','), vec!["a", "(b,c)", "'d,e'"]);
        assert_eq!(split_top_level(r#"a:"b\":c":d"#, ':'), vec!["a", r#""b\":c""#, "d"]);
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("default('(')"));
        assert!(!is_balanced("default('x'"));
        assert!(!is_balanced("default)("));
        assert!(!is_balanced("default(\"x)"));
    }
}

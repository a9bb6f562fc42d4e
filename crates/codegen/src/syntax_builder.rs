//! # Syntax Builder
//!
//! Renders a [`MigrationIntent`] and its fields into Laravel schema-builder
//! statements for both directions of the migration.
//!
//! ## Output Shape
//!
//! ```text
//! create  up:   Schema::create(..) { id, fields.., softDeletes, timestamps }
//!         down: Schema::dropIfExists(..)
//! add     up:   Schema::table(..) { add fields in order }
//!         down: Schema::table(..) { drop fields in reverse order }
//! remove  up:   Schema::table(..) { drop fields in order }
//!         down: Schema::table(..) { re-add fields in order }
//! ```
//!
//! Modifiers are chained in [`Modifier::CANONICAL_ORDER`], never in the
//! order they were written. Foreign-key fields get a constraint statement
//! after the column, and their constraint is dropped before the column.

use forge_ir::{
    FieldDescriptor, FieldType, ForeignKeyRef, MigrationAction, MigrationIntent, Modifier,
    ModifierValue, PivotIntent, RenderedMigration,
};

/// Indentation of statements inside a schema closure
const STATEMENT_INDENT: &str = "            ";

/// Indentation of the closing line of a schema closure
const CLOSING_INDENT: &str = "        ";

/// Renders schema-builder statements
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxBuilder;

impl SyntaxBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render the `up` and `down` bodies for an intent
    pub fn build(&self, intent: &MigrationIntent, fields: &[FieldDescriptor]) -> RenderedMigration {
        let table = &intent.table;

        let rendered = match intent.action {
            MigrationAction::Create => RenderedMigration::new(
                create_wrapper(table, add_statements(fields.iter())),
                vec![drop_table(table)],
            ),
            MigrationAction::Add => RenderedMigration::new(
                change_wrapper(table, add_statements(fields.iter())),
                change_wrapper(table, drop_statements(fields.iter().rev())),
            ),
            MigrationAction::Remove => RenderedMigration::new(
                change_wrapper(table, drop_statements(fields.iter())),
                change_wrapper(table, add_statements(fields.iter())),
            ),
        };

        tracing::debug!(
            action = %intent.action,
            table = %table,
            fields = fields.len(),
            up_lines = rendered.up.len(),
            down_lines = rendered.down.len(),
            "rendered migration"
        );

        rendered
    }

    /// Render a pivot table joining two tables, with a cascading foreign key
    /// per side and a composite primary key.
    pub fn pivot(&self, pivot: &PivotIntent) -> RenderedMigration {
        let table = pivot.table();
        let fields: Vec<FieldDescriptor> = pivot
            .columns()
            .into_iter()
            .zip(pivot.tables())
            .map(|(column, target)| {
                FieldDescriptor::new(column, FieldType::ForeignKey)
                    .with_argument(target)
                    .with_flag(Modifier::Index)
                    .with_flag(Modifier::Cascade)
            })
            .collect();

        let [first, second] = pivot.columns();
        let mut body = add_statements(fields.iter());
        body.push(format!("$table->primary(['{}', '{}']);", first, second));

        let mut up = vec![open_closure("create", &table)];
        up.extend(body.into_iter().map(indent));
        up.push(close_closure());

        RenderedMigration::new(up, vec![drop_table(&table)])
    }
}

// ============================================================================
// Statements
// ============================================================================

/// `$table->string('email', 100)->unique()->nullable()->default("x");`
fn column_statement(field: &FieldDescriptor) -> String {
    let mut syntax = format!("$table->{}('{}'", field.field_type.method(), field.name);

    let arguments = field.column_arguments();
    if !arguments.is_empty() {
        syntax.push_str(", ");
        match field.field_type {
            FieldType::Enum => {
                let values: Vec<String> = arguments.iter().map(|v| quote(v)).collect();
                syntax.push_str(&format!("[{}]", values.join(", ")));
            }
            _ => syntax.push_str(&arguments.join(", ")),
        }
    }
    syntax.push(')');

    for modifier in Modifier::CANONICAL_ORDER {
        match field.options.get(&modifier) {
            Some(ModifierValue::Flag) => syntax.push_str(&format!("->{}()", modifier.keyword())),
            Some(ModifierValue::Literal(value)) => {
                syntax.push_str(&format!("->{}({})", modifier.keyword(), value))
            }
            None => {}
        }
    }

    syntax.push(';');
    syntax
}

/// `$table->foreign('user_id')->references('id')->on('users');`
fn foreign_statement(column: &str, reference: &ForeignKeyRef) -> String {
    let mut syntax = format!(
        "$table->foreign('{}')->references('{}')->on('{}')",
        column, reference.column, reference.table
    );
    if let Some(action) = &reference.on_delete {
        syntax.push_str(&format!("->onDelete('{}')", action));
    }
    syntax.push(';');
    syntax
}

fn add_statements<'a>(fields: impl Iterator<Item = &'a FieldDescriptor>) -> Vec<String> {
    let mut statements = Vec::new();
    for field in fields {
        statements.push(column_statement(field));
        if let Some(reference) = field.foreign_key() {
            statements.push(foreign_statement(&field.name, &reference));
        }
    }
    statements
}

fn drop_statements<'a>(fields: impl Iterator<Item = &'a FieldDescriptor>) -> Vec<String> {
    let mut statements = Vec::new();
    for field in fields {
        if field.foreign_key().is_some() {
            statements.push(format!("$table->dropForeign(['{}']);", field.name));
        }
        statements.push(format!("$table->dropColumn('{}');", field.name));
    }
    statements
}

fn drop_table(table: &str) -> String {
    format!("Schema::dropIfExists('{}');", table)
}

// ============================================================================
// Wrappers
// ============================================================================

fn create_wrapper(table: &str, body: Vec<String>) -> Vec<String> {
    let mut lines = vec![open_closure("create", table)];
    lines.push(indent("$table->bigIncrements('id');".to_string()));
    lines.extend(body.into_iter().map(indent));
    lines.push(indent("$table->softDeletes();".to_string()));
    lines.push(indent("$table->timestamps();".to_string()));
    lines.push(close_closure());
    lines
}

fn change_wrapper(table: &str, body: Vec<String>) -> Vec<String> {
    let mut lines = vec![open_closure("table", table)];
    lines.extend(body.into_iter().map(indent));
    lines.push(close_closure());
    lines
}

fn open_closure(method: &str, table: &str) -> String {
    format!("Schema::{}('{}', function (Blueprint $table) {{", method, table)
}

fn close_closure() -> String {
    format!("{}}});", CLOSING_INDENT)
}

fn indent(statement: String) -> String {
    format!("{}{}", STATEMENT_INDENT, statement)
}

fn quote(value: &str) -> String {
    let quoted = value.len() >= 2
        && ((value.starts_with('\'') && value.ends_with('\''))
            || (value.starts_with('"') && value.ends_with('"')));
    if quoted {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "\\'"))
    }
}

// ============================================================================
// Tests
// ============================================================================

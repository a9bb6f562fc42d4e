//! # Stub Templater
//!
//! Renders the bundled migration and model stubs with Tera. Stubs only use
//! `{{ variable }}` expressions; output is not HTML-escaped.

use forge_core::{ForgeError, ForgeResult};
use std::error::Error as _;
use tera::{Context, Tera};

const MIGRATION_STUB: &str = include_str!("../stubs/migration.stub");
const MODEL_STUB: &str = include_str!("../stubs/model.stub");

/// A source template with `{{key}}` placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubTemplate<'a> {
    name: &'a str,
    source: &'a str,
}

impl<'a> StubTemplate<'a> {
    /// A template from arbitrary source
    pub fn new(name: &'a str, source: &'a str) -> Self {
        Self { name, source }
    }

    /// The Laravel migration class. Placeholders: `class`, `schema_up`,
    /// `schema_down`.
    pub fn migration() -> StubTemplate<'static> {
        StubTemplate::new("migration", MIGRATION_STUB)
    }

    /// The Eloquent model class. Placeholders: `namespace`, `class`, `table`.
    pub fn model() -> StubTemplate<'static> {
        StubTemplate::new("model", MODEL_STUB)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Render the template. Values are inserted verbatim and never
    /// evaluated as template source; values with no matching placeholder are
    /// ignored.
    ///
    /// # Errors
    ///
    /// `TemplateRender` for a placeholder with no value or a template that
    /// does not parse.
    pub fn render(&self, values: &[(&str, &str)]) -> ForgeResult<String> {
        let mut context = Context::new();
        for (key, value) in values {
            context.insert(*key, value);
        }

        Tera::one_off(self.source, &context, false).map_err(|e| self.error(&e))
    }

    /// Tera nests the useful message in the error's source chain
    fn error(&self, error: &tera::Error) -> ForgeError {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        ForgeError::TemplateRender {
            template: self.name.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_placeholders() {
        let stub = StubTemplate::new("t", "class {{class}} { {{ body }} }");
        let out = stub.render(&[("class", "Foo"), ("body", "bar")]).unwrap();
        assert_eq!(out, "class Foo { bar }");
    }

    #[test]
    fn test_repeated_placeholder() {
        let stub = StubTemplate::new("t", "{{a}}-{{a}}");
        assert_eq!(stub.render(&[("a", "x")]).unwrap(), "x-x");
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let stub = StubTemplate::new("t", "{{a}}");
        let out = stub.render(&[("a", "{{b}}"), ("b", "nope")]).unwrap();
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let err = StubTemplate::new("t", "{{class}} {{table}}")
            .render(&[("class", "Foo")])
            .unwrap_err();
        assert!(matches!(err, ForgeError::TemplateRender { .. }));
        assert!(err.to_string().contains("table"), "{err}");
    }

    #[test]
    fn test_unterminated_placeholder_is_an_error() {
        let err = StubTemplate::new("t", "class {{class")
            .render(&[("class", "Foo")])
            .unwrap_err();
        assert!(matches!(err, ForgeError::TemplateRender { .. }));
    }

    #[test]
    fn test_php_source_is_not_escaped() {
        let stub = StubTemplate::new("t", "{{ body }}");
        let out = stub.render(&[("body", "$table->string('title');")]).unwrap();
        assert_eq!(out, "$table->string('title');");
    }

    #[test]
    fn test_migration_stub() {
        let out = StubTemplate::migration()
            .render(&[
                ("class", "CreatePostsTable"),
                ("schema_up", "UP"),
                ("schema_down", "DOWN"),
            ])
            .unwrap();

        assert!(out.starts_with("<?php"));
        assert!(out.contains("class CreatePostsTable extends Migration"));
        assert!(out.contains("    public function up()\n    {\n        UP\n    }"));
        assert!(out.contains("    public function down()\n    {\n        DOWN\n    }"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_model_stub() {
        let out = StubTemplate::model()
            .render(&[("namespace", "App\\Models"), ("class", "Post"), ("table", "posts")])
            .unwrap();
        assert!(out.contains("namespace App\\Models;"));
        assert!(out.contains("class Post extends Model"));
        assert!(out.contains("protected $table = 'posts';"));
    }
}

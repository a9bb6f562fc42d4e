//! # Migration Generator
//!
//! The `Generator` is the top-level entry point. It runs a migration name and
//! schema string through the whole pipeline and lays out the resulting files.
//!
//! ## Pipeline
//!
//! ```text
//! name + schema + GeneratorConfig
//!         │
//!         ├──► NameParser::parse()     → MigrationIntent
//!         ├──► SchemaParser::parse()   → Vec<FieldDescriptor>
//!         ├──► SyntaxBuilder::build()  → RenderedMigration
//!         ├──► StubTemplate::render()  → migration (and model) source
//!         │
//!         ▼
//!   GeneratedProject { files, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forge_codegen::{Generator, GeneratorConfig};
//!
//! let generator = Generator::new(GeneratorConfig::default());
//! let project = generator.migration("add_views_to_posts_table", Some("views:integer"), now)?;
//!
//! generator.write(&project, "/path/to/laravel/app")?;
//! ```

use chrono::NaiveDateTime;
use forge_core::{ForgeError, ForgeResult, ResultExt, Validatable, naming};
use forge_ir::{FieldDescriptor, MigrationAction, MigrationIntent, PivotIntent, RenderedMigration};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::{
    FileType, GeneratedFile, GeneratedProject, GeneratorConfig, NameParser, SchemaParser,
    StubTemplate, SyntaxBuilder,
};

/// Timestamp prefix of migration file names
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

// ============================================================================
// CompiledMigration
// ============================================================================

/// Every intermediate result of compiling one migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledMigration {
    pub intent: MigrationIntent,
    pub fields: Vec<FieldDescriptor>,
    pub rendered: RenderedMigration,
}

impl CompiledMigration {
    /// Warnings about input that compiled but probably isn't what was meant
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.fields.is_empty() && self.intent.action != MigrationAction::Create {
            warnings.push(format!(
                "Migration '{}' declares no fields; its schema body is empty.",
                self.intent.name
            ));
        }

        if let Some(related) = &self.intent.related_table {
            if !self.fields.is_empty() && self.fields.iter().all(|f| f.foreign_key().is_none()) {
                warnings.push(format!(
                    "Migration '{}' looks like a reference to '{}' but no foreign key column is declared.",
                    self.intent.name, related
                ));
            }
        }

        warnings
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Compiles migrations and lays out the files they produce.
///
/// The `Generator` is stateless aside from its configuration.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    // ====================================================================
    // Construction
    // ====================================================================

    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Create a generator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: GeneratorConfig) {
        self.config = config;
    }

    // ====================================================================
    // Compilation
    // ====================================================================

    /// Parse the name and schema and render both migration bodies.
    /// A missing schema is the same as an empty one.
    ///
    /// # Errors
    ///
    /// The first name or schema error; nothing is rendered past it.
    pub fn compile(&self, name: &str, schema: Option<&str>) -> ForgeResult<CompiledMigration> {
        let intent = NameParser::new(self.config.verb_fallback).parse(name)?;
        let fields = SchemaParser::new(self.config.modifier_policy).parse(schema.unwrap_or(""))?;
        let rendered = SyntaxBuilder::new().build(&intent, &fields);

        Ok(CompiledMigration {
            intent,
            fields,
            rendered,
        })
    }

    /// Compile a migration into its file set.
    ///
    /// # Steps
    ///
    /// 1. **Compile** the name and schema.
    /// 2. **Template** the migration class at
    ///    `<migrations_dir>/<timestamp>_<name>.php`.
    /// 3. **Template** the companion model at `<models_dir>/<Model>.php` when
    ///    `generate_model` is set and the migration creates a table.
    pub fn migration(
        &self,
        name: &str,
        schema: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> ForgeResult<GeneratedProject> {
        let compiled = self.compile(name, schema)?;
        let intent = &compiled.intent;

        let mut project = GeneratedProject::new(&intent.name);
        for warning in compiled.warnings() {
            tracing::warn!("{}", warning);
            project.add_warning(warning);
        }

        let source = render_migration(&intent.class_name(), &compiled.rendered)?;
        project.add_file(GeneratedFile::migration(
            self.config
                .migrations_dir
                .join(migration_filename(&intent.name, timestamp)),
            source,
        ));

        if self.config.generate_model {
            if intent.action == MigrationAction::Create {
                let model = intent.model_name();
                let namespace = model_namespace(&self.config.models_dir);
                let source = StubTemplate::model().render(&[
                    ("namespace", namespace.as_str()),
                    ("class", model.as_str()),
                    ("table", intent.table.as_str()),
                ])?;
                project.add_file(GeneratedFile::model(
                    self.config.models_dir.join(format!("{}.{}", model, FileType::Model.extension())),
                    source,
                ));
            } else {
                project.add_warning(format!(
                    "No model generated: '{}' does not create a table.",
                    intent.name
                ));
            }
        }

        tracing::debug!(name = %project.name, files = project.file_count(), "generated migration");
        Ok(project)
    }

    /// Generate a pivot table migration joining two tables.
    pub fn pivot(
        &self,
        first: &str,
        second: &str,
        timestamp: NaiveDateTime,
    ) -> ForgeResult<GeneratedProject> {
        let pivot = PivotIntent::new(first, second);
        pivot.validate()?;

        let rendered = SyntaxBuilder::new().pivot(&pivot);
        let source = render_migration(&pivot.class_name(), &rendered)?;

        let mut project = GeneratedProject::new(pivot.name());
        project.add_file(GeneratedFile::migration(
            self.config
                .migrations_dir
                .join(migration_filename(&pivot.name(), timestamp)),
            source,
        ));
        Ok(project)
    }

    // ====================================================================
    // Output
    // ====================================================================

    /// Write a generated project under `base_dir`.
    ///
    /// Nothing is written when a migration of the same name already exists,
    /// unless `overwrite` is set, in which case the old file is deleted once
    /// the new files are in place. An existing model file is left untouched.
    /// A failed write leaves the old migration and no new files behind.
    ///
    /// # Errors
    ///
    /// `MigrationExists`, or the first filesystem error.
    pub fn write(
        &self,
        project: &GeneratedProject,
        base_dir: impl AsRef<Path>,
    ) -> ForgeResult<Vec<PathBuf>> {
        let base_dir = base_dir.as_ref();
        let migrations_dir = base_dir.join(&self.config.migrations_dir);

        let existing = find_existing_migration(&migrations_dir, &project.name);
        if let Some(path) = &existing {
            if !self.config.overwrite {
                return Err(ForgeError::MigrationExists(path.clone()));
            }
        }

        let mut output = GeneratedProject::new(&project.name);
        output.warnings = project.warnings.clone();
        for file in &project.files {
            let target = base_dir.join(&file.path);
            if file.file_type == FileType::Model && target.exists() {
                tracing::info!(path = %target.display(), "model already exists, skipping");
                continue;
            }
            output.add_file(file.clone());
        }

        let written = output.write_to_disk(base_dir)?;

        if let Some(path) = existing.filter(|path| !written.contains(path)) {
            std::fs::remove_file(&path).with_context(format!(
                "Failed to replace existing migration '{}'",
                path.display()
            ))?;
            tracing::info!(path = %path.display(), "removed replaced migration");
        }

        Ok(written)
    }
}

// ============================================================================
// File layout
// ============================================================================

/// `2024_01_31_120000_create_posts_table.php`
pub fn migration_filename(name: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        timestamp.format(TIMESTAMP_FORMAT),
        name,
        FileType::Migration.extension()
    )
}

/// Find a migration named `name` in `dir`, whatever its timestamp.
/// A missing directory has no migrations.
pub fn find_existing_migration(dir: impl AsRef<Path>, name: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|file| file.strip_suffix(".php"))
                .is_some_and(|stem| is_migration_named(stem, name))
        })
        .map(|entry| entry.into_path())
        .collect();

    matches.sort();
    matches.into_iter().next()
}

/// `<timestamp>_<name>`
fn is_migration_named(stem: &str, name: &str) -> bool {
    let Some(prefix) = stem
        .strip_suffix(name)
        .and_then(|rest| rest.strip_suffix('_'))
    else {
        return false;
    };
    NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT).is_ok()
}

/// PHP namespace of the models directory: `app/Models` → `App\Models`
fn model_namespace(models_dir: &Path) -> String {
    models_dir
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .map(naming::pascal)
        .collect::<Vec<_>>()
        .join("\\")
}

fn render_migration(class: &str, rendered: &RenderedMigration) -> ForgeResult<String> {
    let up = rendered.up_text();
    let down = rendered.down_text();
    StubTemplate::migration().render(&[
        ("class", class),
        ("schema_up", up.as_str()),
        ("schema_down", down.as_str()),
    ])
}

// ============================================================================
// Tests
// ============================================================================

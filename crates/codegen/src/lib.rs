//! # Forge Codegen
//!
//! The migration compiler for SchemaForge.
//!
//! This crate turns a migration name and a compact schema string into
//! Laravel schema-builder migration source.
//!
//! ## Pipeline
//!
//! - **Name Interpreter** ([`NameParser`]): `add_views_to_posts_table` →
//!   `MigrationIntent { action: Add, table: "posts" }`
//! - **Schema Grammar Parser** ([`SchemaParser`]): `views:integer:unsigned`
//!   → ordered `FieldDescriptor` list
//! - **Syntax Builder** ([`SyntaxBuilder`]): intent + fields → `up`/`down`
//!   bodies
//! - **Stub Templater** ([`StubTemplate`]): bodies → migration file source
//! - **Generator** ([`Generator`]): all of the above plus file layout
//!

// ============================================================================
// Modules
// ============================================================================

pub mod generator;
pub mod name_parser;
pub mod schema_parser;
pub mod stub;
pub mod syntax_builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use generator::{CompiledMigration, Generator, find_existing_migration, migration_filename};
pub use name_parser::{NameParser, VerbFallback};
pub use schema_parser::{ModifierPolicy, SchemaParser};
pub use stub::StubTemplate;
pub use syntax_builder::SyntaxBuilder;

use forge_core::{ForgeError, ForgeResult};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "schemaforge.toml";

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the migration generator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory migrations are written to, relative to the project root
    pub migrations_dir: PathBuf,

    /// Directory companion models are written to
    pub models_dir: PathBuf,

    /// Whether to generate a companion model
    pub generate_model: bool,

    /// Whether to replace an existing migration of the same name
    pub overwrite: bool,

    /// What to do with unrecognized modifier keywords
    pub modifier_policy: ModifierPolicy,

    /// What to do with migration names that lack a recognized verb
    pub verb_fallback: VerbFallback,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("database/migrations"),
            models_dir: PathBuf::from("app/Models"),
            generate_model: false,
            overwrite: false,
            modifier_policy: ModifierPolicy::default(),
            verb_fallback: VerbFallback::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML source
    pub fn from_toml_str(source: &str) -> ForgeResult<Self> {
        toml::from_str(source).map_err(|e| ForgeError::InvalidConfig(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> ForgeResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ForgeError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Load `schemaforge.toml` from `dir` if present, defaults otherwise
    pub fn discover(dir: impl AsRef<Path>) -> ForgeResult<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading configuration");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Set the migrations directory
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the models directory
    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Generate a companion model
    pub fn with_model(mut self) -> Self {
        self.generate_model = true;
        self
    }

    /// Allow overwriting existing migrations
    pub fn allow_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    pub fn with_modifier_policy(mut self, policy: ModifierPolicy) -> Self {
        self.modifier_policy = policy;
        self
    }

    pub fn with_verb_fallback(mut self, fallback: VerbFallback) -> Self {
        self.verb_fallback = fallback;
        self
    }
}

// ============================================================================
// GeneratedFile
// ============================================================================

/// Represents a single generated file
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Relative path from the project root
    pub path: PathBuf,

    /// File content
    pub content: String,

    /// File type for categorization
    pub file_type: FileType,
}

impl GeneratedFile {
    /// Create a new generated file
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            file_type,
        }
    }

    /// Create a migration file
    pub fn migration(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::new(path, content, FileType::Migration)
    }

    /// Create a model file
    pub fn model(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::new(path, content, FileType::Model)
    }
}

/// Type of generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Migration,
    Model,
}

impl FileType {
    /// Get the file extension for this type
    pub fn extension(&self) -> &str {
        "php"
    }
}

// ============================================================================
// GeneratedProject
// ============================================================================

/// Collection of the files produced by one generator run
#[derive(Debug, Clone, Default)]
pub struct GeneratedProject {
    /// Migration name
    pub name: String,

    /// All generated files
    pub files: Vec<GeneratedFile>,

    /// Warnings generated during code generation
    pub warnings: Vec<String>,
}

impl GeneratedProject {
    /// Create a new generated project
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a file to the project
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Get the number of files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get files by type
    pub fn files_by_type(&self, file_type: FileType) -> Vec<&GeneratedFile> {
        self.files
            .iter()
            .filter(|f| f.file_type == file_type)
            .collect()
    }

    /// The migration file, if any
    pub fn migration(&self) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.file_type == FileType::Migration)
    }

    /// Write all files to disk.
    ///
    /// Every file is first staged as a temporary file next to its target and
    /// only then renamed into place, so a directory or write failure leaves
    /// no generated file behind. If a rename fails, the files already
    /// renamed are removed again.
    pub fn write_to_disk(&self, base_dir: impl AsRef<Path>) -> ForgeResult<Vec<PathBuf>> {
        let base_dir = base_dir.as_ref();
        let mut staged = Vec::with_capacity(self.files.len());

        for file in &self.files {
            let full_path = base_dir.join(&file.path);
            staged.push((stage(&full_path, &file.content)?, full_path));
        }

        let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for (temp, full_path) in staged {
            if let Err(e) = temp.persist(&full_path) {
                for path in &written {
                    if let Err(cleanup) = std::fs::remove_file(path) {
                        tracing::warn!(path = %path.display(), error = %cleanup, "could not remove partial output");
                    }
                }
                return Err(ForgeError::FileWrite {
                    path: full_path,
                    message: e.error.to_string(),
                });
            }

            tracing::info!(path = %full_path.display(), "wrote file");
            written.push(full_path);
        }

        Ok(written)
    }
}

/// Write `content` to a temporary file in the target's directory
fn stage(full_path: &Path, content: &str) -> ForgeResult<NamedTempFile> {
    let parent = full_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| ForgeError::DirectoryCreate {
        path: parent.to_path_buf(),
        message: e.to_string(),
    })?;

    let write_error = |e: std::io::Error| ForgeError::FileWrite {
        path: full_path.to_path_buf(),
        message: e.to_string(),
    };
    let mut temp = NamedTempFile::new_in(parent).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    Ok(temp)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_config_default() {
        let config = GeneratorConfig::default();
        assert_eq!(config.migrations_dir, PathBuf::from("database/migrations"));
        assert!(!config.generate_model);
        assert!(!config.overwrite);
        assert_eq!(config.modifier_policy, ModifierPolicy::Reject);
        assert_eq!(config.verb_fallback, VerbFallback::Add);
    }

    #[test]
    fn test_generator_config_builder() {
        let config = GeneratorConfig::new()
            .with_migrations_dir("db/migrations")
            .with_model()
            .allow_overwrite()
            .with_modifier_policy(ModifierPolicy::Ignore);

        assert_eq!(config.migrations_dir, PathBuf::from("db/migrations"));
        assert!(config.generate_model);
        assert!(config.overwrite);
        assert_eq!(config.modifier_policy, ModifierPolicy::Ignore);
    }

    #[test]
    fn test_config_from_toml() {
        let config = GeneratorConfig::from_toml_str(
            r#"
migrations_dir = "db/migrations"
modifier_policy = "ignore"
verb_fallback = "reject"
"#,
        )
        .unwrap();

        assert_eq!(config.migrations_dir, PathBuf::from("db/migrations"));
        assert_eq!(config.models_dir, PathBuf::from("app/Models"));
        assert_eq!(config.modifier_policy, ModifierPolicy::Ignore);
        assert_eq!(config.verb_fallback, VerbFallback::Reject);
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let err = GeneratorConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ForgeError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_discover_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(GeneratorConfig::discover(dir.path()).unwrap(), GeneratorConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "generate_model = true\n").unwrap();
        assert!(GeneratorConfig::discover(dir.path()).unwrap().generate_model);
    }

    #[test]
    fn test_generated_project() {
        let mut project = GeneratedProject::new("create_posts_table");
        project.add_file(GeneratedFile::migration("database/migrations/x.php", "<?php"));
        project.add_file(GeneratedFile::model("app/Models/Post.php", "<?php"));

        assert_eq!(project.file_count(), 2);
        assert_eq!(project.files_by_type(FileType::Model).len(), 1);
        assert_eq!(project.migration().unwrap().file_type.extension(), "php");
        assert!(!project.has_warnings());
    }

    #[test]
    fn test_write_to_disk_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = GeneratedProject::new("create_posts_table");
        project.add_file(GeneratedFile::migration("database/migrations/x.php", "<?php"));

        let written = project.write_to_disk(dir.path()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "<?php");
    }

    #[test]
    fn test_write_to_disk_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app"), "not a directory").unwrap();

        let mut project = GeneratedProject::new("create_posts_table");
        project.add_file(GeneratedFile::migration("database/migrations/x.php", "<?php"));
        project.add_file(GeneratedFile::model("app/Models/Post.php", "<?php"));

        let err = project.write_to_disk(dir.path()).unwrap_err();
        assert!(matches!(err, ForgeError::DirectoryCreate { .. }), "{err}");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("database/migrations"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }
}

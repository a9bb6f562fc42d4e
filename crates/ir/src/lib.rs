//! # Forge IR (Intermediate Representation)
//!
//! This crate provides the data passed between the stages of the migration
//! compiler.
//!
//! ## Core Concepts
//!
//! - **MigrationIntent**: what a migration name asks for (action + table)
//! - **PivotIntent**: a join table between two tables
//! - **FieldDescriptor**: one column parsed from a schema string
//! - **RenderedMigration**: the `up` and `down` bodies produced from the above
//!

// Module declarations
pub mod field;
pub mod intent;
pub mod rendered;
pub mod vocabulary;

// Re-export commonly used types at crate root
pub use field::{FieldDescriptor, FieldType, ForeignKeyRef, Modifier, ModifierKind, ModifierValue};
pub use intent::{MigrationAction, MigrationIntent, PivotIntent};
pub use rendered::RenderedMigration;

// Re-export core types that are commonly used with IR
pub use forge_core::{ForgeError, ForgeResult, Validatable};


//! # Forge Core
//!
//! Core error handling, traits and naming helpers for SchemaForge.
//!
//! This crate provides the foundational building blocks used by the
//! migration compiler, including:
//!
//! - **Errors**: Unified error handling with `ForgeError` and `ForgeResult`
//! - **Traits**: `Validatable` for IR invariants
//! - **Naming**: snake/Pascal case conversion and table-name inflection
//!

pub mod error;
pub mod naming;
pub mod traits;

// Re-export commonly used items at crate root
pub use error::{ForgeError, ForgeResult, ResultExt};
pub use traits::{Validatable, is_identifier};


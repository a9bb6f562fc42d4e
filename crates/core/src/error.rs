//! Error types for SchemaForge
//!
//! This module provides unified error handling across the compiler and the
//! file-generation layer: name and schema parse errors, template errors,
//! IO errors, and configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for SchemaForge
#[derive(Debug, Error)]
pub enum ForgeError {
    // ========================================================================
    // Parse Errors
    // ========================================================================
    /// Migration name is empty or cannot be decomposed
    #[error("Invalid migration name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A schema field chunk lacks required segments or has an unparseable value
    #[error("Malformed field #{index} '{chunk}': {reason}")]
    MalformedField {
        /// 1-based position of the field in the schema string
        index: usize,
        chunk: String,
        reason: String,
    },

    /// A modifier keyword outside the recognized set
    #[error("Unsupported modifier '{modifier}' in field #{index}")]
    UnsupportedModifier { index: usize, modifier: String },

    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // Code Generation Errors
    // ========================================================================
    /// Template rendering failed
    #[error("Template rendering failed for '{template}': {message}")]
    TemplateRender { template: String, message: String },

    /// A migration with the same name is already present
    #[error("Migration already exists: {0}")]
    MigrationExists(PathBuf),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl ForgeError {
    /// Create an invalid migration name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ForgeError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed field error
    pub fn malformed_field(index: usize, chunk: impl Into<String>, reason: impl Into<String>) -> Self {
        ForgeError::MalformedField {
            index,
            chunk: chunk.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported modifier error
    pub fn unsupported_modifier(index: usize, modifier: impl Into<String>) -> Self {
        ForgeError::UnsupportedModifier {
            index,
            modifier: modifier.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        ForgeError::Validation(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        ForgeError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error came from interpreting user input
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            ForgeError::InvalidName { .. }
                | ForgeError::MalformedField { .. }
                | ForgeError::UnsupportedModifier { .. }
                | ForgeError::Validation(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ForgeError::Io(_)
                | ForgeError::FileRead { .. }
                | ForgeError::FileWrite { .. }
                | ForgeError::DirectoryCreate { .. }
        )
    }

    /// The 1-based field position for field-level parse errors
    pub fn field_index(&self) -> Option<usize> {
        match self {
            ForgeError::MalformedField { index, .. }
            | ForgeError::UnsupportedModifier { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Result type alias using ForgeError
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> ForgeResult<T>;
}

impl<T, E: Into<ForgeError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> ForgeResult<T> {
        self.map_err(|e| {
            let err: ForgeError = e.into();
            ForgeError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

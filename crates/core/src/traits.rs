//! Core traits for SchemaForge
//!
//! This module defines the traits the IR types implement so that every
//! stage of the compiler can check its inputs the same way.

use crate::error::ForgeResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use forge_core::{ForgeError, ForgeResult, Validatable};
///
/// struct Column {
///     name: String,
/// }
///
/// impl Validatable for Column {
///     fn validate(&self) -> ForgeResult<()> {
///         if self.name.is_empty() {
///             return Err(ForgeError::validation("Column name cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `ForgeError` describing the problem.
    fn validate(&self) -> ForgeResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Check that a name is a usable SQL identifier: ASCII letters, digits and
/// underscores, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForgeError;

    struct Column(String);

    impl Validatable for Column {
        fn validate(&self) -> ForgeResult<()> {
            if !is_identifier(&self.0) {
                return Err(ForgeError::validation("bad column"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_is_valid_default() {
        assert!(Column("email".to_string()).is_valid());
        assert!(!Column("".to_string()).is_valid());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("email"));
        assert!(is_identifier("user_id"));
        assert!(is_identifier("_hidden"));
        assert!(is_identifier("line2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fa"));
        assert!(!is_identifier("first-name"));
        assert!(!is_identifier("na me"));
    }
}

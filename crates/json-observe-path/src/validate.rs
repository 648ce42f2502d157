//! Validation functions for path expressions.

use thiserror::Error;

/// Maximum allowed expression string length.
const MAX_EXPR_LENGTH: usize = 1024;

/// Maximum allowed path depth.
const MAX_PATH_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("EXPR_INVALID")]
    ExprInvalid,
    #[error("EXPR_TOO_LONG")]
    ExprTooLong,
    #[error("Path too long")]
    PathTooLong,
    #[error("Invalid path step")]
    InvalidPathStep,
}

/// Validate a path expression string.
///
/// # Errors
///
/// Returns an error if:
/// - The expression exceeds the maximum length (1024 characters)
/// - The expression has a leading, trailing, or doubled separator (these
///   would parse to empty components, which do not round-trip)
///
/// # Example
///
/// ```
/// use json_observe_path::validate_expr;
///
/// validate_expr("").unwrap();  // Root is valid
/// validate_expr("foo.bar").unwrap();
/// validate_expr(".foo").unwrap_err();
/// validate_expr("foo..bar").unwrap_err();
/// ```
pub fn validate_expr(expr: &str) -> Result<(), ValidationError> {
    if expr.len() > MAX_EXPR_LENGTH {
        return Err(ValidationError::ExprTooLong);
    }
    if expr.is_empty() {
        return Ok(());
    }
    if expr.starts_with('.') || expr.ends_with('.') || expr.contains("..") {
        return Err(ValidationError::ExprInvalid);
    }
    Ok(())
}

/// Validate a path (array of path steps).
///
/// # Errors
///
/// Returns an error if:
/// - The path exceeds the maximum depth (256 steps)
/// - Any step is the empty string
///
/// # Example
///
/// ```
/// use json_observe_path::validate_path;
///
/// validate_path(&["foo".to_string(), "bar".to_string()]).unwrap();
/// validate_path(&["".to_string()]).unwrap_err();
/// ```
pub fn validate_path(path: &[String]) -> Result<(), ValidationError> {
    if path.len() > MAX_PATH_DEPTH {
        return Err(ValidationError::PathTooLong);
    }
    if path.iter().any(|step| step.is_empty()) {
        return Err(ValidationError::InvalidPathStep);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_expr() {
        assert!(validate_expr("").is_ok());
    }

    #[test]
    fn test_validate_normal_expr() {
        assert!(validate_expr("foo").is_ok());
        assert!(validate_expr("foo.bar").is_ok());
        assert!(validate_expr("a~0b.c~1d").is_ok());
    }

    #[test]
    fn test_validate_separator_misuse() {
        assert!(validate_expr(".foo").is_err());
        assert!(validate_expr("foo.").is_err());
        assert!(validate_expr("foo..bar").is_err());
        assert!(validate_expr(".").is_err());
    }

    #[test]
    fn test_validate_long_expr() {
        let long_expr = "a".repeat(2000);
        assert!(validate_expr(&long_expr).is_err());
    }

    #[test]
    fn test_validate_short_path() {
        let path = vec!["foo".to_string(), "bar".to_string()];
        assert!(validate_path(&path).is_ok());
    }

    #[test]
    fn test_validate_empty_step() {
        let path = vec!["foo".to_string(), "".to_string()];
        assert!(validate_path(&path).is_err());
    }

    #[test]
    fn test_validate_long_path() {
        let path: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        assert!(validate_path(&path).is_err());
    }

    #[test]
    fn test_validate_max_depth_path() {
        let path: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        assert!(validate_path(&path).is_ok());
    }
}

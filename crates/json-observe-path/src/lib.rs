//! Dot-delimited path expressions.
//!
//! A path expression addresses a node inside a nested JSON document as a
//! `.`-joined chain of keys, e.g. `user.addresses.0.city`. The root is the
//! empty expression. Components are escaped so that keys containing a literal
//! `~` or `.` still map to exactly one expression: `~` is written `~0` and
//! `.` is written `~1`.
//!
//! # Example
//!
//! ```
//! use json_observe_path::{parse_dot_path, format_dot_path, join_key, value_at};
//!
//! // Parse an expression into path components
//! let path = parse_dot_path("user.name");
//! assert_eq!(path, vec!["user".to_string(), "name".to_string()]);
//!
//! // Format path components back to an expression
//! assert_eq!(format_dot_path(&path), "user.name");
//!
//! // Extend an expression by one key
//! assert_eq!(join_key("user", "name"), "user.name");
//!
//! // Get a value from a JSON document
//! let doc = serde_json::json!({"user": {"name": "ada"}});
//! assert_eq!(value_at(&doc, &path), Some(&serde_json::json!("ada")));
//! ```

use serde_json::Value;
use thiserror::Error;

// Re-export types
pub mod types;
pub use types::{DotPath, PathStep};

// Re-export validation
pub mod validate;
pub use validate::{validate_expr, validate_path, ValidationError};

/// Unescapes a path expression component.
///
/// `~1` is replaced with `.` and `~0` is replaced with `~`.
///
/// # Example
///
/// ```
/// use json_observe_path::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c.d");
/// assert_eq!(unescape_component("no-escapes"), "no-escapes");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", ".").replace("~0", "~")
}

/// Escapes a path expression component.
///
/// `.` is replaced with `~1` and `~` is replaced with `~0`.
///
/// # Example
///
/// ```
/// use json_observe_path::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c.d"), "c~1d");
/// assert_eq!(escape_component("no-escapes"), "no-escapes");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('.') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before .
    component.replace('~', "~0").replace('.', "~1")
}

/// Parse a path expression into path components.
///
/// - The empty expression is the root and returns an empty vec
/// - Each component is unescaped
///
/// # Example
///
/// ```
/// use json_observe_path::parse_dot_path;
///
/// assert_eq!(parse_dot_path(""), Vec::<String>::new());
/// assert_eq!(parse_dot_path("foo"), vec!["foo"]);
/// assert_eq!(parse_dot_path("foo.bar"), vec!["foo", "bar"]);
/// assert_eq!(parse_dot_path("a~0b.c~1d"), vec!["a~b", "c.d"]);
/// ```
pub fn parse_dot_path(expr: &str) -> Vec<String> {
    if expr.is_empty() {
        return Vec::new();
    }
    expr.split('.').map(unescape_component).collect()
}

/// Format path components into a path expression.
///
/// Returns the empty expression for the root path (empty components). Note
/// that an empty-string component at the root also formats to the empty
/// expression; empty keys do not round-trip and are rejected by
/// [`validate_path`].
///
/// # Example
///
/// ```
/// use json_observe_path::format_dot_path;
///
/// assert_eq!(format_dot_path(&[]), "");
/// assert_eq!(format_dot_path(&["foo".to_string()]), "foo");
/// assert_eq!(format_dot_path(&["foo".to_string(), "bar".to_string()]), "foo.bar");
/// assert_eq!(format_dot_path(&["a~b".to_string(), "c.d".to_string()]), "a~0b.c~1d");
/// ```
pub fn format_dot_path(path: &[String]) -> String {
    if path.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for (i, component) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&escape_component(component));
    }
    out
}

/// Extend a path expression by one raw object key.
///
/// The key is escaped; the root expression gains no separator.
///
/// # Example
///
/// ```
/// use json_observe_path::join_key;
///
/// assert_eq!(join_key("", "user"), "user");
/// assert_eq!(join_key("user", "name"), "user.name");
/// assert_eq!(join_key("user", "a.b"), "user.a~1b");
/// ```
pub fn join_key(prefix: &str, key: &str) -> String {
    let escaped = escape_component(key);
    if prefix.is_empty() {
        return escaped;
    }
    let mut out = String::with_capacity(prefix.len() + 1 + escaped.len());
    out.push_str(prefix);
    out.push('.');
    out.push_str(&escaped);
    out
}

/// Extend a path expression by one array index.
///
/// # Example
///
/// ```
/// use json_observe_path::join_index;
///
/// assert_eq!(join_index("list", 0), "list.0");
/// assert_eq!(join_index("", 3), "3");
/// ```
pub fn join_index(prefix: &str, index: usize) -> String {
    if prefix.is_empty() {
        return index.to_string();
    }
    format!("{}.{}", prefix, index)
}

/// Check if a path points to the root value.
///
/// # Example
///
/// ```
/// use json_observe_path::is_root;
///
/// assert!(is_root(&[]));
/// assert!(!is_root(&["foo".to_string()]));
/// ```
pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

/// Check if `parent` path contains the `child` path.
///
/// # Example
///
/// ```
/// use json_observe_path::is_child;
///
/// let parent = vec!["foo".to_string()];
/// let child = vec!["foo".to_string(), "bar".to_string()];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// ```
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    if parent.len() >= child.len() {
        return false;
    }
    for i in 0..parent.len() {
        if parent[i] != child[i] {
            return false;
        }
    }
    true
}

/// Check if the expression `child` addresses a strict descendant of `parent`.
///
/// Operates on formatted expressions directly. Sound because `.` only ever
/// appears as a separator in a formatted expression (literal dots in keys are
/// escaped to `~1`).
///
/// # Example
///
/// ```
/// use json_observe_path::is_child_expr;
///
/// assert!(is_child_expr("foo", "foo.bar"));
/// assert!(is_child_expr("", "foo"));
/// assert!(!is_child_expr("foo", "foo"));
/// assert!(!is_child_expr("foo.ba", "foo.bar"));
/// ```
pub fn is_child_expr(parent: &str, child: &str) -> bool {
    if parent.is_empty() {
        return !child.is_empty();
    }
    child.len() > parent.len()
        && child.starts_with(parent)
        && child.as_bytes()[parent.len()] == b'.'
}

/// Check if two paths are equal.
pub fn is_path_equal(p1: &[String], p2: &[String]) -> bool {
    if p1.len() != p2.len() {
        return false;
    }
    for i in 0..p1.len() {
        if p1[i] != p2[i] {
            return false;
        }
    }
    true
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns an error if the path has no parent (is empty/root).
///
/// # Example
///
/// ```
/// use json_observe_path::parent;
///
/// assert_eq!(parent(&["foo".to_string(), "bar".to_string()]).unwrap(), vec!["foo"]);
/// assert!(parent(&[]).is_err());
/// ```
pub fn parent(path: &[String]) -> Result<Vec<String>, DotPathError> {
    if path.is_empty() {
        return Err(DotPathError::NoParent);
    }
    Ok(path[..path.len() - 1].to_vec())
}

/// Split a path into its parent slice and last step.
///
/// Returns `None` for the root path.
///
/// # Example
///
/// ```
/// use json_observe_path::split_last;
///
/// let path = vec!["foo".to_string(), "bar".to_string()];
/// let (head, last) = split_last(&path).unwrap();
/// assert_eq!(head, &["foo".to_string()]);
/// assert_eq!(last, "bar");
/// assert_eq!(split_last(&[]), None);
/// ```
pub fn split_last(path: &[String]) -> Option<(&[String], &str)> {
    let (last, head) = path.split_last()?;
    Some((head, last.as_str()))
}

/// Check if a string represents a valid non-negative integer array index.
///
/// # Example
///
/// ```
/// use json_observe_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("1.5"));
/// assert!(!is_valid_index("abc"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // First char can't be leading zero unless it's just "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Check if a string consists only of ASCII digits.
pub fn is_integer(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Get a value from a JSON document by path.
///
/// Returns `None` if the path doesn't exist or is invalid.
///
/// # Example
///
/// ```
/// use json_observe_path::value_at;
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": 42}});
/// let val = value_at(&doc, &["foo".to_string(), "bar".to_string()]);
/// assert_eq!(val, Some(&json!(42)));
///
/// let missing = value_at(&doc, &["missing".to_string()]);
/// assert_eq!(missing, None);
/// ```
pub fn value_at<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(val);
    }

    let mut current = val;
    for path_step in path {
        match current {
            Value::Array(arr) => {
                if !is_valid_index(path_step) {
                    return None;
                }
                let idx: usize = path_step.parse().ok()?;
                current = arr.get(idx)?;
            }
            Value::Object(map) => {
                current = map.get(path_step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
///
/// Returns `None` if the path doesn't exist or is invalid.
pub fn value_at_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(val);
    }

    let mut current = val;
    for path_step in path {
        match current {
            Value::Array(arr) => {
                if !is_valid_index(path_step) {
                    return None;
                }
                let idx: usize = path_step.parse().ok()?;
                current = arr.get_mut(idx)?;
            }
            Value::Object(map) => {
                current = map.get_mut(path_step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Find a value in a JSON document by path, distinguishing failure modes.
///
/// # Errors
///
/// - `DotPathError::NotFound` - a step addresses a missing key, an index past
///   the end, or a scalar
/// - `DotPathError::InvalidIndex` - a step into an array is not a valid index
///
/// # Example
///
/// ```
/// use json_observe_path::{find, DotPathError};
/// use serde_json::json;
///
/// let doc = json!({"arr": [1, 2, 3]});
/// assert_eq!(find(&doc, &["arr".to_string(), "1".to_string()]).unwrap(), &json!(2));
///
/// let err = find(&doc, &["arr".to_string(), "x".to_string()]).unwrap_err();
/// assert_eq!(err, DotPathError::InvalidIndex);
/// ```
pub fn find<'a>(val: &'a Value, path: &[String]) -> Result<&'a Value, DotPathError> {
    if path.is_empty() {
        return Ok(val);
    }

    let mut current = val;
    for path_step in path {
        match current {
            Value::Array(arr) => {
                if !is_valid_index(path_step) {
                    return Err(DotPathError::InvalidIndex);
                }
                let idx: usize = path_step
                    .parse()
                    .map_err(|_| DotPathError::InvalidIndex)?;
                current = arr.get(idx).ok_or(DotPathError::NotFound)?;
            }
            Value::Object(map) => {
                current = map.get(path_step).ok_or(DotPathError::NotFound)?;
            }
            _ => return Err(DotPathError::NotFound),
        }
    }
    Ok(current)
}

/// Get a value by expression string directly.
///
/// This is a convenience function that parses the expression and navigates.
///
/// # Example
///
/// ```
/// use json_observe_path::value_at_expr;
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": 42}});
/// assert_eq!(value_at_expr(&doc, "foo.bar"), Some(&json!(42)));
/// assert_eq!(value_at_expr(&doc, ""), Some(&doc));
/// ```
pub fn value_at_expr<'a>(val: &'a Value, expr: &str) -> Option<&'a Value> {
    value_at(val, &parse_dot_path(expr))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DotPathError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("NO_PARENT")]
    NoParent,
}

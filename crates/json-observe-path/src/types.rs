//! Type definitions for path expressions.

/// A single step in a parsed path expression.
///
/// Either an object key or a stringified array index; the raw (unescaped)
/// form of the key.
pub type PathStep = String;

/// A parsed path expression.
pub type DotPath = Vec<PathStep>;

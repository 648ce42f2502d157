//! Leaf value categories.
//!
//! Leaves are the value categories a deep copy reconstructs wholesale instead
//! of recursing into: timestamps, compiled match patterns, boxed primitives,
//! error records, and unique tokens. None of them can refer back into the
//! graph, so cloning one never consults the identity map.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use regex::RegexBuilder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("UNKNOWN_FLAG")]
    UnknownFlag(char),
    #[error("INVALID_PATTERN")]
    InvalidPattern(#[from] regex::Error),
}

/// A point in time as milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateValue {
    epoch_ms: i64,
}

impl DateValue {
    pub fn new(epoch_ms: i64) -> DateValue {
        DateValue { epoch_ms }
    }

    pub fn epoch_ms(&self) -> i64 {
        self.epoch_ms
    }
}

/// A compiled match pattern with a live match cursor.
///
/// Carries the original pattern text and flag text alongside the compiled
/// form, so a copy can be rebuilt without recompiling. The cursor
/// (`last_index`) marks where the next [`find_next`](Self::find_next) starts
/// and advances past each match.
#[derive(Clone)]
pub struct PatternValue {
    regex: regex::Regex,
    source: String,
    flags: String,
    last_index: Cell<usize>,
}

impl PatternValue {
    /// Compile a pattern from its source text and flag text.
    ///
    /// Recognized flags: `i` (case-insensitive), `m` (multi-line), `s` (dot
    /// matches newline), plus `g` and `y`, which carry no compilation
    /// behavior and are kept in the flag text only.
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized flag character or for pattern
    /// text that does not compile.
    pub fn new(source: &str, flags: &str) -> Result<PatternValue, PatternError> {
        let mut ignore_case = false;
        let mut multi_line = false;
        let mut dot_all = false;
        for flag in flags.chars() {
            match flag {
                'i' => ignore_case = true,
                'm' => multi_line = true,
                's' => dot_all = true,
                'g' | 'y' => {}
                other => return Err(PatternError::UnknownFlag(other)),
            }
        }
        let regex = RegexBuilder::new(source)
            .case_insensitive(ignore_case)
            .multi_line(multi_line)
            .dot_matches_new_line(dot_all)
            .build()?;
        Ok(PatternValue {
            regex,
            source: source.to_string(),
            flags: flags.to_string(),
            last_index: Cell::new(0),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Current match cursor, as a byte offset into the haystack.
    pub fn last_index(&self) -> usize {
        self.last_index.get()
    }

    pub fn set_last_index(&self, index: usize) {
        self.last_index.set(index);
    }

    /// Find the next match at or after the cursor, advancing the cursor past
    /// it. Returns the matched byte range. On a miss (or a cursor that is out
    /// of range or off a character boundary) the cursor resets to zero and
    /// `None` is returned.
    pub fn find_next(&self, haystack: &str) -> Option<(usize, usize)> {
        let start = self.last_index.get();
        if start > haystack.len() || !haystack.is_char_boundary(start) {
            self.last_index.set(0);
            return None;
        }
        match self.regex.find_at(haystack, start) {
            Some(m) => {
                self.last_index.set(m.end());
                Some((m.start(), m.end()))
            }
            None => {
                self.last_index.set(0);
                None
            }
        }
    }

    /// Test whether the pattern matches anywhere in `haystack`. Does not
    /// touch the cursor.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl fmt::Debug for PatternValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// An error record: a message, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    message: String,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> ErrorValue {
        ErrorValue {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An opaque token whose identity is its allocation.
///
/// Tokens are never duplicated: equality between tokens is handle equality,
/// and a deep copy of anything holding a token still holds the same token.
#[derive(Debug)]
pub struct UniqueToken {
    description: Option<String>,
}

impl UniqueToken {
    pub fn new(description: Option<&str>) -> Rc<UniqueToken> {
        Rc::new(UniqueToken {
            description: description.map(str::to_string),
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A wrapper holding a [`UniqueToken`].
///
/// Distinct wrappers may refer to the same token; copying a wrapper makes a
/// new wrapper around the same token.
#[derive(Debug)]
pub struct TokenRef {
    token: Rc<UniqueToken>,
}

impl TokenRef {
    pub fn new(token: Rc<UniqueToken>) -> TokenRef {
        TokenRef { token }
    }

    pub fn token(&self) -> &Rc<UniqueToken> {
        &self.token
    }

    pub fn description(&self) -> Option<&str> {
        self.token.description()
    }

    /// Whether both wrappers refer to the same underlying token.
    pub fn refers_to(&self, other: &TokenRef) -> bool {
        Rc::ptr_eq(&self.token, &other.token)
    }
}

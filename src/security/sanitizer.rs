//! Recursive sanitization of JSON request bodies.
//!
//! # Responsibilities
//! - Walk any JSON value, transforming string leaves only
//! - Trim strings and purify embedded HTML (scripts, event handlers,
//!   `javascript:` URLs)
//! - Leave numbers, booleans and nulls untouched
//!
//! # Design Decisions
//! - Output has the same shape as the input: same keys, same array lengths
//! - Strings without markup are only trimmed, so plain text never gets
//!   entity-escaped
//! - URLs with an explicit safe scheme pass through unchanged
//! - Traversal depth is bounded; deeper input is rejected, not truncated

use ammonia::Builder;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Schemes a bare URL string may use and still pass through untouched.
const SAFE_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto", "tel"];

/// Schemes that execute code when followed by a browser.
const SCRIPT_SCHEMES: &[&str] = &["javascript", "vbscript", "data"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("input nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Deep sanitizer for JSON values.
pub struct Sanitizer {
    cleaner: Builder<'static>,
    max_depth: usize,
}

impl Sanitizer {
    pub fn new(max_depth: usize) -> Self {
        Self {
            cleaner: Builder::default(),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return a sanitized copy of `value`.
    pub fn sanitize(&self, value: Value) -> Result<Value, SanitizeError> {
        self.walk(value, 0)
    }

    fn walk(&self, value: Value, depth: usize) -> Result<Value, SanitizeError> {
        match value {
            Value::String(s) => Ok(Value::String(self.sanitize_str(&s))),
            Value::Array(items) => {
                self.enter(depth)?;
                items
                    .into_iter()
                    .map(|item| self.walk(item, depth + 1))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Value::Object(map) => {
                self.enter(depth)?;
                map.into_iter()
                    .map(|(key, item)| Ok((key, self.walk(item, depth + 1)?)))
                    .collect::<Result<Map<_, _>, _>>()
                    .map(Value::Object)
            }
            leaf @ (Value::Null | Value::Bool(_) | Value::Number(_)) => Ok(leaf),
        }
    }

    fn enter(&self, depth: usize) -> Result<(), SanitizeError> {
        if depth >= self.max_depth {
            return Err(SanitizeError::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Trim and purify a single string.
    pub fn sanitize_str(&self, input: &str) -> String {
        let trimmed = input.trim();

        if trimmed.contains(':') {
            if let Ok(url) = Url::parse(trimmed) {
                if SAFE_SCHEMES.contains(&url.scheme()) && !has_markup(trimmed) {
                    return trimmed.to_string();
                }
                if SCRIPT_SCHEMES.contains(&url.scheme()) {
                    return String::new();
                }
            }
        }

        if !has_markup(trimmed) {
            return trimmed.to_string();
        }

        self.cleaner.clean(trimmed).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(64)
    }
}

/// A tag opener: `<` followed by a letter, `/`, `!` or `?`. A bare `<` as in
/// "price < 100" is text.
fn has_markup(s: &str) -> bool {
    s.as_bytes().windows(2).any(|pair| {
        pair[0] == b'<' && (pair[1].is_ascii_alphabetic() || matches!(pair[1], b'/' | b'!' | b'?'))
    })
}

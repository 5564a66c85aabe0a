//! Path pattern compilation and matching.
//!
//! A pattern is a `/`-separated list of segments. A segment starting with
//! `:` is a named capture; anything else is a literal that must match the
//! request segment byte for byte. One leading and one trailing `/` are
//! ignored on both sides, so `pl/:id`, `/pl/:id`, and `/pl/:id/` compile
//! to the same pattern, and `/` has no segments at all.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::params::Params;

/// Marker that turns a segment into a named capture.
const CAPTURE_PREFIX: char = ':';

/// Errors raised while compiling a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A capture segment has no name (a bare `:`).
    #[error("empty parameter name in pattern '{pattern}'")]
    EmptyParamName {
        /// The offending pattern.
        pattern: String,
    },

    /// The same capture name appears twice.
    #[error("duplicate parameter '{name}' in pattern '{pattern}'")]
    DuplicateParam {
        /// The repeated name.
        name: String,
        /// The offending pattern.
        pattern: String,
    },
}

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),

    /// Matches any non-empty request segment and records it under this name.
    Capture(Arc<str>),
}

/// A compiled path pattern.
///
/// # Example
///
/// ```rust
/// use portico_router::PathPattern;
///
/// let pattern = PathPattern::parse("pl/:id/test/:name").unwrap();
/// let params = pattern.matches("pl/123/test/adam").unwrap();
///
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get("name"), Some("adam"));
/// assert!(pattern.matches("pl/123/test").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    captures: usize,
}

impl PathPattern {
    /// Compiles a pattern string.
    ///
    /// # Errors
    ///
    /// Fails if a capture has an empty name or a name is declared twice.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        for part in split_segments(pattern) {
            match part.strip_prefix(CAPTURE_PREFIX) {
                Some("") => {
                    return Err(PatternError::EmptyParamName {
                        pattern: pattern.to_string(),
                    });
                }
                Some(name) => {
                    if names.contains(&name) {
                        return Err(PatternError::DuplicateParam {
                            name: name.to_string(),
                            pattern: pattern.to_string(),
                        });
                    }
                    names.push(name);
                    segments.push(Segment::Capture(Arc::from(name)));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            captures: names.len(),
            segments,
        })
    }

    /// Returns the pattern string as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the declared capture names in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Capture(name) => Some(&**name),
            Segment::Literal(_) => None,
        })
    }

    /// Tests a concrete path against the pattern.
    ///
    /// Returns the captured parameters on success. A pattern without
    /// captures yields an empty (but present) parameter set when its
    /// literals match. Returns `None` when the segment counts differ, a
    /// literal differs, or a capture would bind an empty segment.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut parts = split_segments(path);
        let mut params = Params::with_capacity(self.captures);

        for segment in &self.segments {
            let actual = parts.next()?;
            match segment {
                Segment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    params.push(Arc::clone(name), actual);
                }
            }
        }

        // Leftover request segments mean the counts differ.
        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Splits a path into segments after dropping one leading and one trailing
/// slash. The empty path and `/` produce no segments. A single `/` is never
/// counted as both leading and trailing, so `//` is one empty segment.
fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let root = path.is_empty();
    let path = path.strip_suffix('/').unwrap_or(path);
    let mut parts = path.split('/');
    if root {
        // `"".split('/')` yields one empty item; skip it.
        parts.next();
    }
    parts
}

//! Anchored patterns
//!
//! A [Pattern] wraps a compiled regex that only ever matches starting exactly at the
//! position it is asked about. The source text is kept verbatim; it is the pattern's
//! identity inside a language (two patterns with the same source collide).

use crate::treelex::error::{LexError, Result};
use regex::Regex;
use std::fmt;

#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a regex source
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", source)).map_err(|e| {
            LexError::InvalidPattern {
                pattern: source.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    /// A pattern matching `text` literally
    pub fn literal(text: &str) -> Result<Self> {
        Self::new(&regex::escape(text))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// End offset of the match starting exactly at `head`
    ///
    /// Zero-length matches are treated as no match. `head` must lie on a char boundary.
    pub fn match_at(&self, input: &str, head: usize) -> Option<usize> {
        let rest = input.get(head..)?;
        match self.regex.find(rest) {
            Some(m) if m.end() > 0 => Some(head + m.end()),
            _ => None,
        }
    }

    /// Whether the whole of `text` is a match
    pub fn matches_whole(&self, text: &str) -> bool {
        !text.is_empty() && self.match_at(text, 0) == Some(text.len())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

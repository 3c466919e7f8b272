//! Errors raised while registering patterns or lexing input
//!
//! Every failure is terminal for the call that produced it. The engine never downgrades
//! or retries; errors carry the position and context needed to report them to a user.

use std::fmt;

/// Errors that can occur during registration or lexing
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A token was requested but the head is already at or past the end of the input
    EmptyInput { position: usize },
    /// Nothing registered in the language matches at `position`
    UnrecognizedCharacter {
        position: usize,
        character: char,
        remaining: String,
    },
    /// A closer that does not belong to the active descender, or input that ran out
    /// inside an open descender (`found` is `None` in that case)
    UnbalancedDescender {
        position: usize,
        expected: Option<String>,
        found: Option<String>,
    },
    /// The pattern is already owned by another entry of the same language
    PatternCollision {
        pattern: String,
        owner: String,
        name: String,
    },
    /// The pattern failed to compile
    InvalidPattern { pattern: String, message: String },
    /// A rule, descender or ignore with this name already exists
    DuplicateName { kind: &'static str, name: String },
    /// A rule or descender action rejected its input
    Action { name: String, message: String },
    /// No entry with this name is registered
    UnknownName { kind: &'static str, name: String },
    /// Nesting went deeper than the lexer's configured limit
    DepthExceeded { depth: usize, position: usize },
    /// The head points into the middle of a multi-byte character
    NotCharBoundary { position: usize },
}

impl LexError {
    /// Convenience constructor for action failures
    pub fn action(name: impl Into<String>, message: impl fmt::Display) -> Self {
        LexError::Action {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Input offset the error refers to, when it stems from lexing
    pub fn position(&self) -> Option<usize> {
        match self {
            LexError::EmptyInput { position }
            | LexError::UnrecognizedCharacter { position, .. }
            | LexError::UnbalancedDescender { position, .. }
            | LexError::DepthExceeded { position, .. }
            | LexError::NotCharBoundary { position } => Some(*position),
            _ => None,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::EmptyInput { position } => {
                write!(f, "No input left to lex at index {}", position)
            }
            LexError::UnrecognizedCharacter {
                position,
                character,
                remaining,
            } => write!(
                f,
                "Unrecognized character '{}' at index {}, remaining input: \"{}\"",
                character, position, remaining
            ),
            LexError::UnbalancedDescender {
                position,
                expected,
                found,
            } => match (expected, found) {
                (Some(expected), Some(found)) => write!(
                    f,
                    "Unbalanced descender at index {}: found closer of '{}' while inside '{}'",
                    position, found, expected
                ),
                (None, Some(found)) => write!(
                    f,
                    "Unbalanced descender at index {}: found closer of '{}' with nothing open",
                    position, found
                ),
                (Some(expected), None) => write!(
                    f,
                    "Unbalanced descender at index {}: input ended before '{}' was closed",
                    position, expected
                ),
                (None, None) => write!(f, "Unbalanced descender at index {}", position),
            },
            LexError::PatternCollision {
                pattern,
                owner,
                name,
            } => write!(
                f,
                "Cannot register '{}': pattern /{}/ is already owned by '{}'",
                name, pattern, owner
            ),
            LexError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid pattern /{}/: {}", pattern, message)
            }
            LexError::DuplicateName { kind, name } => {
                write!(f, "A {} named '{}' is already registered", kind, name)
            }
            LexError::Action { name, message } => {
                write!(f, "Action for '{}' failed: {}", name, message)
            }
            LexError::UnknownName { kind, name } => write!(f, "No {} named '{}'", kind, name),
            LexError::DepthExceeded { depth, position } => write!(
                f,
                "Nesting depth {} exceeded at index {}",
                depth, position
            ),
            LexError::NotCharBoundary { position } => write!(
                f,
                "Index {} is not on a character boundary",
                position
            ),
        }
    }
}

impl std::error::Error for LexError {}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LexError>;

//! Regex-driven tree lexer
//!
//!     A lexer is configured with a [Language]: rules (pattern + action producing a cell),
//!     descenders (open/close pattern pairs that nest) and ignore patterns. Lexing scans the
//!     input from the head, picks the longest matching pattern, and builds a chain of
//!     [Cell]s. Each descender region becomes a single cell whose car is the chain lexed
//!     between its delimiters, so the output is a tree.
//!
//!         let mut language = Language::new();
//!         language.add_rule("integer", "[0-9]+", Parsed::integer(Type::new("integer")))?;
//!         language.add_rule("operator", "[-+*/]", Type::new("operator"))?;
//!         language.insert_descender("paren", Descender::delimited("paren", "(", ")")?)?;
//!         language.add_standard_ignores()?;
//!
//!         let chain = Lexer::new(language).lex("1 + (2 * 3)")?;
//!         assert_eq!(chain.to_string(), "1 + (2 * 3)");
//!
//! Modules
//!
//!     - [types]: value types, payload values and the EMPTY/TOKEN sentinels
//!     - [cell]: the linked token tree
//!     - [pattern], [rule], [descender]: what a language is made of
//!     - [language]: the registry, collision checks and match selection
//!     - [state], [lexer]: the scan/descent engine
//!     - [definition]: languages declared in YAML or JSON
//!     - [formats]: rendering token trees (treeviz, json, sexp)

pub mod cell;
pub mod definition;
pub mod descender;
pub mod error;
pub mod formats;
pub mod ignores;
pub mod language;
pub mod lexer;
pub mod logging;
pub mod pattern;
pub mod rule;
pub mod state;
pub mod types;

pub use cell::Cell;
pub use definition::{DefinitionError, DefinitionFormat, LanguageDefinition};
pub use descender::{CloseAction, Descender};
pub use error::{LexError, Result};
pub use language::Language;
pub use lexer::{Lexer, Step};
pub use pattern::Pattern;
pub use rule::{Action, Parsed, Rule, ValueKind};
pub use state::{ActiveDescender, LexerState};
pub use types::{Delimiters, Type, Value, ValueType, EMPTY, TOKEN};

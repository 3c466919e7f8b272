//! Declarative language definitions
//!
//! A [LanguageDefinition] lists rules, descenders and ignores as data so a language can be
//! kept in a YAML or JSON file next to the inputs it lexes:
//!
//! ```yaml
//! name: arithmetic
//! rules:
//!   - name: decimal
//!     pattern: "[0-9]+\\.[0-9]+"
//!     kind: decimal
//!   - name: integer
//!     pattern: "[0-9]+"
//!     kind: integer
//!   - name: operator
//!     pattern: "[-+*/]"
//! descenders:
//!   - name: paren
//!     open: "("
//!     close: ")"
//! ignores:
//!   - name: whitespace
//! ```
//!
//! Rules default to the `text` kind and a type named after the rule. Descender `open` and
//! `close` are literal delimiters, used both for matching and for rendering; set
//! `open_pattern`/`close_pattern` to match with a regex instead. An ignore without a
//! pattern names one of the stock [ignores](crate::treelex::ignores). Entries are
//! registered rules first, then descenders, then ignores, each in file order.

use crate::treelex::descender::Descender;
use crate::treelex::error::LexError;
use crate::treelex::ignores;
use crate::treelex::language::Language;
use crate::treelex::pattern::Pattern;
use crate::treelex::rule::{Parsed, ValueKind};
use crate::treelex::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub descenders: Vec<DescenderDefinition>,
    #[serde(default)]
    pub ignores: Vec<IgnoreDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub name: String,
    pub pattern: String,
    /// Type name of produced cells; defaults to the rule name
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescenderDefinition {
    pub name: String,
    pub open: String,
    pub close: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_pattern: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// File format of a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(DefinitionFormat::Yaml),
            "json" => Some(DefinitionFormat::Json),
            _ => None,
        }
    }
}

/// Errors from reading or building a definition
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionError {
    /// The file could not be read
    Io(String),
    /// The file extension does not name a known format
    UnknownFormat(String),
    /// The text is not a valid definition
    Parse(String),
    /// An entry is incomplete or refers to something unknown
    Invalid(String),
    /// Registering an entry failed
    Lex(LexError),
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::Io(msg) => write!(f, "Cannot read definition: {}", msg),
            DefinitionError::UnknownFormat(path) => {
                write!(f, "Cannot tell the definition format of '{}'", path)
            }
            DefinitionError::Parse(msg) => write!(f, "Invalid definition: {}", msg),
            DefinitionError::Invalid(msg) => write!(f, "Invalid definition entry: {}", msg),
            DefinitionError::Lex(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DefinitionError {}

impl From<LexError> for DefinitionError {
    fn from(err: LexError) -> Self {
        DefinitionError::Lex(err)
    }
}

impl LanguageDefinition {
    pub fn from_yaml_str(text: &str) -> Result<Self, DefinitionError> {
        serde_yaml::from_str(text).map_err(|e| DefinitionError::Parse(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(text).map_err(|e| DefinitionError::Parse(e.to_string()))
    }

    pub fn parse(text: &str, format: DefinitionFormat) -> Result<Self, DefinitionError> {
        match format {
            DefinitionFormat::Yaml => Self::from_yaml_str(text),
            DefinitionFormat::Json => Self::from_json_str(text),
        }
    }

    /// Read a definition file, picking the format from its extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)
            .ok_or_else(|| DefinitionError::UnknownFormat(path.display().to_string()))?;
        let text = fs::read_to_string(path)
            .map_err(|e| DefinitionError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&text, format)
    }

    pub fn to_yaml_string(&self) -> Result<String, DefinitionError> {
        serde_yaml::to_string(self).map_err(|e| DefinitionError::Parse(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, DefinitionError> {
        serde_json::to_string_pretty(self).map_err(|e| DefinitionError::Parse(e.to_string()))
    }

    /// Register every entry into a fresh language
    pub fn build(&self) -> Result<Language, DefinitionError> {
        let mut language = Language::new();
        for rule in &self.rules {
            let value_type = Type::new(rule.type_name.as_deref().unwrap_or(&rule.name));
            match rule.kind {
                ValueKind::Text => language.add_rule(&rule.name, &rule.pattern, value_type)?,
                kind => language.add_rule(
                    &rule.name,
                    &rule.pattern,
                    Parsed::new(value_type, kind),
                )?,
            }
        }
        for descender in &self.descenders {
            language.insert_descender(&descender.name, descender.build()?)?;
        }
        for ignore in &self.ignores {
            let pattern = match &ignore.pattern {
                Some(pattern) => pattern.as_str(),
                None => ignores::standard(&ignore.name).ok_or_else(|| {
                    DefinitionError::Invalid(format!(
                        "ignore '{}' has no pattern and is not one of: {}",
                        ignore.name,
                        ignores::STANDARD_NAMES.join(", ")
                    ))
                })?,
            };
            language.add_ignore(&ignore.name, pattern)?;
        }
        Ok(language)
    }
}

impl DescenderDefinition {
    fn build(&self) -> Result<Descender, DefinitionError> {
        if self.open.is_empty() || self.close.is_empty() {
            return Err(DefinitionError::Invalid(format!(
                "descender '{}' needs non-empty open and close delimiters",
                self.name
            )));
        }
        let open = match &self.open_pattern {
            Some(source) => Pattern::new(source)?,
            None => Pattern::literal(&self.open)?,
        };
        let close = match &self.close_pattern {
            Some(source) => Pattern::new(source)?,
            None => Pattern::literal(&self.close)?,
        };
        let value_type = Type::descender(
            self.type_name.as_deref().unwrap_or(&self.name),
            self.open.as_str(),
            self.close.as_str(),
        );
        Ok(Descender::new(open, close, value_type))
    }
}

//! Rules and actions
//!
//! A [Rule] pairs a pattern with an [Action]. When the rule's pattern wins at the head,
//! the action turns the matched text into a cell that is appended to the output.
//!
//! Any `Fn(&str) -> Result<Cell>` is an action. A bare [Type] is the simplest action: it
//! stores the matched text as the car of a cell of that type. [Parsed] converts the text
//! into a typed scalar first.

use crate::treelex::cell::Cell;
use crate::treelex::error::{LexError, Result};
use crate::treelex::pattern::Pattern;
use crate::treelex::types::{Type, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Converts matched text into a cell
pub trait Action: Send + Sync {
    fn run(&self, matched: &str) -> Result<Cell>;
}

impl<F> Action for F
where
    F: Fn(&str) -> Result<Cell> + Send + Sync,
{
    fn run(&self, matched: &str) -> Result<Cell> {
        self(matched)
    }
}

impl Action for Type {
    fn run(&self, matched: &str) -> Result<Cell> {
        Ok(Cell::leaf(matched, self.clone()))
    }
}

/// Scalar kind a matched text is parsed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    #[default]
    Text,
    Integer,
    Decimal,
    Boolean,
}

impl ValueKind {
    pub fn parse(&self, text: &str) -> std::result::Result<Value, String> {
        match self {
            ValueKind::Text => Ok(Value::Text(text.to_string())),
            ValueKind::Integer => text
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| format!("'{}' is not an integer: {}", text, e)),
            ValueKind::Decimal => text
                .parse::<f64>()
                .map(Value::Decimal)
                .map_err(|e| format!("'{}' is not a decimal: {}", text, e)),
            ValueKind::Boolean => match text {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(format!("'{}' is not a boolean", text)),
            },
        }
    }
}

/// Action parsing the match into a [ValueKind] scalar of a given type
#[derive(Debug, Clone)]
pub struct Parsed {
    value_type: Type,
    kind: ValueKind,
}

impl Parsed {
    pub fn new(value_type: Type, kind: ValueKind) -> Self {
        Parsed { value_type, kind }
    }

    pub fn integer(value_type: Type) -> Self {
        Self::new(value_type, ValueKind::Integer)
    }

    pub fn decimal(value_type: Type) -> Self {
        Self::new(value_type, ValueKind::Decimal)
    }

    pub fn boolean(value_type: Type) -> Self {
        Self::new(value_type, ValueKind::Boolean)
    }
}

impl Action for Parsed {
    fn run(&self, matched: &str) -> Result<Cell> {
        let value = self
            .kind
            .parse(matched)
            .map_err(|message| LexError::action(self.value_type.name(), message))?;
        Ok(Cell::leaf(value, self.value_type.clone()))
    }
}

/// A flat pattern-to-action mapping
#[derive(Clone)]
pub struct Rule {
    pattern: Pattern,
    action: Arc<dyn Action>,
}

impl Rule {
    pub fn new(pattern: Pattern, action: impl Action + 'static) -> Self {
        Rule {
            pattern,
            action: Arc::new(action),
        }
    }

    /// Compile `pattern` and build the rule
    pub fn from_pattern(pattern: &str, action: impl Action + 'static) -> Result<Self> {
        Ok(Self::new(Pattern::new(pattern)?, action))
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn apply(&self, matched: &str) -> Result<Cell> {
        self.action.run(matched)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_action_keeps_text() {
        let rule = Rule::from_pattern("[a-z]+", Type::new("word")).unwrap();
        let cell = rule.apply("hello").unwrap();
        assert_eq!(cell.car(), Value::from("hello"));
        assert_eq!(cell.car_type().name(), "word");
    }

    #[test]
    fn test_closure_action() {
        let rule = Rule::from_pattern("[0-9]+", |m: &str| -> Result<Cell> {
            Ok(Cell::leaf(m.len() as i64, Type::new("width")))
        })
        .unwrap();
        assert_eq!(rule.apply("1234").unwrap().car(), Value::Integer(4));
    }

    #[test]
    fn test_parsed_actions() {
        let int = Parsed::integer(Type::new("integer"));
        assert_eq!(int.run("42").unwrap().car(), Value::Integer(42));

        let dec = Parsed::decimal(Type::new("decimal"));
        assert_eq!(dec.run("10.5").unwrap().car(), Value::Decimal(10.5));

        let boolean = Parsed::boolean(Type::new("bool"));
        assert_eq!(boolean.run("false").unwrap().car(), Value::Boolean(false));
    }

    #[test]
    fn test_parsed_action_failure() {
        let int = Parsed::integer(Type::new("integer"));
        let err = int.run("99999999999999999999").unwrap_err();
        assert!(matches!(err, LexError::Action { ref name, .. } if name == "integer"));
    }
}

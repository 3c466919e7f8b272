//! Value types
//!
//!     A [Type] is a named tag describing what kind of value a cell slot holds. Types are
//!     immutable and cheap to clone (they share one allocation), and two types are the same
//!     type iff their names are equal, regardless of which instance produced them.
//!
//!     A type optionally carries an open/close delimiter pair. Such a type marks a descended
//!     value: the cell's car holds the nested chain, and rendering wraps it in the
//!     delimiters, so a `(`/`)` type over `3 4` renders as `(3 4)`.
//!
//!     Value-level behavior (rendering, ordering, cloning) is delegated to a [ValueType]
//!     implementation. The default, [PlainValues], renders with [Value]'s `Display`, orders
//!     scalars naturally and deep-clones nested chains.
//!
//! Sentinels
//!
//!     [EMPTY] marks "no value" and [TOKEN] marks "this slot holds a nested cell". Both are
//!     process-wide and never mutated.

use crate::treelex::cell::Cell;
use once_cell::sync::Lazy;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

/// Sentinel type for "no value"
pub static EMPTY: Lazy<Type> = Lazy::new(|| Type::new("EMPTY"));

/// Sentinel type for a slot holding a nested cell
pub static TOKEN: Lazy<Type> = Lazy::new(|| Type::new("TOKEN"));

/// Payload stored in a cell's car or cdr
///
/// The engine never inspects payloads; only actions and [ValueType] hooks do.
#[derive(Clone)]
pub enum Value {
    Empty,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Cell(Cell),
    Custom(Rc<dyn Any>),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Value::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to decimals
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Decimal(d) => Some(*d),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Natural ordering, if the two values have one
    ///
    /// Scalars of the same kind are ordered, integers and decimals compare numerically.
    /// Everything else (cells, custom payloads, mixed kinds) is unordered.
    pub fn natural_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Empty, Value::Empty) => Some(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Decimal(_), Value::Decimal(_) | Value::Integer(_))
            | (Value::Integer(_), Value::Decimal(_)) => {
                self.as_decimal()?.partial_cmp(&other.as_decimal()?)
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Cell(a), Value::Cell(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "Empty"),
            Value::Text(text) => write!(f, "Text({:?})", text),
            Value::Integer(i) => write!(f, "Integer({})", i),
            Value::Decimal(d) => write!(f, "Decimal({:?})", d),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Cell(cell) => write!(f, "{:?}", cell),
            Value::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(text) => write!(f, "{}", text),
            Value::Integer(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" on whole decimals
            Value::Decimal(d) => write!(f, "{:?}", d),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Cell(cell) => write!(f, "{}", cell),
            Value::Custom(_) => write!(f, "<custom>"),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        Value::Cell(cell)
    }
}

/// Value-level hooks attached to a [Type]
pub trait ValueType: Send + Sync {
    /// Render a value of this type
    fn value_to_string(&self, value: &Value) -> String {
        value.to_string()
    }

    /// Compare two values of this type; unordered values compare `Equal`
    fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        a.natural_cmp(b).unwrap_or(Ordering::Equal)
    }

    /// Copy a value of this type
    ///
    /// Nested chains are deep-cloned so the copy never aliases the original tree.
    fn clone_value(&self, value: &Value) -> Value {
        match value {
            Value::Cell(cell) => Value::Cell(cell.deep_clone()),
            other => other.clone(),
        }
    }
}

/// Default hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainValues;

impl ValueType for PlainValues {}

/// Open/close delimiter pair of a descender type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Delimiters {
            open: open.into(),
            close: close.into(),
        }
    }
}

struct TypeInner {
    name: String,
    delimiters: Option<Delimiters>,
    behavior: Arc<dyn ValueType>,
}

/// A named value tag
#[derive(Clone)]
pub struct Type {
    inner: Arc<TypeInner>,
}

impl Type {
    /// A plain type with default value hooks
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_behavior(name, None, Arc::new(PlainValues))
    }

    /// A descender type rendering its value between `open` and `close`
    pub fn descender(
        name: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Self {
        Self::with_behavior(
            name,
            Some(Delimiters::new(open, close)),
            Arc::new(PlainValues),
        )
    }

    pub fn with_behavior(
        name: impl Into<String>,
        delimiters: Option<Delimiters>,
        behavior: Arc<dyn ValueType>,
    ) -> Self {
        Type {
            inner: Arc::new(TypeInner {
                name: name.into(),
                delimiters,
                behavior,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn delimiters(&self) -> Option<&Delimiters> {
        self.inner.delimiters.as_ref()
    }

    pub fn is_descender(&self) -> bool {
        self.inner.delimiters.is_some()
    }

    pub fn is_empty_type(&self) -> bool {
        *self == *EMPTY
    }

    pub fn is_token_type(&self) -> bool {
        *self == *TOKEN
    }

    /// Render a value, wrapped in this type's delimiters when it has them
    pub fn value_to_string(&self, value: &Value) -> String {
        let rendered = self.inner.behavior.value_to_string(value);
        match &self.inner.delimiters {
            Some(d) => format!("{}{}{}", d.open, rendered, d.close),
            None => rendered,
        }
    }

    pub fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        self.inner.behavior.compare_values(a, b)
    }

    pub fn clone_value(&self, value: &Value) -> Value {
        self.inner.behavior.clone_value(value)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.name == other.inner.name
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl PartialOrd for Type {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Type {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.name.cmp(&other.inner.name)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.delimiters {
            Some(d) => write!(f, "Type({} {}…{})", self.inner.name, d.open, d.close),
            None => write!(f, "Type({})", self.inner.name),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Upper;

    impl ValueType for Upper {
        fn value_to_string(&self, value: &Value) -> String {
            value.to_string().to_uppercase()
        }
    }

    #[test]
    fn test_types_equal_by_name() {
        let a = Type::new("integer");
        let b = Type::descender("integer", "<", ">");
        assert_eq!(a, b);
        assert_ne!(a, Type::new("decimal"));

        let set: HashSet<Type> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_types_order_by_name() {
        let mut types = vec![Type::new("word"), Type::new("bool"), Type::new("integer")];
        types.sort();
        let names: Vec<_> = types.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["bool", "integer", "word"]);
    }

    #[test]
    fn test_sentinels() {
        assert!(EMPTY.is_empty_type());
        assert!(TOKEN.is_token_type());
        assert_ne!(*EMPTY, *TOKEN);
        assert!(!EMPTY.is_descender());
    }

    #[test]
    fn test_value_to_string_wraps_delimiters() {
        let paren = Type::descender("paren", "(", ")");
        assert_eq!(paren.value_to_string(&Value::from("3 4")), "(3 4)");
        assert_eq!(Type::new("word").value_to_string(&Value::from("hi")), "hi");
    }

    #[test]
    fn test_custom_behavior() {
        let shout = Type::with_behavior("shout", None, Arc::new(Upper));
        assert_eq!(shout.value_to_string(&Value::from("hey")), "HEY");
    }

    #[test]
    fn test_compare_values_natural_or_unordered() {
        let t = Type::new("number");
        assert_eq!(
            t.compare_values(&Value::Integer(1), &Value::Integer(2)),
            Ordering::Less
        );
        assert_eq!(
            t.compare_values(&Value::Decimal(2.5), &Value::Integer(2)),
            Ordering::Greater
        );
        assert_eq!(
            t.compare_values(&Value::from("a"), &Value::Integer(2)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_decimal_display_keeps_fraction() {
        assert_eq!(Value::Decimal(10.0).to_string(), "10.0");
        assert_eq!(Value::Decimal(0.25).to_string(), "0.25");
        assert_eq!(Value::Empty.to_string(), "");
    }

    #[test]
    fn test_clone_value_deep_clones_cells() {
        let t = Type::new("list");
        let inner = Cell::leaf(1i64, Type::new("integer"));
        let copy = t.clone_value(&Value::Cell(inner.clone()));
        let copied = copy.as_cell().unwrap();
        assert_eq!(copied, &inner);
        assert!(!copied.ptr_eq(&inner));
    }
}

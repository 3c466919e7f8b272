//! Descenders
//!
//! A [Descender] describes one nestable construct: an open pattern, a close pattern and
//! what to do at either end. When the open pattern wins, the lexer runs the optional open
//! action, lexes the enclosed text as a nested level, and once the matching close is found
//! folds that level's chain into a single cell with the [CloseAction].
//!
//! A bare [Type] used as the close action wraps the nested chain as the car of one cell of
//! that type; give it delimiters with [Type::descender] so it renders as `(...)`.

use crate::treelex::cell::Cell;
use crate::treelex::error::Result;
use crate::treelex::pattern::Pattern;
use crate::treelex::types::Type;
use std::fmt;
use std::sync::Arc;

/// Folds a finished nested chain into the cell that represents it
///
/// An empty nested level is passed as a null cell.
pub trait CloseAction: Send + Sync {
    fn close(&self, nested: Cell) -> Result<Cell>;
}

impl<F> CloseAction for F
where
    F: Fn(Cell) -> Result<Cell> + Send + Sync,
{
    fn close(&self, nested: Cell) -> Result<Cell> {
        self(nested)
    }
}

impl CloseAction for Type {
    fn close(&self, nested: Cell) -> Result<Cell> {
        Ok(Cell::nested(nested, self.clone()))
    }
}

/// Runs on the opening delimiter's text before the nested level is lexed
pub type OpenAction = Arc<dyn Fn(&str) -> Result<()> + Send + Sync>;

/// A nestable open/close construct
#[derive(Clone)]
pub struct Descender {
    open: Pattern,
    close: Pattern,
    open_action: Option<OpenAction>,
    close_action: Arc<dyn CloseAction>,
}

impl Descender {
    pub fn new(open: Pattern, close: Pattern, close_action: impl CloseAction + 'static) -> Self {
        Descender {
            open,
            close,
            open_action: None,
            close_action: Arc::new(close_action),
        }
    }

    /// Compile both regex sources and build the descender
    pub fn from_patterns(
        open: &str,
        close: &str,
        close_action: impl CloseAction + 'static,
    ) -> Result<Self> {
        Ok(Self::new(
            Pattern::new(open)?,
            Pattern::new(close)?,
            close_action,
        ))
    }

    /// Literal delimiters, wrapped in a descender type named `name`
    pub fn delimited(name: &str, open: &str, close: &str) -> Result<Self> {
        Ok(Self::new(
            Pattern::literal(open)?,
            Pattern::literal(close)?,
            Type::descender(name, open, close),
        ))
    }

    pub fn with_open_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        self.open_action = Some(Arc::new(action));
        self
    }

    pub fn open_pattern(&self) -> &Pattern {
        &self.open
    }

    pub fn close_pattern(&self) -> &Pattern {
        &self.close
    }

    /// Open and close are the same pattern, e.g. a quote character
    pub fn is_self_delimited(&self) -> bool {
        self.open == self.close
    }

    pub(crate) fn run_open(&self, matched: &str) -> Result<()> {
        match &self.open_action {
            Some(action) => action(matched),
            None => Ok(()),
        }
    }

    pub(crate) fn run_close(&self, nested: Cell) -> Result<Cell> {
        self.close_action.close(nested)
    }
}

impl fmt::Debug for Descender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descender")
            .field("open", &self.open)
            .field("close", &self.close)
            .field("open_action", &self.open_action.is_some())
            .finish_non_exhaustive()
    }
}

//! Lexer state
//!
//! One [LexerState] exists per nesting level of a lex call. It carries the input, the head
//! offset, the descender it is nested in (if any) and the chain accumulated so far at that
//! level. Descending creates a fresh state at the same head with an empty chain; the
//! caller picks up the child's head when the child returns, so the call stack is the only
//! stack of levels.

use crate::treelex::cell::Cell;
use crate::treelex::descender::Descender;
use crate::treelex::language::Language;
use std::sync::Arc;

/// The descender a nesting level was opened by
#[derive(Clone)]
pub struct ActiveDescender {
    name: Arc<str>,
    descender: Arc<Descender>,
}

impl ActiveDescender {
    pub(crate) fn new(name: Arc<str>, descender: Arc<Descender>) -> Self {
        ActiveDescender { name, descender }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descender(&self) -> &Descender {
        &self.descender
    }

    /// Identity, not structural equality: the same registered descender
    pub(crate) fn is(&self, other: &Arc<Descender>) -> bool {
        Arc::ptr_eq(&self.descender, other)
    }
}

/// Cursor and output accumulator for one nesting level
pub struct LexerState<'a> {
    pub(crate) language: &'a Language,
    input: &'a str,
    pub(crate) head: usize,
    active: Option<ActiveDescender>,
    depth: usize,
    root: Cell,
    last: Cell,
}

impl<'a> LexerState<'a> {
    pub fn new(language: &'a Language, input: &'a str, head: usize) -> Self {
        let root = Cell::new();
        LexerState {
            language,
            input,
            head,
            active: None,
            depth: 0,
            last: root.clone(),
            root,
        }
    }

    /// A nested level at the same head, with nothing accumulated yet
    pub fn descend(&self, active: ActiveDescender) -> LexerState<'a> {
        let mut nested = LexerState::new(self.language, self.input, self.head);
        nested.active = Some(active);
        nested.depth = self.depth + 1;
        nested
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn remaining(&self) -> &'a str {
        self.input.get(self.head..).unwrap_or("")
    }

    pub fn at_end(&self) -> bool {
        self.head >= self.input.len()
    }

    pub fn active_descender(&self) -> Option<&ActiveDescender> {
        self.active.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Chain accumulated at this level so far
    pub fn output(&self) -> &Cell {
        &self.root
    }

    pub(crate) fn push(&mut self, cell: Cell) {
        self.last = self.last.append(cell);
    }

    /// Hand over the accumulated chain and start a fresh one
    pub(crate) fn take_output(&mut self) -> Cell {
        let fresh = Cell::new();
        self.last = fresh.clone();
        std::mem::replace(&mut self.root, fresh)
    }

    pub(crate) fn snapshot(&self) -> (usize, Cell, Cell) {
        (self.head, self.root.clone(), self.last.clone())
    }

    pub(crate) fn restore(&mut self, snapshot: (usize, Cell, Cell)) {
        let (head, root, last) = snapshot;
        self.head = head;
        self.root = root;
        self.last = last;
    }

    /// Whether input remains that is neither ignorable nor the active descender's closer
    pub fn has_next(&self) -> bool {
        let mut head = self.head;
        while head < self.input.len() {
            match self.language.select(self.input, head, self.active.as_ref()) {
                None => return true,
                Some(selection) if selection.entry.is_ignore() => head = selection.end,
                Some(selection) => return !selection.entry.closes(self.active.as_ref()),
            }
        }
        false
    }
}

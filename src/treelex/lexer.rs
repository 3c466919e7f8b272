//! Scan and descent engine
//!
//!     The [Lexer] turns input text into a chain of cells using a [Language]. Each nesting
//!     level runs the same loop over its own [LexerState]:
//!
//!         1. Select the winning dispatch entry at the head (longest match, the active
//!            descender's closer wins length ties). No match is `UnrecognizedCharacter`.
//!         2. Advance the head past the match.
//!         3. Ignore: nothing else happens.
//!            Rule: run the action and append its cell to this level's chain.
//!            Descender open: run the open action, lex a nested level, append the folded
//!            cell it returns.
//!            Descender close: if it closes the active descender, fold this level's chain
//!            with the close action and return it to the level above; otherwise the input
//!            is unbalanced.
//!
//!     The outermost level returns its chain (a null cell if nothing was produced) once the
//!     input is exhausted. A nested level that runs out of input before its closer is
//!     unbalanced.
//!
//! Recursion
//!
//!     Nesting is plain recursion, one call per level. Pathologically deep input is bounded
//!     by the call stack unless a depth limit is set with [Lexer::with_max_depth].

use crate::treelex::cell::Cell;
use crate::treelex::descender::Descender;
use crate::treelex::error::{LexError, Result};
use crate::treelex::language::{EntryKind, Language};
use crate::treelex::state::{ActiveDescender, LexerState};
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of consuming one match
#[derive(Debug)]
pub enum Step {
    /// An ignore pattern was consumed
    Skip,
    /// A cell to append at the current level
    Cell(Cell),
    /// The active descender closed; this is the folded level
    Ascend(Cell),
}

/// Orchestrates lexing over a language
#[derive(Clone, Default)]
pub struct Lexer {
    language: Language,
    max_depth: Option<usize>,
}

impl Lexer {
    pub fn new(language: Language) -> Self {
        Lexer {
            language,
            max_depth: None,
        }
    }

    /// Fail with `DepthExceeded` instead of nesting deeper than `depth` levels
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn language_mut(&mut self) -> &mut Language {
        &mut self.language
    }

    /// Top-level state over `input`, starting at offset 0
    pub fn state<'a>(&'a self, input: &'a str) -> LexerState<'a> {
        self.state_at(input, 0)
    }

    pub fn state_at<'a>(&'a self, input: &'a str, head: usize) -> LexerState<'a> {
        LexerState::new(&self.language, input, head)
    }

    /// Tokenize the whole input
    pub fn lex(&self, input: &str) -> Result<Cell> {
        self.lex_from(input, 0)
    }

    /// Tokenize `input` starting at `head`
    pub fn lex_from(&self, input: &str, head: usize) -> Result<Cell> {
        let mut state = self.state_at(input, head);
        self.lex_state(&mut state)
    }

    /// Run the scan loop for one level until its input ends or its descender closes
    pub fn lex_state(&self, state: &mut LexerState<'_>) -> Result<Cell> {
        while !state.at_end() {
            match self.step(state)? {
                Step::Skip => {}
                Step::Cell(cell) => state.push(cell),
                Step::Ascend(cell) => return Ok(cell),
            }
        }
        match state.active_descender() {
            Some(active) => Err(LexError::UnbalancedDescender {
                position: state.head(),
                expected: Some(active.name().to_string()),
                found: None,
            }),
            None => Ok(state.take_output()),
        }
    }

    /// Next cell at this level, skipping ignores
    ///
    /// A closer of the active descender yields the folded level. With `advance == false`
    /// the state is left exactly as it was, so this works as a one-token lookahead.
    pub fn next_cell(&self, state: &mut LexerState<'_>, advance: bool) -> Result<Cell> {
        let snapshot = state.snapshot();
        let result = loop {
            match self.step(state) {
                Ok(Step::Skip) => continue,
                Ok(Step::Cell(cell)) | Ok(Step::Ascend(cell)) => break Ok(cell),
                Err(e) => break Err(e),
            }
        };
        if !advance {
            state.restore(snapshot);
        }
        result
    }

    /// Consume exactly one match at the head
    pub fn step(&self, state: &mut LexerState<'_>) -> Result<Step> {
        let start = state.head();
        if state.at_end() {
            return Err(LexError::EmptyInput { position: start });
        }
        let language = state.language;
        let input = state.input();
        if !input.is_char_boundary(start) {
            return Err(LexError::NotCharBoundary { position: start });
        }

        let selection = language
            .select(input, start, state.active_descender())
            .ok_or_else(|| unrecognized(input, start))?;
        let matched = &input[start..selection.end];
        let entry = selection.entry;
        trace!(
            owner = &*entry.owner,
            start,
            end = selection.end,
            matched,
            "selected"
        );
        state.head = selection.end;

        match &entry.kind {
            EntryKind::Ignore => Ok(Step::Skip),
            EntryKind::Rule(rule) => rule.apply(matched).map(Step::Cell),
            EntryKind::Close(descender) => self
                .close(state, &entry.owner, descender, start)
                .map(Step::Ascend),
            EntryKind::Open(descender) => {
                let closes_active = state
                    .active_descender()
                    .is_some_and(|active| active.is(descender));
                if closes_active && descender.close_pattern().matches_whole(matched) {
                    return self
                        .close(state, &entry.owner, descender, start)
                        .map(Step::Ascend);
                }
                self.open(state, &entry.owner, descender, matched, start)
                    .map(Step::Cell)
            }
        }
    }

    fn open(
        &self,
        state: &mut LexerState<'_>,
        name: &Arc<str>,
        descender: &Arc<Descender>,
        matched: &str,
        position: usize,
    ) -> Result<Cell> {
        descender.run_open(matched)?;
        let active = ActiveDescender::new(name.clone(), descender.clone());
        let mut nested = state.descend(active);
        if let Some(max) = self.max_depth {
            if nested.depth() > max {
                return Err(LexError::DepthExceeded {
                    depth: max,
                    position,
                });
            }
        }
        debug!(descender = &**name, position, depth = nested.depth(), "descend");
        let folded = self.lex_state(&mut nested)?;
        state.head = nested.head();
        Ok(folded)
    }

    fn close(
        &self,
        state: &mut LexerState<'_>,
        name: &str,
        descender: &Arc<Descender>,
        position: usize,
    ) -> Result<Cell> {
        let closes_active = state
            .active_descender()
            .is_some_and(|active| active.is(descender));
        if !closes_active {
            return Err(LexError::UnbalancedDescender {
                position,
                expected: state.active_descender().map(|a| a.name().to_string()),
                found: Some(name.to_string()),
            });
        }
        debug!(descender = name, position, depth = state.depth(), "ascend");
        let nested = state.take_output();
        descender.run_close(nested)
    }
}

impl From<Language> for Lexer {
    fn from(language: Language) -> Self {
        Lexer::new(language)
    }
}

fn unrecognized(input: &str, position: usize) -> LexError {
    let remaining = input.get(position..).unwrap_or("");
    LexError::UnrecognizedCharacter {
        position,
        character: remaining.chars().next().unwrap_or('\0'),
        remaining: remaining.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treelex::descender::Descender;
    use crate::treelex::rule::Parsed;
    use crate::treelex::types::{Type, Value};

    fn lisp() -> Lexer {
        let mut language = Language::new();
        language
            .add_rule("integer", "[0-9]+", Parsed::integer(Type::new("integer")))
            .unwrap();
        language
            .add_rule("symbol", "[a-z+*-]+", Type::new("symbol"))
            .unwrap();
        language
            .insert_descender("paren", Descender::delimited("paren", "(", ")").unwrap())
            .unwrap();
        language
            .insert_descender(
                "bracket",
                Descender::delimited("bracket", "[", "]").unwrap(),
            )
            .unwrap();
        language.add_standard_ignores().unwrap();
        Lexer::new(language)
    }

    #[test]
    fn test_flat_input() {
        let chain = lisp().lex("1 two 3").unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.car(), Value::Integer(1));
        assert_eq!(chain.nth(1).unwrap().car(), Value::from("two"));
    }

    #[test]
    fn test_nested_input() {
        let chain = lisp().lex("(1 (2 3) 4)").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.car_type().name(), "paren");

        let outer = chain.car().as_cell().unwrap().clone();
        assert_eq!(outer.len(), 3);
        let inner = outer.nth(1).unwrap();
        assert_eq!(inner.car_type().name(), "paren");
        assert_eq!(inner.car().as_cell().unwrap().len(), 2);
        assert_eq!(chain.to_string(), "(1 (2 3) 4)");
    }

    #[test]
    fn test_empty_and_blank_input() {
        let lexer = lisp();
        assert!(lexer.lex("").unwrap().is_null());
        assert!(lexer.lex("  \n ").unwrap().is_null());
    }

    #[test]
    fn test_empty_descender() {
        let chain = lisp().lex("()").unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.car().as_cell().unwrap().is_null());
        assert_eq!(chain.to_string(), "()");
    }

    #[test]
    fn test_unclosed_descender() {
        let err = lisp().lex("(1 (2 3) 4").unwrap_err();
        assert_eq!(
            err,
            LexError::UnbalancedDescender {
                position: 10,
                expected: Some("paren".to_string()),
                found: None,
            }
        );
    }

    #[test]
    fn test_mismatched_closer() {
        let err = lisp().lex("(1]").unwrap_err();
        assert_eq!(
            err,
            LexError::UnbalancedDescender {
                position: 2,
                expected: Some("paren".to_string()),
                found: Some("bracket".to_string()),
            }
        );
    }

    #[test]
    fn test_closer_without_opener() {
        let err = lisp().lex("1 )").unwrap_err();
        assert!(matches!(
            err,
            LexError::UnbalancedDescender { position: 2, expected: None, .. }
        ));
    }

    #[test]
    fn test_unrecognized_character() {
        let err = lisp().lex("1 $ 2").unwrap_err();
        assert_eq!(
            err,
            LexError::UnrecognizedCharacter {
                position: 2,
                character: '$',
                remaining: "$ 2".to_string(),
            }
        );
    }

    #[test]
    fn test_action_error_propagates() {
        let err = lisp().lex("99999999999999999999").unwrap_err();
        assert!(matches!(err, LexError::Action { .. }));
    }

    #[test]
    fn test_lex_from_resumes() {
        let lexer = lisp();
        let chain = lexer.lex_from("skip (1 2)", 5).unwrap();
        assert_eq!(chain.to_string(), "(1 2)");
    }

    #[test]
    fn test_lex_from_inside_a_character() {
        let lexer = lisp();
        assert_eq!(
            lexer.lex_from("é1", 1).unwrap_err(),
            LexError::NotCharBoundary { position: 1 }
        );
        assert_eq!(lexer.lex_from("é1", 2).unwrap().to_string(), "1");
    }

    #[test]
    fn test_peek_does_not_advance() {
        let lexer = lisp();
        let mut state = lexer.state("  7 8");
        let peeked = lexer.next_cell(&mut state, false).unwrap();
        assert_eq!(peeked.car(), Value::Integer(7));
        assert_eq!(state.head(), 0);

        let taken = lexer.next_cell(&mut state, true).unwrap();
        assert_eq!(taken.car(), Value::Integer(7));
        assert_eq!(state.head(), 3);
        assert_eq!(
            lexer.next_cell(&mut state, true).unwrap().car(),
            Value::Integer(8)
        );
        assert_eq!(
            lexer.next_cell(&mut state, true).unwrap_err(),
            LexError::EmptyInput { position: 5 }
        );
    }

    #[test]
    fn test_peek_descender() {
        let lexer = lisp();
        let mut state = lexer.state("(1 2) 3");
        let peeked = lexer.next_cell(&mut state, false).unwrap();
        assert_eq!(peeked.to_string(), "(1 2)");
        assert_eq!(state.head(), 0);
    }

    #[test]
    fn test_self_delimited_descender() {
        let mut language = Language::new();
        language.add_rule("word", "[a-z]+", Type::new("word")).unwrap();
        language
            .insert_descender("quote", Descender::delimited("quote", "'", "'").unwrap())
            .unwrap();
        language.add_standard_ignores().unwrap();
        let lexer = Lexer::new(language);

        let chain = lexer.lex("a 'b c' d").unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.to_string(), "a 'b c' d");
        assert_eq!(chain.nth(1).unwrap().car().as_cell().unwrap().len(), 2);

        assert!(matches!(
            lexer.lex("'open").unwrap_err(),
            LexError::UnbalancedDescender { found: None, .. }
        ));
    }

    #[test]
    fn test_close_wins_length_tie() {
        // `end` is both a word and the closer of `begin:`, and the word rule came first.
        let mut language = Language::new();
        language.add_rule("word", "[a-z]+", Type::new("word")).unwrap();
        language
            .add_descender("block", "begin:", "end", Type::descender("block", "{", "}"))
            .unwrap();
        language.add_standard_ignores().unwrap();
        let lexer = Lexer::new(language);

        let chain = lexer.lex("a begin: b end c").unwrap();
        assert_eq!(chain.to_string(), "a {b} c");

        // Outside of a block the earlier registered word rule wins.
        let flat = lexer.lex("end").unwrap();
        assert_eq!(flat.car_type().name(), "word");
    }

    #[test]
    fn test_max_depth() {
        let lexer = lisp().with_max_depth(2);
        assert!(lexer.lex("((1))").is_ok());
        assert_eq!(
            lexer.lex("(((1)))").unwrap_err(),
            LexError::DepthExceeded {
                depth: 2,
                position: 2
            }
        );
    }

    #[test]
    fn test_open_action_runs() {
        let mut language = Language::new();
        language.add_rule("integer", "[0-9]+", Type::new("integer")).unwrap();
        let guarded = Descender::delimited("paren", "(", ")")
            .unwrap()
            .with_open_action(|m: &str| -> Result<()> {
                Err(LexError::action("paren", format!("'{}' not allowed", m)))
            });
        language.insert_descender("paren", guarded).unwrap();
        let err = Lexer::new(language).lex("(1)").unwrap_err();
        assert!(matches!(err, LexError::Action { .. }));
    }
}

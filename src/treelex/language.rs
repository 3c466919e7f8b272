//! Language registry
//!
//!     A [Language] holds everything one lexer knows how to recognize: named rules, named
//!     descenders and named ignore patterns. Alongside the name maps it keeps the dispatch
//!     table the engine actually scans, one entry per distinct pattern, in registration
//!     order, plus a pattern-to-owner map used for collision diagnostics.
//!
//! Collisions
//!
//!     A pattern source may be owned by at most one entry. Registering a rule, descender or
//!     ignore whose pattern is already owned fails with `PatternCollision` and leaves the
//!     registry untouched. The only exception is a descender whose open and close patterns
//!     are identical (a quote, say); it owns that pattern once and a single dispatch entry
//!     serves as both its opener and its closer.
//!
//! Selection
//!
//!     At a given head every entry is tried as an anchored match. The longest match wins. On
//!     a length tie, an entry that closes the active descender beats any other entry; among
//!     remaining ties the earliest registered entry wins.
//!
//! Mutation requires `&mut Language`, so a language cannot change while a lexer is
//! borrowing it for a scan.

use crate::treelex::descender::{CloseAction, Descender};
use crate::treelex::error::{LexError, Result};
use crate::treelex::ignores;
use crate::treelex::pattern::Pattern;
use crate::treelex::rule::{Action, Rule};
use crate::treelex::state::ActiveDescender;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// What a dispatch entry does when selected
#[derive(Debug, Clone)]
pub(crate) enum EntryKind {
    Rule(Arc<Rule>),
    Open(Arc<Descender>),
    Close(Arc<Descender>),
    Ignore,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) pattern: Pattern,
    pub(crate) owner: Arc<str>,
    pub(crate) kind: EntryKind,
}

impl Entry {
    /// Whether selecting this entry would close `active`
    pub(crate) fn closes(&self, active: Option<&ActiveDescender>) -> bool {
        let Some(active) = active else {
            return false;
        };
        match &self.kind {
            EntryKind::Close(d) => active.is(d),
            EntryKind::Open(d) => d.is_self_delimited() && active.is(d),
            _ => false,
        }
    }

    pub(crate) fn is_ignore(&self) -> bool {
        matches!(self.kind, EntryKind::Ignore)
    }
}

/// The winning entry at a head position
pub(crate) struct Selection<'l> {
    pub(crate) entry: &'l Entry,
    pub(crate) end: usize,
}

/// Registry of rules, descenders and ignore patterns
#[derive(Debug, Clone, Default)]
pub struct Language {
    rules: HashMap<String, Arc<Rule>>,
    descenders: HashMap<String, Arc<Descender>>,
    ignores: HashMap<String, Pattern>,
    owners: HashMap<String, String>,
    dispatch: Vec<Entry>,
}

impl Language {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule from a regex source and an action
    pub fn add_rule(
        &mut self,
        name: &str,
        pattern: &str,
        action: impl Action + 'static,
    ) -> Result<()> {
        self.insert_rule(name, Rule::from_pattern(pattern, action)?)
    }

    /// Register a prebuilt rule
    pub fn insert_rule(&mut self, name: &str, rule: Rule) -> Result<()> {
        if self.rules.contains_key(name) {
            return Err(LexError::DuplicateName {
                kind: "rule",
                name: name.to_string(),
            });
        }
        self.check_free(rule.pattern(), name)?;

        let rule = Arc::new(rule);
        let owner: Arc<str> = Arc::from(name);
        self.claim(rule.pattern(), format!("rule '{}'", name));
        self.dispatch.push(Entry {
            pattern: rule.pattern().clone(),
            owner,
            kind: EntryKind::Rule(rule.clone()),
        });
        debug!(rule = name, pattern = rule.pattern().as_str(), "registered rule");
        self.rules.insert(name.to_string(), rule);
        Ok(())
    }

    /// Register a descender from regex sources and a close action
    pub fn add_descender(
        &mut self,
        name: &str,
        open: &str,
        close: &str,
        close_action: impl CloseAction + 'static,
    ) -> Result<()> {
        self.insert_descender(name, Descender::from_patterns(open, close, close_action)?)
    }

    /// Register a prebuilt descender
    pub fn insert_descender(&mut self, name: &str, descender: Descender) -> Result<()> {
        if self.descenders.contains_key(name) {
            return Err(LexError::DuplicateName {
                kind: "descender",
                name: name.to_string(),
            });
        }
        self.check_free(descender.open_pattern(), name)?;
        self.check_free(descender.close_pattern(), name)?;

        let descender = Arc::new(descender);
        let owner: Arc<str> = Arc::from(name);
        if descender.is_self_delimited() {
            self.claim(
                descender.open_pattern(),
                format!("descender '{}' (open/close)", name),
            );
        } else {
            self.claim(
                descender.open_pattern(),
                format!("descender '{}' (open)", name),
            );
            self.claim(
                descender.close_pattern(),
                format!("descender '{}' (close)", name),
            );
        }

        self.dispatch.push(Entry {
            pattern: descender.open_pattern().clone(),
            owner: owner.clone(),
            kind: EntryKind::Open(descender.clone()),
        });
        if !descender.is_self_delimited() {
            self.dispatch.push(Entry {
                pattern: descender.close_pattern().clone(),
                owner,
                kind: EntryKind::Close(descender.clone()),
            });
        }
        debug!(
            descender = name,
            open = descender.open_pattern().as_str(),
            close = descender.close_pattern().as_str(),
            "registered descender"
        );
        self.descenders.insert(name.to_string(), descender);
        Ok(())
    }

    /// Register a pattern whose matches are consumed without output
    pub fn add_ignore(&mut self, name: &str, pattern: &str) -> Result<()> {
        self.insert_ignore(name, Pattern::new(pattern)?)
    }

    pub fn insert_ignore(&mut self, name: &str, pattern: Pattern) -> Result<()> {
        if self.ignores.contains_key(name) {
            return Err(LexError::DuplicateName {
                kind: "ignore",
                name: name.to_string(),
            });
        }
        self.check_free(&pattern, name)?;

        self.claim(&pattern, format!("ignore '{}'", name));
        self.dispatch.push(Entry {
            pattern: pattern.clone(),
            owner: Arc::from(name),
            kind: EntryKind::Ignore,
        });
        debug!(ignore = name, pattern = pattern.as_str(), "registered ignore");
        self.ignores.insert(name.to_string(), pattern);
        Ok(())
    }

    /// Ignore runs of spaces/tabs and newlines
    pub fn add_standard_ignores(&mut self) -> Result<()> {
        self.add_ignore("whitespace", ignores::WHITESPACE)?;
        self.add_ignore("newlines", ignores::NEWLINES)
    }

    pub fn remove_rule(&mut self, name: &str) -> Result<Rule> {
        let rule = self.rules.remove(name).ok_or_else(|| LexError::UnknownName {
            kind: "rule",
            name: name.to_string(),
        })?;
        self.release(rule.pattern());
        self.dispatch
            .retain(|entry| !matches!(&entry.kind, EntryKind::Rule(r) if Arc::ptr_eq(r, &rule)));
        debug!(rule = name, "removed rule");
        Ok(Arc::unwrap_or_clone(rule))
    }

    pub fn remove_descender(&mut self, name: &str) -> Result<Descender> {
        let descender = self
            .descenders
            .remove(name)
            .ok_or_else(|| LexError::UnknownName {
                kind: "descender",
                name: name.to_string(),
            })?;
        self.release(descender.open_pattern());
        self.release(descender.close_pattern());
        self.dispatch.retain(|entry| match &entry.kind {
            EntryKind::Open(d) | EntryKind::Close(d) => !Arc::ptr_eq(d, &descender),
            _ => true,
        });
        debug!(descender = name, "removed descender");
        Ok(Arc::unwrap_or_clone(descender))
    }

    pub fn remove_ignore(&mut self, name: &str) -> Result<Pattern> {
        let pattern = self
            .ignores
            .remove(name)
            .ok_or_else(|| LexError::UnknownName {
                kind: "ignore",
                name: name.to_string(),
            })?;
        self.release(&pattern);
        self.dispatch
            .retain(|entry| !(entry.is_ignore() && entry.pattern == pattern));
        debug!(ignore = name, "removed ignore");
        Ok(pattern)
    }

    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name).map(|r| r.as_ref())
    }

    pub fn get_descender(&self, name: &str) -> Option<&Descender> {
        self.descenders.get(name).map(|d| d.as_ref())
    }

    #[cfg(test)]
    pub(crate) fn descender_handle(&self, name: &str) -> Option<Arc<Descender>> {
        self.descenders.get(name).cloned()
    }

    pub fn get_ignore(&self, name: &str) -> Option<&Pattern> {
        self.ignores.get(name)
    }

    /// Description of whatever owns `pattern`, if anything
    pub fn owner_of(&self, pattern: &str) -> Option<&str> {
        self.owners.get(pattern).map(|s| s.as_str())
    }

    /// Names of all registered rules, sorted
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.rules.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Names of all registered descenders, sorted
    pub fn descender_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.descenders.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Names of all registered ignores, sorted
    pub fn ignore_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.ignores.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.dispatch.is_empty()
    }

    /// Pick the entry that wins at `head`
    pub(crate) fn select(
        &self,
        input: &str,
        head: usize,
        active: Option<&ActiveDescender>,
    ) -> Option<Selection<'_>> {
        let mut best: Option<Selection<'_>> = None;
        for entry in &self.dispatch {
            let Some(end) = entry.pattern.match_at(input, head) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    end > current.end
                        || (end == current.end
                            && entry.closes(active)
                            && !current.entry.closes(active))
                }
            };
            if better {
                best = Some(Selection { entry, end });
            }
        }
        best
    }

    fn check_free(&self, pattern: &Pattern, name: &str) -> Result<()> {
        match self.owners.get(pattern.as_str()) {
            Some(owner) => Err(LexError::PatternCollision {
                pattern: pattern.as_str().to_string(),
                owner: owner.clone(),
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn claim(&mut self, pattern: &Pattern, owner: String) {
        self.owners.insert(pattern.as_str().to_string(), owner);
    }

    fn release(&mut self, pattern: &Pattern) {
        self.owners.remove(pattern.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treelex::types::Type;

    fn arithmetic() -> Language {
        let mut language = Language::new();
        language
            .add_rule("integer", "[0-9]+", Type::new("integer"))
            .unwrap();
        language.add_rule("plus", "\\+", Type::new("plus")).unwrap();
        language
            .insert_descender("paren", Descender::delimited("paren", "(", ")").unwrap())
            .unwrap();
        language.add_standard_ignores().unwrap();
        language
    }

    #[test]
    fn test_registration_and_lookup() {
        let language = arithmetic();
        assert!(language.get_rule("integer").is_some());
        assert!(language.get_descender("paren").is_some());
        assert!(language.get_ignore("whitespace").is_some());
        assert_eq!(language.rule_names(), vec!["integer", "plus"]);
        assert_eq!(language.owner_of("\\("), Some("descender 'paren' (open)"));
    }

    #[test]
    fn test_rule_collision_leaves_registry_untouched() {
        let mut language = arithmetic();
        let before = language.dispatch.len();
        let err = language
            .add_rule("digits", "[0-9]+", Type::new("digits"))
            .unwrap_err();

        assert_eq!(
            err,
            LexError::PatternCollision {
                pattern: "[0-9]+".to_string(),
                owner: "rule 'integer'".to_string(),
                name: "digits".to_string(),
            }
        );
        assert!(language.get_rule("digits").is_none());
        assert_eq!(language.dispatch.len(), before);
    }

    #[test]
    fn test_descender_collides_with_rule() {
        let mut language = arithmetic();
        let err = language
            .add_descender("group", "\\+", "-", Type::new("group"))
            .unwrap_err();
        assert!(matches!(err, LexError::PatternCollision { .. }));
        assert!(language.get_descender("group").is_none());
        assert_eq!(language.owner_of("-"), None);
    }

    #[test]
    fn test_ignore_collision() {
        let mut language = arithmetic();
        let err = language
            .add_ignore("spaces", ignores::WHITESPACE)
            .unwrap_err();
        assert!(matches!(err, LexError::PatternCollision { .. }));
    }

    #[test]
    fn test_duplicate_name() {
        let mut language = arithmetic();
        let err = language
            .add_rule("plus", "plus", Type::new("plus"))
            .unwrap_err();
        assert_eq!(
            err,
            LexError::DuplicateName {
                kind: "rule",
                name: "plus".to_string()
            }
        );
    }

    #[test]
    fn test_self_delimited_descender_owns_one_entry() {
        let mut language = Language::new();
        language
            .insert_descender("quote", Descender::delimited("quote", "'", "'").unwrap())
            .unwrap();
        assert_eq!(language.dispatch.len(), 1);
        assert_eq!(language.owner_of("'"), Some("descender 'quote' (open/close)"));
    }

    #[test]
    fn test_removal_is_symmetric() {
        let mut language = arithmetic();
        let rule = language.remove_rule("plus").unwrap();
        assert_eq!(rule.pattern().as_str(), "\\+");
        assert!(language.get_rule("plus").is_none());
        assert_eq!(language.owner_of("\\+"), None);

        language.remove_descender("paren").unwrap();
        assert_eq!(language.owner_of("\\("), None);
        assert_eq!(language.owner_of("\\)"), None);

        language.remove_ignore("whitespace").unwrap();
        language.remove_ignore("newlines").unwrap();
        assert_eq!(language.dispatch.len(), 1);

        // Patterns are free again after removal.
        language.add_rule("plus", "\\+", Type::new("plus")).unwrap();
    }

    #[test]
    fn test_remove_unknown() {
        let mut language = Language::new();
        assert_eq!(
            language.remove_rule("nope").unwrap_err(),
            LexError::UnknownName {
                kind: "rule",
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_select_longest_match() {
        let mut language = Language::new();
        language.add_rule("integer", "[0-9]+", Type::new("integer")).unwrap();
        language
            .add_rule("decimal", "[0-9]+\\.[0-9]+", Type::new("decimal"))
            .unwrap();
        let selection = language.select("10.0", 0, None).unwrap();
        assert_eq!(selection.end, 4);
        assert_eq!(&*selection.entry.owner, "decimal");
    }

    #[test]
    fn test_select_tie_prefers_earliest() {
        let mut language = Language::new();
        language.add_rule("word", "[a-z]+", Type::new("word")).unwrap();
        language.add_rule("keyword", "let", Type::new("keyword")).unwrap();
        let selection = language.select("let", 0, None).unwrap();
        assert_eq!(&*selection.entry.owner, "word");
    }

    #[test]
    fn test_select_nothing() {
        let language = arithmetic();
        assert!(language.select("$", 0, None).is_none());
        assert!(language.select("1", 1, None).is_none());
    }
}

//! # treelex
//!
//! A tokenizer framework that turns text into a tree of typed cells, driven by
//! user-registered regex rules and nestable open/close delimiters.
//!
//! Everything lives under the [treelex] module; see its documentation for an overview.
//! The `treelex` binary wraps the library for lexing files against a language definition.

pub mod treelex;

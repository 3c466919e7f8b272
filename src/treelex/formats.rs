//! Output formats for token trees
//!
//! - `treeviz`: one line per cell, nested chains drawn as an indented tree
//! - `json`: `{"type": .., "value": ..}` objects, nested chains as arrays
//! - `sexp`: parenthesised `(type value)` lists

pub mod json;
pub mod registry;
pub mod sexp;
pub mod treeviz;

pub use json::{to_json_str, to_json_value, JsonFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use sexp::{to_sexp_str, SexpFormatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};

//! Common ignore patterns
//!
//! Regex sources for the things most languages throw away between tokens. Register them
//! with [Language::add_ignore](crate::treelex::Language::add_ignore), or look one up by name
//! with [standard].

/// Runs of spaces and tabs
pub const WHITESPACE: &str = r"[ \t]+";

/// One or more line breaks, with or without carriage returns
pub const NEWLINES: &str = r"(?:\r?\n)+";

/// `// ...` up to the end of the line
pub const LINE_COMMENTS: &str = r"//[^\n]*";

/// `/* ... */`, possibly spanning lines, not nested
pub const BLOCK_COMMENTS: &str = r"/\*(?s:.*?)\*/";

/// `# ...` up to the end of the line
pub const HASH_COMMENTS: &str = r"#[^\n]*";

/// Names accepted by [standard], in a stable order
pub const STANDARD_NAMES: [&str; 5] = [
    "whitespace",
    "newlines",
    "line-comments",
    "block-comments",
    "hash-comments",
];

/// Look up a stock ignore pattern by name
pub fn standard(name: &str) -> Option<&'static str> {
    match name {
        "whitespace" => Some(WHITESPACE),
        "newlines" => Some(NEWLINES),
        "line-comments" => Some(LINE_COMMENTS),
        "block-comments" => Some(BLOCK_COMMENTS),
        "hash-comments" => Some(HASH_COMMENTS),
        _ => None,
    }
}

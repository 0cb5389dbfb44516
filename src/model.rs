use indexmap::IndexMap;

/// One logical `NAME=value` declaration, possibly spanning several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub text: String,
    /// 1-based physical line the entry starts on.
    pub line: u32,
}

/// A name and its unresolved value as read from one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVariable {
    pub name: String,
    /// `None` when the entry had no `=`.
    pub value: Option<String>,
    /// Byte offsets in `value` of `$` characters written as `\$`.
    pub(crate) literal_dollars: Vec<usize>,
}

impl ParsedVariable {
    /// Variable with no escaped `$` markers.
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            literal_dollars: Vec::new(),
        }
    }
}

/// Every name processed by one load pass mapped to its final value, in file order.
pub type LoadedVariables = IndexMap<String, Option<String>>;

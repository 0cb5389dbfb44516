//! Compiled patterns shared by the parser and the resolver.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[A-Za-z_][A-Za-z0-9_.]*\z").expect("name pattern compiles"));

static NESTED_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_.]+)\}").expect("nested reference pattern compiles")
});

/// Return `subject` back when it is a valid variable name.
pub(crate) fn valid_name(subject: &str) -> Option<&str> {
    NAME.is_match(subject).then_some(subject)
}

/// Replace every `${name}` reference in `subject`.
///
/// `replace` receives the reference's byte offset and name and returns the
/// replacement text. The output is never scanned again.
pub(crate) fn replace_nested_references<F>(subject: &str, mut replace: F) -> String
where
    F: FnMut(usize, &str) -> String,
{
    NESTED_REFERENCE
        .replace_all(subject, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or(0, |m| m.start());
            let name = caps.get(1).map_or("", |m| m.as_str());
            replace(whole, name)
        })
        .into_owned()
}

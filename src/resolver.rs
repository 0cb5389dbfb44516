use crate::model::ParsedVariable;
use crate::pattern;

/// Substitute every `${NAME}` reference in `value`.
///
/// `lookup` supplies the replacement for each name; names it does not know
/// become the empty string. Substituted text is not scanned again, and a `${`
/// without a closing brace is kept as written.
pub fn resolve<F>(value: Option<&str>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    value.map(|value| {
        pattern::replace_nested_references(value, |_, name| lookup(name).unwrap_or_default())
    })
}

/// Like [`resolve`], but references written as `\${NAME}` are kept verbatim.
pub fn resolve_variable<F>(variable: &ParsedVariable, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = variable.value.as_deref()?;
    if variable.literal_dollars.is_empty() {
        return resolve(Some(value), lookup);
    }

    Some(pattern::replace_nested_references(value, |offset, name| {
        if variable.literal_dollars.contains(&offset) {
            format!("${{{name}}}")
        } else {
            lookup(name).unwrap_or_default()
        }
    }))
}

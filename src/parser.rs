use crate::error::{ParseError, ParseErrorKind};
use crate::lines::Entries;
use crate::model::ParsedVariable;
use crate::pattern;

/// Parse every entry in `content` without resolving nested variables.
pub fn parse_str(content: &str) -> Result<Vec<ParsedVariable>, ParseError> {
    Entries::new(content)
        .map(|entry| {
            let entry = entry?;
            parse_entry(&entry.text).map_err(|err| err.at_line(entry.line))
        })
        .collect()
}

/// Parse one logical entry into its name and unresolved value.
pub fn parse_entry(entry: &str) -> Result<ParsedVariable, ParseError> {
    let (raw_name, raw_value) = split_parts(entry);
    let name = parse_name(raw_name, entry)?;

    let Some(raw_value) = raw_value else {
        return Ok(ParsedVariable::new(name, None));
    };

    let (value, literal_dollars) = parse_value(raw_value, entry)?;
    Ok(ParsedVariable {
        name,
        value: Some(value),
        literal_dollars,
    })
}

/// Split at the first `=` outside quotes. A `#` reached first starts a comment
/// and leaves the entry without a value.
pub(crate) fn split_parts(entry: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    let mut chars = entry.char_indices();

    while let Some((idx, ch)) = chars.next() {
        match (quote, ch) {
            (_, '\\') => {
                chars.next();
            }
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '#') => return (&entry[..idx], None),
            (None, '=') => return (&entry[..idx], Some(&entry[idx + 1..])),
            (None, _) => {}
        }
    }

    (entry, None)
}

fn parse_name(raw: &str, entry: &str) -> Result<String, ParseError> {
    let mut name = raw.trim();
    if let Some(rest) = name.strip_prefix("export")
        && rest.starts_with(char::is_whitespace)
    {
        name = rest.trim_start();
    }

    pattern::valid_name(strip_matching_quotes(name))
        .map(str::to_owned)
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidName, entry))
}

fn strip_matching_quotes(name: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = name
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    name
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Initial,
    Unquoted,
    Quoted(char),
    Escape(Resume),
    Whitespace,
    Comment,
}

/// State to return to once an escaped character has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Unquoted,
    Quoted(char),
}

impl Resume {
    fn state(self) -> ParserState {
        match self {
            Self::Unquoted => ParserState::Unquoted,
            Self::Quoted(quote) => ParserState::Quoted(quote),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Nothing,
    Char(char),
    Escaped(char),
}

fn transition(state: ParserState, ch: char) -> (ParserState, Emit) {
    use ParserState::*;

    match state {
        Initial => match ch {
            _ if ch.is_whitespace() => (Initial, Emit::Nothing),
            '"' | '\'' => (Quoted(ch), Emit::Nothing),
            '#' => (Comment, Emit::Nothing),
            '\\' => (Escape(Resume::Unquoted), Emit::Nothing),
            _ => (Unquoted, Emit::Char(ch)),
        },
        Unquoted => match ch {
            _ if ch.is_whitespace() => (Whitespace, Emit::Nothing),
            '#' => (Comment, Emit::Nothing),
            '\\' => (Escape(Resume::Unquoted), Emit::Nothing),
            _ => (Unquoted, Emit::Char(ch)),
        },
        Quoted(quote) => match ch {
            _ if ch == quote => (Whitespace, Emit::Nothing),
            '\\' => (Escape(Resume::Quoted(quote)), Emit::Nothing),
            _ => (Quoted(quote), Emit::Char(ch)),
        },
        Escape(resume) => (resume.state(), Emit::Escaped(unescape(ch))),
        Whitespace | Comment => (state, Emit::Nothing),
    }
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'f' => '\u{0c}',
        'v' => '\u{0b}',
        _ => ch,
    }
}

fn parse_value(raw: &str, entry: &str) -> Result<(String, Vec<usize>), ParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut literal_dollars = Vec::new();
    let mut state = ParserState::Initial;

    for ch in raw.chars() {
        let (next, emit) = transition(state, ch);
        match emit {
            Emit::Nothing => {}
            Emit::Char(ch) => out.push(ch),
            Emit::Escaped(ch) => {
                if ch == '$' {
                    literal_dollars.push(out.len());
                }
                out.push(ch);
            }
        }
        state = next;
    }

    match state {
        ParserState::Quoted(_) | ParserState::Escape(Resume::Quoted(_)) => Err(ParseError::new(
            ParseErrorKind::MissingClosingQuote,
            entry,
        )),
        ParserState::Escape(Resume::Unquoted) => {
            out.push('\\');
            Ok((out, literal_dollars))
        }
        _ => Ok((out, literal_dollars)),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn parse(entry: &str) -> (String, Option<String>) {
        let parsed = parse_entry(entry).expect("parse should succeed");
        (parsed.name, parsed.value)
    }

    fn value(entry: &str) -> String {
        parse(entry).1.expect("entry should have a value")
    }

    fn err_kind(entry: &str) -> ParseErrorKind {
        parse_entry(entry).expect_err("expected parse error").kind
    }

    #[test]
    fn parses_plain_assignment() {
        assert_eq!(parse("KEY=value"), ("KEY".to_owned(), Some("value".to_owned())));
        assert_eq!(parse("  KEY  =   value  "), ("KEY".to_owned(), Some("value".to_owned())));
    }

    #[test]
    fn bare_name_has_no_value() {
        assert_eq!(parse("KEY"), ("KEY".to_owned(), None));
        assert_eq!(parse("export KEY"), ("KEY".to_owned(), None));
        assert_eq!(parse("KEY # trailing comment"), ("KEY".to_owned(), None));
    }

    #[test]
    fn empty_value_is_empty_string() {
        assert_eq!(value("KEY="), "");
        assert_eq!(value("KEY=   "), "");
        assert_eq!(value("KEY=\"\""), "");
        assert_eq!(value("KEY= # only a comment"), "");
    }

    #[test]
    fn strips_export_prefix_and_spacing() {
        assert_eq!(parse("export KEY = value"), ("KEY".to_owned(), Some("value".to_owned())));
        assert_eq!(parse("export\tKEY=value").0, "KEY");
        assert_eq!(parse("exportKEY=value").0, "exportKEY");
    }

    #[test]
    fn strips_one_layer_of_name_quotes() {
        assert_eq!(parse("\"KEY\"=value").0, "KEY");
        assert_eq!(parse("'KEY'=value").0, "KEY");
        assert_eq!(err_kind("\"KEY'=value"), ParseErrorKind::InvalidName);
    }

    #[test]
    fn validates_names() {
        assert_eq!(err_kind("1KEY=x"), ParseErrorKind::InvalidName);
        assert_eq!(err_kind("KEY-A=x"), ParseErrorKind::InvalidName);
        assert_eq!(err_kind("BAD KEY=x"), ParseErrorKind::InvalidName);
        assert_eq!(err_kind("=x"), ParseErrorKind::InvalidName);
        assert_eq!(parse("_KEY=x").0, "_KEY");
        assert_eq!(parse("KEY.SUB=x").0, "KEY.SUB");
    }

    #[test]
    fn invalid_name_error_carries_entry() {
        let err = parse_entry("KEY-A=x").expect_err("expected parse error");
        assert_eq!(err.entry, "KEY-A=x");
        assert_eq!(err.line, None);
    }

    #[test]
    fn unquoted_value_stops_at_whitespace_or_comment() {
        assert_eq!(value("KEY=hello world"), "hello");
        assert_eq!(value("KEY=hello # comment"), "hello");
        assert_eq!(value("KEY=hello#comment"), "hello");
        assert_eq!(value("KEY=a=b"), "a=b");
        assert_eq!(value("KEY=say\"hi"), "say\"hi");
    }

    #[test]
    fn quoted_value_keeps_hash_and_spaces() {
        assert_eq!(value("KEY=\"a # b\""), "a # b");
        assert_eq!(value("KEY='  padded  '"), "  padded  ");
        assert_eq!(value("KEY=\"value\" # comment"), "value");
        assert_eq!(value("KEY=\"value\" trailing"), "value");
    }

    #[test]
    fn equals_inside_quoted_name_does_not_split() {
        assert_eq!(err_kind("\"A=B\"=x"), ParseErrorKind::InvalidName);
    }

    #[test]
    fn keeps_embedded_newlines_in_quotes() {
        assert_eq!(value("KEY=\"a\nb\""), "a\nb");
    }

    #[test]
    fn processes_escape_sequences() {
        assert_eq!(value(r#"KEY="say \"hi\"""#), "say \"hi\"");
        assert_eq!(value(r#"KEY="C:\\temp""#), "C:\\temp");
        assert_eq!(value(r#"KEY="a\nb\tc\rd""#), "a\nb\tc\rd");
        assert_eq!(value(r#"KEY="form\ffeed\vtab""#), "form\u{0c}feed\u{0b}tab");
        assert_eq!(value(r#"KEY='it\'s'"#), "it's");
        assert_eq!(value(r"KEY=one\ two"), "one two");
        assert_eq!(value(r"KEY=\#not-a-comment"), "#not-a-comment");
    }

    #[test]
    fn records_escaped_dollar_offsets() {
        let parsed = parse_entry(r#"KEY="a\${B}$C""#).expect("parse should succeed");
        assert_eq!(parsed.value.as_deref(), Some("a${B}$C"));
        assert_eq!(parsed.literal_dollars, vec![1]);
    }

    #[test]
    fn dangling_backslash_in_unquoted_value_is_literal() {
        assert_eq!(value(r"KEY=trailing\"), "trailing\\");
    }

    #[test]
    fn reports_missing_closing_quote() {
        assert_eq!(err_kind("KEY=\"abc"), ParseErrorKind::MissingClosingQuote);
        assert_eq!(err_kind("KEY='abc"), ParseErrorKind::MissingClosingQuote);
        assert_eq!(err_kind(r#"KEY="abc\""#), ParseErrorKind::MissingClosingQuote);
        assert_eq!(err_kind(r#"KEY="abc\"#), ParseErrorKind::MissingClosingQuote);
    }

    #[test]
    fn transition_table_covers_comment_and_whitespace_as_terminal() {
        for state in [ParserState::Whitespace, ParserState::Comment] {
            for ch in ['a', '"', '\\', '#', ' '] {
                assert_eq!(transition(state, ch), (state, Emit::Nothing));
            }
        }
    }

    #[test]
    fn escape_resumes_previous_state() {
        assert_eq!(
            transition(ParserState::Escape(Resume::Quoted('"')), 'n'),
            (ParserState::Quoted('"'), Emit::Escaped('\n'))
        );
        assert_eq!(
            transition(ParserState::Escape(Resume::Unquoted), '$'),
            (ParserState::Unquoted, Emit::Escaped('$'))
        );
    }

    #[test]
    fn parse_str_reports_line_of_failing_entry() {
        let err = parse_str("A=1\n\n# c\nB-1=2\n").expect_err("expected parse error");
        assert_eq!(err.kind, ParseErrorKind::InvalidName);
        assert_eq!(err.line, Some(4));
    }

    #[test]
    fn parse_str_handles_multiline_and_unicode() {
        let parsed = parse_str("GREETING=こんにちは\nMULTI=\"line 1\nline 2\" # trailing\nAFTER=after\n")
            .expect("parse should succeed");

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].value.as_deref(), Some("こんにちは"));
        assert_eq!(parsed[1].value.as_deref(), Some("line 1\nline 2"));
        assert_eq!(parsed[2].name, "AFTER");
    }

    proptest! {
        #[test]
        fn plain_assignment_parses_verbatim(
            name in "[A-Za-z_][A-Za-z0-9_.]{0,16}",
            value in "[A-Za-z0-9_./:@=,+-]{0,24}",
            left in "[ \t]{0,3}",
            right in "[ \t]{0,3}",
        ) {
            let parsed = parse_entry(&format!("{left}{name}{right}={right}{value}{left}"))
                .expect("plain assignment should parse");
            prop_assert_eq!(parsed.name, name);
            prop_assert_eq!(parsed.value, Some(value));
        }
    }
}

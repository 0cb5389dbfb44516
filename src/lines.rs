//! Splitting raw content into logical entries.

use std::str::Lines;

use crate::error::{ParseError, ParseErrorKind};
use crate::model::Entry;
use crate::parser::split_parts;

/// Lazy iterator over the logical entries of some dotenv content.
///
/// Blank lines and `#` comment lines are skipped. A value opening a double
/// quote that is not closed on the same line continues over the following
/// physical lines, joined with `\n`, until a line holding the closing quote.
/// Cloning the iterator restarts from its current position.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    lines: Lines<'a>,
    line: u32,
    failed: bool,
}

impl<'a> Entries<'a> {
    /// Iterate over the entries of `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines(),
            line: 0,
            failed: false,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line += 1;
        Some(line)
    }
}

impl Iterator for Entries<'_> {
    type Item = Result<Entry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let first = loop {
            let line = self.next_line()?;
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                break line;
            }
        };
        let start = self.line;

        if !opens_multiline(first) {
            return Some(Ok(Entry {
                text: first.to_owned(),
                line: start,
            }));
        }

        let mut text = first.to_owned();
        loop {
            let Some(line) = self.next_line() else {
                self.failed = true;
                return Some(Err(ParseError::new(
                    ParseErrorKind::MissingClosingQuote,
                    text,
                )
                .at_line(start)));
            };

            text.push('\n');
            text.push_str(line);
            if find_unescaped_quote(line).is_some() {
                return Some(Ok(Entry { text, line: start }));
            }
        }
    }
}

fn opens_multiline(line: &str) -> bool {
    let (_, Some(value)) = split_parts(line) else {
        return false;
    };
    let Some(quoted) = value.trim_start().strip_prefix('"') else {
        return false;
    };
    find_unescaped_quote(quoted).is_none()
}

fn find_unescaped_quote(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '"' => return Some(idx),
            _ => {}
        }
    }
    None
}

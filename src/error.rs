use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read any of the environment file(s) at [{}]", display_paths(.paths))]
    InvalidPath { paths: Vec<PathBuf> },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Whether this is a path error, as opposed to a content or validation error.
    pub fn is_path_error(&self) -> bool {
        matches!(self, Self::InvalidPath { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A malformed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The entry text the failure was detected in.
    pub entry: String,
    /// 1-based physical line the entry starts on, when parsed from content.
    pub line: Option<u32>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, entry: impl Into<String>) -> Self {
        Self {
            kind,
            entry: entry.into(),
            line: None,
        }
    }

    pub(crate) fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let first_line = self.entry.split('\n').next().unwrap_or_default();
        write!(
            f,
            "failed to parse dotenv file due to {}; failed at [{first_line}]",
            self.kind
        )?;
        if let Some(line) = self.line {
            write!(f, " on line {line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidName,
    MissingClosingQuote,
    /// The resolved value holds a NUL character.
    InvalidValue,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "an invalid name"),
            Self::MissingClosingQuote => write!(f, "a missing closing quote"),
            Self::InvalidValue => write!(f, "an invalid value"),
        }
    }
}

/// Every assertion failure found by a [`Validator`](crate::Validator) pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "one or more environment variables failed assertions: {}",
    .failures.join(", ")
)]
pub struct ValidationError {
    pub failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_first_line_of_entry() {
        let err = ParseError::new(ParseErrorKind::MissingClosingQuote, "A=\"one\ntwo").at_line(3);
        assert_eq!(
            err.to_string(),
            "failed to parse dotenv file due to a missing closing quote; failed at [A=\"one] on line 3"
        );
    }

    #[test]
    fn invalid_path_lists_every_candidate() {
        let err = Error::InvalidPath {
            paths: vec![PathBuf::from("a/.env"), PathBuf::from("b/.env")],
        };
        assert!(err.is_path_error());
        assert_eq!(
            err.to_string(),
            "unable to read any of the environment file(s) at [a/.env, b/.env]"
        );
    }

    #[test]
    fn validation_error_joins_failures() {
        let err = ValidationError {
            failures: vec!["A is missing".to_owned(), "B is not an integer".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "one or more environment variables failed assertions: A is missing, B is not an integer"
        );
    }
}

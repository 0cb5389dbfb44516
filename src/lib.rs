//! Parse and load shell-style `.env` files.
//!
//! Content is split into logical entries (a double-quoted value may span
//! several lines), each entry is parsed into a validated name and a value,
//! `${NAME}` references are resolved against earlier entries and the target
//! store, and the result is committed to an [`EnvironmentStore`].
//!
//! [`Loader`] and [`Dotenv`] write to an in-memory [`MemoryEnv`] unless given
//! another store. Loading into the process environment goes through
//! [`ProcessEnv`] or the `unsafe` convenience loaders (`dotenv`, `from_path`,
//! `from_paths`), because callers must guarantee no concurrent
//! process-environment access.

mod dotenv;
mod env;
mod error;
mod lines;
mod loader;
mod model;
mod parser;
mod pattern;
mod resolver;
mod validator;

pub use dotenv::Dotenv;
pub use env::{EnvironmentStore, LayeredEnv, MemoryEnv, ProcessEnv};
pub use error::{Error, ParseError, ParseErrorKind, ValidationError};
pub use lines::Entries;
pub use loader::{Loader, dotenv, from_path, from_paths};
pub use model::{Entry, LoadedVariables, ParsedVariable};
pub use parser::{parse_entry, parse_str};
pub use resolver::{resolve, resolve_variable};
pub use validator::Validator;

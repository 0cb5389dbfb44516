use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::env::{EnvironmentStore, MemoryEnv, ProcessEnv};
use crate::error::{Error, ParseError, ParseErrorKind};
use crate::lines::Entries;
use crate::model::LoadedVariables;
use crate::parser::parse_entry;
use crate::resolver::resolve_variable;

const DEFAULT_FILE: &str = ".env";

/// Load `.env` from the current working directory into the process environment.
///
/// Existing non-empty variables are left untouched.
///
/// # Safety
///
/// The caller must ensure no other threads concurrently read or write the
/// process environment while the load runs.
pub unsafe fn dotenv() -> Result<LoadedVariables, Error> {
    // SAFETY: forwarded to our caller.
    unsafe { from_path(DEFAULT_FILE) }
}

/// Load a dotenv file from a specific path into the process environment.
///
/// # Safety
///
/// Same contract as [`dotenv`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadedVariables, Error> {
    // SAFETY: forwarded to our caller.
    unsafe { from_paths([path]) }
}

/// Load the first readable file among `paths` into the process environment.
///
/// # Safety
///
/// Same contract as [`dotenv`].
pub unsafe fn from_paths<I, P>(paths: I) -> Result<LoadedVariables, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    // SAFETY: forwarded to our caller.
    let target = unsafe { ProcessEnv::new() };
    Loader::new()
        .paths(paths)
        .immutable(true)
        .target(target)
        .load()
}

/// Builder-style dotenv loader over an [`EnvironmentStore`].
#[derive(Debug, Clone)]
pub struct Loader<S = MemoryEnv> {
    paths: Vec<PathBuf>,
    immutable: bool,
    target: S,
}

impl Loader<MemoryEnv> {
    /// Loader over a fresh [`MemoryEnv`] with no paths configured.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Loader<MemoryEnv> {
    fn default() -> Self {
        Self::with_target(MemoryEnv::new())
    }
}

impl<S: EnvironmentStore> Loader<S> {
    /// Loader writing into `target`, mutable, with no paths configured.
    pub fn with_target(target: S) -> Self {
        Self {
            paths: Vec::new(),
            immutable: false,
            target,
        }
    }

    /// Add a candidate file path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Add several candidate file paths, tried in order.
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.paths
            .extend(paths.into_iter().map(|path| path.as_ref().to_path_buf()));
        self
    }

    /// Keep existing non-empty values instead of overwriting them.
    pub fn immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    /// Switch immutable mode on an existing loader.
    pub fn set_immutable(&mut self, immutable: bool) {
        self.immutable = immutable;
    }

    /// Swap the target store, keeping paths and mode.
    pub fn target<T: EnvironmentStore>(self, target: T) -> Loader<T> {
        Loader {
            paths: self.paths,
            immutable: self.immutable,
            target,
        }
    }

    /// Borrow the target store.
    pub fn target_env(&self) -> &S {
        &self.target
    }

    /// Mutably borrow the target store.
    pub fn target_env_mut(&mut self) -> &mut S {
        &mut self.target
    }

    /// Consume the loader and return its target store.
    pub fn into_target(self) -> S {
        self.target
    }

    /// Read a variable from the target store.
    pub fn get(&self, name: &str) -> Option<String> {
        self.target.get(name)
    }

    /// Write a variable to the target store.
    pub fn set(&mut self, name: &str, value: &str) {
        self.target.set(name, value);
    }

    /// Remove a variable from the target store.
    pub fn clear(&mut self, name: &str) {
        self.target.clear(name);
    }

    /// Every name currently held by the target store.
    pub fn names(&self) -> BTreeSet<String> {
        self.target.names()
    }

    /// Read the first readable candidate file and load its content.
    pub fn load(&mut self) -> Result<LoadedVariables, Error> {
        let content = self.find_and_read()?;
        self.load_str(&content)
    }

    /// Load `content` directly, without touching the filesystem.
    ///
    /// Entries are committed one at a time; when an entry fails, the ones
    /// before it stay committed. A value resolving to text with a NUL
    /// character fails with [`ParseErrorKind::InvalidValue`] before it
    /// reaches the store.
    pub fn load_str(&mut self, content: &str) -> Result<LoadedVariables, Error> {
        let mut loaded = LoadedVariables::new();

        for entry in Entries::new(content) {
            let entry = entry?;
            let variable = parse_entry(&entry.text).map_err(|err| err.at_line(entry.line))?;
            let value = resolve_variable(&variable, |name| match loaded.get(name) {
                Some(value) => Some(value.clone().unwrap_or_default()),
                None => self.target.get(name),
            });
            if value.as_deref().is_some_and(|value| value.contains('\0')) {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidValue, entry.text)
                        .at_line(entry.line)
                        .into(),
                );
            }

            let name = variable.name;
            let value = if self.immutable && self.target.has_non_empty(&name) {
                debug!(name = %name, "keeping existing value");
                self.target.get(&name)
            } else {
                self.target.set(&name, value.as_deref().unwrap_or_default());
                debug!(name = %name, line = entry.line, "set environment variable");
                value
            };
            loaded.insert(name, value);
        }

        Ok(loaded)
    }

    fn find_and_read(&self) -> Result<String, Error> {
        let paths = self.effective_paths();
        for path in &paths {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    debug!(path = %path.display(), "read environment file");
                    return Ok(content);
                }
                Err(err) => {
                    trace!(path = %path.display(), error = %err, "skipping environment file");
                }
            }
        }
        Err(Error::InvalidPath { paths })
    }

    fn effective_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(DEFAULT_FILE)]
        } else {
            self.paths.clone()
        }
    }
}

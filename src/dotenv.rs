use std::path::{Path, PathBuf};

use tracing::debug;

use crate::env::{EnvironmentStore, MemoryEnv};
use crate::error::{Error, ValidationError};
use crate::loader::Loader;
use crate::model::LoadedVariables;
use crate::validator::Validator;

const DEFAULT_FILE_NAME: &str = ".env";

/// Loads one dotenv file name looked up in a list of directories.
///
/// `load` and `safe_load` never overwrite non-empty existing values;
/// `overload` does.
#[derive(Debug, Clone)]
pub struct Dotenv<S = MemoryEnv> {
    loader: Loader<S>,
    variable_names: Vec<String>,
}

impl Dotenv<MemoryEnv> {
    /// Look for `file_name` (`.env` by default) in each of `dirs`, in order.
    pub fn create<I, P>(dirs: I, file_name: Option<&str>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::with_target(dirs, file_name, MemoryEnv::new())
    }
}

impl<S: EnvironmentStore> Dotenv<S> {
    /// Like [`Dotenv::create`], writing into `target`.
    pub fn with_target<I, P>(dirs: I, file_name: Option<&str>, target: S) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let loader = Loader::with_target(target).paths(file_paths(dirs, file_name));
        Self::from_loader(loader)
    }

    /// Wrap an already configured loader.
    pub fn from_loader(loader: Loader<S>) -> Self {
        Self {
            loader,
            variable_names: Vec::new(),
        }
    }

    /// Load without overwriting existing non-empty values.
    pub fn load(&mut self) -> Result<LoadedVariables, Error> {
        self.load_with(true)
    }

    /// Like [`Dotenv::load`], but a missing file yields an empty result.
    ///
    /// Malformed content is still an error.
    pub fn safe_load(&mut self) -> Result<LoadedVariables, Error> {
        match self.load() {
            Err(err) if err.is_path_error() => {
                debug!(error = %err, "no environment file found");
                Ok(LoadedVariables::new())
            }
            other => other,
        }
    }

    /// Load and overwrite existing values.
    pub fn overload(&mut self) -> Result<LoadedVariables, Error> {
        self.load_with(false)
    }

    /// Assert that every name in `names` is present in the target store.
    pub fn required<I, N>(&self, names: I) -> Result<Validator<'_, S>, ValidationError>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Validator::new(names, self.loader.target_env())
    }

    /// Names declared by the most recent successful load, in file order.
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    /// Borrow the underlying loader.
    pub fn loader(&self) -> &Loader<S> {
        &self.loader
    }

    /// Mutably borrow the underlying loader.
    pub fn loader_mut(&mut self) -> &mut Loader<S> {
        &mut self.loader
    }

    /// Consume the facade and return its target store.
    pub fn into_target(self) -> S {
        self.loader.into_target()
    }

    fn load_with(&mut self, immutable: bool) -> Result<LoadedVariables, Error> {
        self.loader.set_immutable(immutable);
        let loaded = self.loader.load()?;
        self.variable_names = loaded.keys().cloned().collect();
        Ok(loaded)
    }
}

fn file_paths<I, P>(dirs: I, file_name: Option<&str>) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let file_name = file_name.unwrap_or(DEFAULT_FILE_NAME);
    dirs.into_iter()
        .map(|dir| dir.as_ref().join(file_name))
        .collect()
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Destination and lookup source for loaded environment variables.
pub trait EnvironmentStore {
    /// Current value of `name`, if set.
    fn get(&self, name: &str) -> Option<String>;

    /// Set `name` to `value`.
    fn set(&mut self, name: &str, value: &str);

    /// Remove `name`.
    fn clear(&mut self, name: &str);

    /// Every name currently set.
    fn names(&self) -> BTreeSet<String>;

    /// Whether `name` holds a value other than the empty string.
    fn has_non_empty(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }
}

impl<S: EnvironmentStore + ?Sized> EnvironmentStore for Box<S> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        (**self).set(name, value)
    }

    fn clear(&mut self, name: &str) {
        (**self).clear(name)
    }

    fn names(&self) -> BTreeSet<String> {
        (**self).names()
    }
}

impl<S: EnvironmentStore + ?Sized> EnvironmentStore for &mut S {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        (**self).set(name, value)
    }

    fn clear(&mut self, name: &str) {
        (**self).clear(name)
    }

    fn names(&self) -> BTreeSet<String> {
        (**self).names()
    }
}

/// The current process environment.
///
/// Writes go through [`std::env::set_var`], which mutates global process
/// state and is not thread-safe for concurrent environment access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessEnv {
    _private: (),
}

impl ProcessEnv {
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// store.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl EnvironmentStore for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }

    fn set(&mut self, name: &str, value: &str) {
        // SAFETY: upheld by the caller of `ProcessEnv::new`.
        unsafe { std::env::set_var(name, value) }
    }

    fn clear(&mut self, name: &str) {
        // SAFETY: upheld by the caller of `ProcessEnv::new`.
        unsafe { std::env::remove_var(name) }
    }

    fn names(&self) -> BTreeSet<String> {
        std::env::vars_os()
            .map(|(name, _)| name.to_string_lossy().into_owned())
            .collect()
    }
}

/// An in-memory environment that never touches process state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    /// Empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment backed by an existing map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Environment built from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Snapshot of the current process environment.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .map(|(name, value)| {
                (
                    name.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Consume the environment and return its map.
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.vars
    }
}

impl From<BTreeMap<String, String>> for MemoryEnv {
    fn from(vars: BTreeMap<String, String>) -> Self {
        Self::from_map(vars)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryEnv {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl EnvironmentStore for MemoryEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_owned(), value.to_owned());
    }

    fn clear(&mut self, name: &str) {
        self.vars.remove(name);
    }

    fn names(&self) -> BTreeSet<String> {
        self.vars.keys().cloned().collect()
    }
}

/// Several stores behind one interface.
///
/// Reads return the first layer holding the name; writes and clears go to
/// every layer.
#[derive(Default)]
pub struct LayeredEnv {
    layers: Vec<Box<dyn EnvironmentStore>>,
}

impl LayeredEnv {
    /// Layered environment with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer below the existing ones.
    pub fn layer(mut self, store: impl EnvironmentStore + 'static) -> Self {
        self.layers.push(Box::new(store));
        self
    }

    /// Layers in lookup order.
    pub fn layers(&self) -> &[Box<dyn EnvironmentStore>] {
        &self.layers
    }
}

impl fmt::Debug for LayeredEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredEnv")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl EnvironmentStore for LayeredEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(name))
    }

    fn set(&mut self, name: &str, value: &str) {
        for layer in &mut self.layers {
            layer.set(name, value);
        }
    }

    fn clear(&mut self, name: &str) {
        for layer in &mut self.layers {
            layer.clear(name);
        }
    }

    fn names(&self) -> BTreeSet<String> {
        self.layers.iter().flat_map(|layer| layer.names()).collect()
    }
}

use crate::env::EnvironmentStore;
use crate::error::ValidationError;

const BOOLEAN_WORDS: [&str; 8] = ["1", "true", "on", "yes", "0", "false", "off", "no"];

/// Chainable assertions over a set of variables in a store.
///
/// Each assertion checks every variable before failing, so one error reports
/// all offenders.
///
/// ```
/// use envloader::{MemoryEnv, Validator};
///
/// let env = MemoryEnv::from_pairs([("PORT", "8080"), ("DEBUG", "off")]);
/// Validator::new(["PORT", "DEBUG"], &env)?
///     .not_empty()?
///     .allowed_values(["off", "8080"])?;
/// # Ok::<(), envloader::ValidationError>(())
/// ```
#[derive(Debug)]
pub struct Validator<'a, S: ?Sized> {
    names: Vec<String>,
    store: &'a S,
}

impl<'a, S: EnvironmentStore + ?Sized> Validator<'a, S> {
    /// Fails unless every name is present in `store`.
    pub fn new<I, N>(names: I, store: &'a S) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let validator = Self {
            names: names.into_iter().map(Into::into).collect(),
            store,
        };
        validator.check(|value| value.is_some(), "is missing")?;
        Ok(validator)
    }

    /// Names under validation.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fail for values that are empty or only whitespace.
    pub fn not_empty(self) -> Result<Self, ValidationError> {
        self.assert(
            |value| value.is_some_and(|value| !value.trim().is_empty()),
            "is empty",
        )
    }

    /// Fail for values that do not parse as an `i64`.
    pub fn is_integer(self) -> Result<Self, ValidationError> {
        self.assert(
            |value| value.is_some_and(|value| value.parse::<i64>().is_ok()),
            "is not an integer",
        )
    }

    /// Fail for values that are not a recognised boolean word or empty.
    pub fn is_boolean(self) -> Result<Self, ValidationError> {
        self.assert(
            |value| {
                value.is_some_and(|value| {
                    let value = value.trim();
                    value.is_empty()
                        || BOOLEAN_WORDS
                            .iter()
                            .any(|word| value.eq_ignore_ascii_case(word))
                })
            },
            "is not a boolean",
        )
    }

    /// Fail for values not listed in `choices`.
    pub fn allowed_values<I, V>(self, choices: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        let message = format!("is not one of [{}]", choices.join(", "));
        self.assert(
            |value| value.is_some_and(|value| choices.iter().any(|choice| choice == value)),
            &message,
        )
    }

    fn assert<F>(self, predicate: F, message: &str) -> Result<Self, ValidationError>
    where
        F: Fn(Option<&str>) -> bool,
    {
        self.check(predicate, message)?;
        Ok(self)
    }

    fn check<F>(&self, predicate: F, message: &str) -> Result<(), ValidationError>
    where
        F: Fn(Option<&str>) -> bool,
    {
        let failures: Vec<String> = self
            .names
            .iter()
            .filter(|name| !predicate(self.store.get(name).as_deref()))
            .map(|name| format!("{name} {message}"))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { failures })
        }
    }
}

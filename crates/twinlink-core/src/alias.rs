use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The short lookup key of a stored URL.
///
/// Aliases must be 3-32 characters long and contain only
/// alphanumeric characters, hyphens, or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alias(String);

impl Alias {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 32;

    /// Creates a new `Alias` after validating the input.
    ///
    /// Valid aliases are 3-32 characters and contain only `[a-zA-Z0-9_-]`.
    pub fn new(alias: impl Into<String>) -> Result<Self, CoreError> {
        let alias = alias.into();
        Self::validate(&alias)?;
        Ok(Self(alias))
    }

    /// Creates an `Alias` without validation.
    ///
    /// Use this only for values produced by trusted internal sources
    /// (generators, rows read back from a backend).
    pub fn new_unchecked(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    /// Returns the alias as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(alias: &str) -> Result<(), CoreError> {
        if alias.len() < Self::MIN_LENGTH || alias.len() > Self::MAX_LENGTH {
            return Err(CoreError::InvalidAlias(format!(
                "length must be between {} and {}, got {}",
                Self::MIN_LENGTH,
                Self::MAX_LENGTH,
                alias.len()
            )));
        }

        if !alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidAlias(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                alias
            )));
        }

        Ok(())
    }
}

impl Display for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Alias {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

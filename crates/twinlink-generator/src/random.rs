use crate::Generator;
use rand::distributions::Alphanumeric;
use rand::Rng;
use twinlink_core::{Alias, CoreError};

/// Produces random alphanumeric aliases of a fixed length.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub const DEFAULT_LENGTH: usize = 6;

    /// Fails if `length` is outside the bounds an [`Alias`] accepts.
    pub fn new(length: usize) -> Result<Self, CoreError> {
        if !(Alias::MIN_LENGTH..=Alias::MAX_LENGTH).contains(&length) {
            return Err(CoreError::InvalidAlias(format!(
                "generated length must be between {} and {}, got {}",
                Alias::MIN_LENGTH,
                Alias::MAX_LENGTH,
                length
            )));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
        }
    }
}

impl Generator for RandomGenerator {
    type Output = Alias;

    fn generate(&self) -> Self::Output {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        Alias::new_unchecked(value)
    }
}

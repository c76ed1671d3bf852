use crate::Generator;
use std::sync::atomic::{AtomicU64, Ordering};
use twinlink_core::{Alias, CoreError};

const COUNTER_WIDTH: usize = 6;
// digits in u64::MAX; the counter widens past COUNTER_WIDTH without truncation
const MAX_COUNTER_DIGITS: usize = 20;

/// Produces `prefix` followed by a zero-padded counter: `ln000000`, `ln000001`, ...
///
/// Unique within one instance. Processes sharing a store need distinct
/// prefixes.
#[derive(Debug)]
pub struct UniqueGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl UniqueGenerator {
    /// Fails if the prefix is not alias-safe or leaves no room for the counter.
    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self, CoreError> {
        Self::with_offset(prefix, 0)
    }

    /// Starts counting from `offset` instead of zero.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Result<Self, CoreError> {
        let prefix = prefix.into();
        if prefix.len() + MAX_COUNTER_DIGITS > Alias::MAX_LENGTH {
            return Err(CoreError::InvalidAlias(format!(
                "prefix '{prefix}' is longer than {} characters",
                Alias::MAX_LENGTH - MAX_COUNTER_DIGITS
            )));
        }
        // validates the character set
        Alias::new(format!("{prefix}{:0width$}", 0, width = COUNTER_WIDTH))?;

        Ok(Self {
            counter: AtomicU64::new(offset),
            prefix,
        })
    }
}

impl Generator for UniqueGenerator {
    type Output = Alias;

    fn generate(&self) -> Self::Output {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        Alias::new_unchecked(format!(
            "{}{:0width$}",
            self.prefix,
            count,
            width = COUNTER_WIDTH
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_aliases() {
        let generator = UniqueGenerator::with_prefix("ln").unwrap();

        assert_eq!(generator.generate().as_str(), "ln000000");
        assert_eq!(generator.generate().as_str(), "ln000001");
        assert_eq!(generator.generate().as_str(), "ln000002");
    }

    #[test]
    fn with_offset() {
        let generator = UniqueGenerator::with_offset("node-a", 1000).unwrap();

        assert_eq!(generator.generate().as_str(), "node-a001000");
        assert_eq!(generator.generate().as_str(), "node-a001001");
    }

    #[test]
    fn rejects_unsafe_prefixes() {
        assert!(UniqueGenerator::with_prefix("a b").is_err());
        assert!(UniqueGenerator::with_prefix("x".repeat(13)).is_err());
        assert!(UniqueGenerator::with_prefix("x".repeat(12)).is_ok());
    }

    #[test]
    fn counter_past_padding_still_yields_valid_aliases() {
        let prefix = "x".repeat(12);

        let generator = UniqueGenerator::with_offset(prefix.as_str(), 1_000_000).unwrap();
        assert_eq!(generator.generate().as_str(), format!("{prefix}1000000"));

        let generator = UniqueGenerator::with_offset(prefix.as_str(), u64::MAX).unwrap();
        let alias = generator.generate();
        assert!(Alias::new(alias.as_str()).is_ok());
        assert_eq!(alias.as_str().len(), Alias::MAX_LENGTH);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UniqueGenerator>();
    }
}

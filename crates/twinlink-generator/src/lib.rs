pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::UniqueGenerator;

use twinlink_core::Alias;

/// Trait for generating aliases when the caller supplies none.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated alias may still collide with a stored one; the backends
/// report that as `AlreadyExists`.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<Alias>;

    fn generate(&self) -> Self::Output;
}

pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use burrow_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
///
/// Implementations can vary from simple random generators to
/// sequential counters used in tests.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;
    /// Generates a value that can be converted into a short code.
    ///
    /// Uniqueness is not guaranteed; callers must not assume it.
    fn generate(&self) -> Self::Output;
}

use crate::Generator;
use burrow_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// A sequential short code generator: `seq000000`, `seq000001`, ...
///
/// Output is fully predictable, which makes it the generator of choice for
/// tests that need to know the next short URL in advance.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl SeqGenerator {
    /// Creates a generator counting from zero. `prefix` should be
    /// alphanumeric so that the codes remain valid short codes.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a generator counting from `offset`.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(format!("{}{:06}", self.prefix, count))
    }
}

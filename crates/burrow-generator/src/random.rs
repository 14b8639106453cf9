use crate::Generator;
use burrow_core::ShortCode;
use jiff::Timestamp;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Characters a random short code is drawn from.
pub const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated codes when none is configured.
pub const DEFAULT_LENGTH: usize = 8;

/// Generates fixed-length codes drawn uniformly from [`ALPHABET`].
///
/// A single RNG is seeded once, at construction, from the current time and
/// shared by every call. Codes are not checked against storage, so
/// collisions are possible.
#[derive(Debug)]
pub struct RandomGenerator {
    length: usize,
    rng: Mutex<StdRng>,
}

impl RandomGenerator {
    /// Creates a generator seeded from the current time.
    pub fn new(length: usize) -> Self {
        let seed = Timestamp::now().as_nanosecond() as u64;
        Self::with_seed(length, seed)
    }

    /// Creates a generator with a fixed seed, producing a reproducible sequence.
    pub fn with_seed(length: usize, seed: u64) -> Self {
        Self {
            length,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH)
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        let mut rng = self.rng.lock();
        let code: String = (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}

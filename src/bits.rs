//! Sources of the per-pixel coin flips used while embedding.
//!
//! The embedder never touches a global generator. Callers seed a
//! [`RandomBits`] once and pass it in, tests pass a [`CycleBits`].
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Supplies one bit per pixel to [`crate::embed`]
pub trait BitSource {
    fn next_bit(&mut self) -> bool;
}

/// Uniform random bits drawn from a [`rand`] generator
#[derive(Debug, Clone)]
pub struct RandomBits<R = StdRng> {
    rng: R,
}

impl<R: Rng> RandomBits<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomBits<StdRng> {
    /// Seed from the operating system's entropy source
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible bits for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BitSource for RandomBits<R> {
    fn next_bit(&mut self) -> bool {
        self.rng.gen()
    }
}

/// Repeats a fixed bit pattern forever
///
/// # Examples
/// ```rust
/// # use ppmsteg::{BitSource, CycleBits};
/// let mut bits = CycleBits::alternating();
/// assert_eq!(
///     (0..4).map(|_| bits.next_bit()).collect::<Vec<_>>(),
///     vec![false, true, false, true]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CycleBits {
    pattern: Vec<bool>,
    index: usize,
}

impl CycleBits {
    /// An empty pattern yields `false` forever
    pub fn new(pattern: impl Into<Vec<bool>>) -> Self {
        Self {
            pattern: pattern.into(),
            index: 0,
        }
    }

    /// `0, 1, 0, 1, ...`
    pub fn alternating() -> Self {
        Self::new([false, true])
    }

    /// Every draw is 1
    pub fn ones() -> Self {
        Self::new([true])
    }
}

impl BitSource for CycleBits {
    fn next_bit(&mut self) -> bool {
        let Some(&bit) = self.pattern.get(self.index) else {
            return false;
        };
        self.index = (self.index + 1) % self.pattern.len();
        bit
    }
}

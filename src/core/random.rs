use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard};

/// Shared random source for shuffling sources and picking entries.
///
/// The lock is only taken inside these synchronous methods, so it is never
/// held across an `.await`.
pub struct Randomizer {
    rng: Mutex<StdRng>,
}

impl Randomizer {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sequence, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn shuffle<T>(&self, items: &mut [T]) {
        items.shuffle(&mut *self.rng());
    }

    pub fn choose<T: Clone>(&self, items: &[T]) -> Option<T> {
        items.choose(&mut *self.rng()).cloned()
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::from_entropy()
    }
}

//! Shared random source for variant replies and quote selection.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Thread-safe uniform picker.
///
/// One instance is shared between the responder and the scheduler. The lock
/// is held only for a single draw and never across an await point.
pub struct Picker {
    rng: Mutex<StdRng>,
}

impl Picker {
    /// Picker seeded from the OS entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic picker for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&self, len: usize) -> usize {
        self.rng
            .lock()
            .expect("picker lock poisoned")
            .gen_range(0..len)
    }

    /// Uniform choice from a non-empty slice.
    pub fn choose<'a, T>(&self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }
}

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

// ── Capability ─────────────────────────────────────────────────────────────

/// Source of randomness used by the code generator and the analytics
/// simulator. Injected so tests can substitute a reproducible generator.
pub trait RandomSource: Send + Sync {
    /// Uniform float in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// Uniform integer in `[0, bound)`. A `bound` of 0 yields 0.
    fn next_below(&self, bound: u32) -> u32;
}

// ── Ambient thread RNG ─────────────────────────────────────────────────────

/// Draws from `rand::thread_rng()` on every call. Stateless, so it can be
/// shared between sessions freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn next_below(&self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..bound)
    }
}

// ── Seeded RNG ─────────────────────────────────────────────────────────────

/// Reproducible generator: the same seed always yields the same sequence.
/// Selected at startup with `RNG_SEED`, and used throughout the tests.
#[derive(Debug)]
pub struct SeededRandom {
    inner: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen::<f64>()
    }

    fn next_below(&self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..bound)
    }
}

//! Random sources for delay jitter.
//!
//! A policy owns its source instead of reaching for a thread-local RNG, so
//! tests can pin the draw and derived policies share one stream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Uniform sampler used to scale each computed delay.
pub trait JitterSource: fmt::Debug + Send + Sync {
    /// Draw a value uniformly from `[low, high]`.
    fn sample(&self, low: f64, high: f64) -> f64;
}

/// `StdRng` behind a mutex. Every call draws a fresh value.
#[derive(Debug)]
pub struct StdRngJitter {
    rng: Mutex<StdRng>,
}

impl StdRngJitter {
    /// Seeded from the OS entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for StdRngJitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl JitterSource for StdRngJitter {
    fn sample(&self, low: f64, high: f64) -> f64 {
        // Also catches NaN bounds.
        if !(high > low) {
            return low;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(low..=high)
    }
}

/// Deterministic source: always returns the point at `position` within the
/// range (0.0 = low end, 1.0 = high end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f64);

impl FixedJitter {
    /// Middle of the range, i.e. a jitter factor of exactly 1.0.
    pub fn midpoint() -> Self {
        Self(0.5)
    }
}

impl JitterSource for FixedJitter {
    fn sample(&self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.0.clamp(0.0, 1.0)
    }
}

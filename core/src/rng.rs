//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness — loot spawn draws, spawn-point and loot-type
//! selection, auth tokens — flows through a single `WorldRng` that
//! is injected at world construction. Tests pass a fixed seed and
//! get a fully reproducible world.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct WorldRng {
    inner: Pcg64Mcg,
}

impl WorldRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// 32 lowercase hex characters, suitable as an auth token.
    pub fn token_hex(&mut self) -> String {
        format!("{:016x}{:016x}", self.inner.next_u64(), self.inner.next_u64())
    }
}

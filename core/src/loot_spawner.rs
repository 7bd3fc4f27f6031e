//! Loot spawn policy.
//!
//! Stateless apart from a "time since last spawn" accumulator: the
//! longer a session has gone without a spawn, the more likely the next
//! draw is to produce one. Each session owns its own spawner, so one
//! session's spawn never resets another's accrued idle time. The spawn
//! count never exceeds the shortage (looters minus live loot), so the
//! policy cannot overfill a session.

use crate::rng::WorldRng;

#[derive(Debug)]
pub struct LootSpawner {
    base_interval_ms: f64,
    probability: f64,
    elapsed_since_spawn_ms: f64,
}

impl LootSpawner {
    /// `base_interval_ms` is the nominal spawn period; `probability`
    /// is the per-interval spawn chance in [0, 1].
    pub fn new(base_interval_ms: f64, probability: f64) -> Self {
        Self {
            base_interval_ms,
            probability,
            elapsed_since_spawn_ms: 0.0,
        }
    }

    /// Decide how many loot objects to spawn after `delta_ms` elapsed,
    /// given the session's current live loot and active looter counts.
    pub fn generate(
        &mut self,
        delta_ms: u64,
        loot_count: usize,
        looter_count: usize,
        rng: &mut WorldRng,
    ) -> u32 {
        self.elapsed_since_spawn_ms += delta_ms as f64;
        let shortage = looter_count.saturating_sub(loot_count) as f64;
        let ratio = self.elapsed_since_spawn_ms / self.base_interval_ms;
        let probability =
            ((1.0 - (1.0 - self.probability).powf(ratio)) * rng.next_f64()).clamp(0.0, 1.0);
        let spawned = (shortage * probability).round() as u32;
        if spawned > 0 {
            self.elapsed_since_spawn_ms = 0.0;
        }
        spawned
    }

    /// Time accrued since this spawner last produced loot.
    pub fn accrued_ms(&self) -> f64 {
        self.elapsed_since_spawn_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_shortage() {
        let mut rng = WorldRng::new(7);
        let mut spawner = LootSpawner::new(1_000.0, 0.9);
        for _ in 0..500 {
            let spawned = spawner.generate(5_000, 2, 6, &mut rng);
            assert!(spawned <= 4);
        }
    }

    #[test]
    fn no_shortage_means_no_spawn() {
        let mut rng = WorldRng::new(7);
        let mut spawner = LootSpawner::new(1_000.0, 1.0);
        for _ in 0..100 {
            assert_eq!(spawner.generate(10_000, 5, 3, &mut rng), 0);
        }
    }
}

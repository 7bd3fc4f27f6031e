//! lootworld-core: the authoritative simulation core of a tick-driven
//! multiplayer loot-gathering world.
//!
//! Dogs move along axis-aligned road networks, loot appears under a
//! probabilistic spawn policy, a swept-segment collision pass awards
//! pickups and office deposits in deterministic order, idle dogs are
//! retired into a SQLite-backed leaderboard, and the whole world can be
//! snapshotted to disk and restored.
//!
//! RULES:
//!   - All randomness flows through `rng::WorldRng`; the same seed and
//!     the same inputs reproduce the same run, bit for bit.
//!   - Time moves only inside `engine::GameEngine::tick`.
//!   - Only `store` talks to the database.

pub mod collision;
pub mod config;
pub mod engine;
pub mod error;
pub mod geom;
pub mod loot_spawner;
pub mod map;
pub mod movement;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod world;

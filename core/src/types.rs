//! Shared identifier types.

/// Process-unique loot identifier. Monotonically increasing, never reused.
pub type LootId = u64;

/// Index into the world's dog arena.
pub type DogHandle = usize;

/// Index into the world's player list.
pub type PlayerHandle = usize;

pub type MapId = String;

/// 32-hex-character auth token binding a client to a player.
pub type Token = String;

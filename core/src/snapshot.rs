//! Snapshot serialization — full world state to and from disk, for
//! process-restart continuity.
//!
//! The snapshot captures everything `restore` needs to reproduce the
//! pre-save trajectory: the clock, the loot counter, the loot arena,
//! per-session membership, every dog, every player and the token
//! table. Writes are atomic (temp file + rename) so a crash can never
//! leave a half-written snapshot behind. A missing file on load is
//! "no prior state", not an error.

use crate::{
    config::GameConfig,
    error::{GameError, GameResult},
    geom::Point2,
    loot_spawner::LootSpawner,
    types::{LootId, MapId, PlayerHandle, Token},
    world::{Direction, Dog, GameSession, LootObject, Player, World},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootSnapshot {
    pub id: LootId,
    pub kind: u32,
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub map_id: MapId,
    pub retired: u32,
    pub loot: Vec<LootId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DogSnapshot {
    pub uuid: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub vx: f64,
    pub vy: f64,
    pub direction: Direction,
    pub nominal_speed: f64,
    pub bag_capacity: u32,
    pub last_activity: f64,
    pub start_time: f64,
    pub elapsed: f64,
    pub bag: Vec<LootId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub map_id: MapId,
    pub score: i64,
    pub online: bool,
    pub dog: DogSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub token: Token,
    pub player: PlayerHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub clock: f64,
    pub next_loot_id: LootId,
    pub loot: Vec<LootSnapshot>,
    pub sessions: Vec<SessionSnapshot>,
    pub players: Vec<PlayerSnapshot>,
    pub tokens: Vec<TokenSnapshot>,
}

/// Capture a consistent copy of the whole world.
pub fn capture(world: &World) -> WorldSnapshot {
    WorldSnapshot {
        clock: world.clock,
        next_loot_id: world.next_loot_id,
        loot: world
            .loot
            .values()
            .map(|l| LootSnapshot {
                id: l.id,
                kind: l.kind,
                x: l.position.x,
                y: l.position.y,
                visible: l.visible,
            })
            .collect(),
        sessions: world
            .sessions
            .values()
            .map(|s| SessionSnapshot {
                map_id: s.map_id.clone(),
                retired: s.retired,
                loot: s.loot.iter().copied().collect(),
            })
            .collect(),
        players: world
            .players
            .iter()
            .map(|p| {
                let dog = &world.dogs[p.dog];
                PlayerSnapshot {
                    map_id: p.map_id.clone(),
                    score: p.score,
                    online: p.online,
                    dog: DogSnapshot {
                        uuid: dog.uuid.to_string(),
                        name: dog.name.clone(),
                        x: dog.position.x,
                        y: dog.position.y,
                        start_x: dog.start_position.x,
                        start_y: dog.start_position.y,
                        vx: dog.velocity.x,
                        vy: dog.velocity.y,
                        direction: dog.direction,
                        nominal_speed: dog.nominal_speed,
                        bag_capacity: dog.bag_capacity,
                        last_activity: dog.last_activity,
                        start_time: dog.start_time,
                        elapsed: dog.elapsed,
                        bag: dog.bag.clone(),
                    },
                }
            })
            .collect(),
        tokens: world
            .tokens
            .iter()
            .map(|(token, &player)| TokenSnapshot {
                token: token.clone(),
                player,
            })
            .collect(),
    }
}

/// Rebuild a world from a snapshot. The config supplies the immutable
/// map templates; everything mutable comes from the snapshot.
pub fn restore(config: &GameConfig, seed: u64, snapshot: &WorldSnapshot) -> GameResult<World> {
    let mut world = World::new(config, seed)?;
    world.clock = snapshot.clock;
    world.next_loot_id = snapshot.next_loot_id;

    for loot in &snapshot.loot {
        world.loot.insert(
            loot.id,
            LootObject {
                id: loot.id,
                kind: loot.kind,
                position: Point2::new(loot.x, loot.y),
                visible: loot.visible,
            },
        );
    }

    for session in &snapshot.sessions {
        let map = world
            .find_map(&session.map_id)
            .ok_or_else(|| GameError::MapNotFound(session.map_id.clone()))?;
        let bag_capacity = map.bag_capacity.unwrap_or(world.default_bag_capacity);
        world.sessions.insert(
            session.map_id.clone(),
            GameSession {
                map_id: session.map_id.clone(),
                dogs: Vec::new(),
                loot: session.loot.iter().copied().collect::<BTreeSet<_>>(),
                retired: session.retired,
                bag_capacity,
                timer: snapshot.clock,
                spawner: LootSpawner::new(world.spawn_interval_ms, world.spawn_probability),
            },
        );
    }

    for player in &snapshot.players {
        if world.find_map(&player.map_id).is_none() {
            return Err(GameError::MapNotFound(player.map_id.clone()));
        }
        for &loot_id in &player.dog.bag {
            if !world.loot.contains_key(&loot_id) {
                return Err(GameError::Config(format!(
                    "snapshot references unknown loot id {loot_id}"
                )));
            }
        }
        let uuid = player.dog.uuid.parse::<Uuid>().map_err(|e| {
            GameError::Config(format!("snapshot has bad dog uuid '{}': {e}", player.dog.uuid))
        })?;

        let handle = world.dogs.len();
        world.dogs.push(Dog {
            uuid,
            name: player.dog.name.clone(),
            position: Point2::new(player.dog.x, player.dog.y),
            start_position: Point2::new(player.dog.start_x, player.dog.start_y),
            velocity: Point2::new(player.dog.vx, player.dog.vy),
            direction: player.dog.direction,
            nominal_speed: player.dog.nominal_speed,
            bag: player.dog.bag.clone(),
            bag_capacity: player.dog.bag_capacity,
            elapsed: player.dog.elapsed,
            last_activity: player.dog.last_activity,
            start_time: player.dog.start_time,
        });

        // A session may be absent from the snapshot only if it never
        // existed; a player on it means it did.
        let clock = snapshot.clock;
        let default_capacity = world.default_bag_capacity;
        let spawn_interval_ms = world.spawn_interval_ms;
        let spawn_probability = world.spawn_probability;
        let session = world
            .sessions
            .entry(player.map_id.clone())
            .or_insert_with(|| GameSession {
                map_id: player.map_id.clone(),
                dogs: Vec::new(),
                loot: BTreeSet::new(),
                retired: 0,
                bag_capacity: default_capacity,
                timer: clock,
                spawner: LootSpawner::new(spawn_interval_ms, spawn_probability),
            });
        session.dogs.push(handle);

        world.players.push(Player {
            dog: handle,
            map_id: player.map_id.clone(),
            online: player.online,
            score: player.score,
        });
    }

    for binding in &snapshot.tokens {
        if binding.player >= world.players.len() {
            return Err(GameError::Config(format!(
                "snapshot token bound to unknown player {}",
                binding.player
            )));
        }
        world.tokens.insert(binding.token.clone(), binding.player);
    }

    Ok(world)
}

/// Atomically persist a snapshot: write to `<path>.tmp`, then rename.
pub fn save(path: &Path, snapshot: &WorldSnapshot) -> GameResult<()> {
    let json = serde_json::to_string(snapshot)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    log::debug!("snapshot saved to {}", path.display());
    Ok(())
}

/// Read a snapshot back. A missing file means a fresh start.
pub fn load(path: &Path) -> GameResult<Option<WorldSnapshot>> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&json)?))
}

//! The game engine — one authoritative tick function.
//!
//! TICK ORDER (fixed, never reordered):
//!   1. Loot spawn policy
//!   2. Per-player: clock refresh, movement resolution, retirement
//!   3. Collision pass A — loot pickup
//!   4. Collision pass B — office deposit and scoring
//!   5. Periodic snapshot autosave
//!
//! Both the wall-clock scheduler and any explicit tick request call
//! this one function. There is no second tick path: divergence between
//! a scheduled and an explicit tick would be a latent bug source, so
//! the possibility is removed structurally.
//!
//! Retirement persistence is at-most-once: the player is marked
//! offline and counted before the durable write is attempted, so a
//! failed write loses the leaderboard record but never leaves the
//! simulation inconsistent. The first write error is reported to the
//! caller after the tick has fully settled.

use crate::{
    collision::{find_gather_events, Gatherer, LootSource, OfficeSource, GATHERER_WIDTH},
    error::{GameError, GameResult},
    movement,
    snapshot,
    store::{self, ConnectionPool, RetiredRecord},
    types::{LootId, PlayerHandle},
    world::World,
};
use std::path::PathBuf;
use std::sync::Arc;

/// What happened during one tick, for logging and tests.
#[derive(Debug, Default)]
pub struct TickReport {
    pub spawned: Vec<LootId>,
    pub pickups: Vec<(PlayerHandle, LootId)>,
    /// (player, score gained) per office deposit.
    pub deposits: Vec<(PlayerHandle, i64)>,
    pub retired: Vec<PlayerHandle>,
}

pub struct GameEngine {
    pub world: World,
    pool: Arc<ConnectionPool>,
    save_path: Option<PathBuf>,
    save_period_ms: f64,
    last_save_ms: f64,
}

impl GameEngine {
    pub fn new(world: World, pool: Arc<ConnectionPool>) -> Self {
        Self {
            world,
            pool,
            save_path: None,
            save_period_ms: 0.0,
            last_save_ms: 0.0,
        }
    }

    /// Enable periodic snapshot autosave. A period of zero disables it.
    pub fn with_autosave(mut self, path: PathBuf, period_ms: u64) -> Self {
        self.save_path = Some(path);
        self.save_period_ms = period_ms as f64;
        self
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Read the leaderboard through the pool. `limit` is capped at
    /// `store::MAX_RECORD_ITEMS`.
    pub fn leaderboard(&self, offset: u64, limit: u64) -> GameResult<Vec<RetiredRecord>> {
        let conn = self.pool.acquire();
        store::leaderboard(&conn, offset, limit)
    }

    /// Advance the world by `delta_ms`. This is the core simulation
    /// step and the only place world time moves.
    pub fn tick(&mut self, delta_ms: u64) -> GameResult<TickReport> {
        let pool = Arc::clone(&self.pool);
        let world = &mut self.world;
        let mut report = TickReport {
            spawned: world.spawn_loot(delta_ms),
            ..TickReport::default()
        };

        let delta = delta_ms as f64 / 1_000.0;
        world.clock += delta;
        let clock = world.clock;
        for session in world.sessions.values_mut() {
            session.timer = clock;
        }

        let threshold = world.retirement_time;
        let mut deferred: Option<GameError> = None;

        for player_idx in 0..world.players.len() {
            let dog_handle = world.players[player_idx].dog;
            world.dogs[dog_handle].elapsed += delta;

            if !world.players[player_idx].online {
                continue;
            }

            let map_idx = match world.map_index.get(&world.players[player_idx].map_id) {
                Some(&i) => i,
                None => continue,
            };
            movement::resolve(&mut world.dogs[dog_handle], &world.maps[map_idx], delta_ms);

            let idle = world.dogs[dog_handle].idle_time();
            if idle > threshold || (idle - threshold).abs() < f64::EPSILON {
                world.players[player_idx].online = false;
                let map_id = world.players[player_idx].map_id.clone();
                if let Some(session) = world.sessions.get_mut(&map_id) {
                    session.retired += 1;
                }
                let dog = &world.dogs[dog_handle];
                let record = RetiredRecord {
                    id: dog.uuid,
                    name: dog.name.clone(),
                    score: world.players[player_idx].score,
                    play_time_ms: (dog.elapsed - dog.start_time) * 1_000.0,
                };
                log::info!(
                    "player {player_idx} ('{}') retired after {:.1}s idle, score {}",
                    record.name,
                    idle,
                    record.score
                );
                report.retired.push(player_idx);

                let mut conn = pool.acquire();
                if let Err(e) = store::insert_retired(&mut conn, &record) {
                    log::error!("retirement record write failed for {}: {e}", record.id);
                    if deferred.is_none() {
                        deferred = Some(e);
                    }
                }
            }
        }

        // Gather segments are fixed for the rest of the tick: both
        // collision passes see the same pre-move/post-move pair.
        let (gatherers, owners) = build_gatherers(world);

        // Pass A: loot pickup.
        let loot_source = LootSource::new(world);
        for event in find_gather_events(&gatherers, &loot_source) {
            let loot_id = loot_source.loot_id(event.target);
            // An item belongs to exactly one session; resolve the
            // first (and only) structural match.
            let session_key = world
                .sessions
                .iter()
                .find(|(_, s)| s.loot.contains(&loot_id))
                .map(|(k, _)| k.clone());
            let Some(session_key) = session_key else {
                continue; // already picked up earlier this tick
            };
            let player_idx = owners[event.gatherer];
            let dog_handle = world.players[player_idx].dog;
            if !world.dogs[dog_handle].bag_has_room() {
                continue; // bag full: the item stays live and visible
            }
            world.dogs[dog_handle].bag.push(loot_id);
            if let Some(loot) = world.loot.get_mut(&loot_id) {
                loot.visible = false;
            }
            if let Some(session) = world.sessions.get_mut(&session_key) {
                session.loot.remove(&loot_id);
            }
            report.pickups.push((player_idx, loot_id));
            log::debug!("player {player_idx} picked up loot {loot_id}");
        }

        // Pass B: office deposit. Each event resolves exactly one
        // session, chosen by first dog-count match.
        let office_source = OfficeSource::new(&world.maps);
        for event in find_gather_events(&gatherers, &office_source) {
            let player_idx = owners[event.gatherer];
            let dog_handle = world.players[player_idx].dog;
            if world.dogs[dog_handle].bag.is_empty() {
                continue;
            }
            let own_size = match world.sessions.get(&world.players[player_idx].map_id) {
                Some(s) => s.dogs.len(),
                None => continue,
            };
            let matched = world
                .sessions
                .values()
                .find(|s| s.dogs.len() == own_size)
                .map(|s| s.map_id.clone());
            let Some(map_id) = matched else { continue };
            let map_idx = match world.map_index.get(&map_id) {
                Some(&i) => i,
                None => continue,
            };

            let bag = std::mem::take(&mut world.dogs[dog_handle].bag);
            let mut gained = 0i64;
            for loot_id in bag {
                if let Some(loot) = world.loot.get(&loot_id) {
                    gained += world.maps[map_idx].loot_value(loot.kind);
                }
            }
            world.players[player_idx].score += gained;
            report.deposits.push((player_idx, gained));
            log::info!("player {player_idx} deposited bag for {gained} points");
        }

        if let Some(path) = self.save_path.clone() {
            if self.save_period_ms > 0.0 {
                let now_ms = self.world.clock * 1_000.0;
                if now_ms - self.last_save_ms >= self.save_period_ms {
                    snapshot::save(&path, &snapshot::capture(&self.world))?;
                    self.last_save_ms = now_ms;
                }
            }
        }

        match deferred {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

/// Movement segments for every online player, with the owning player
/// handle alongside.
fn build_gatherers(world: &World) -> (Vec<Gatherer>, Vec<PlayerHandle>) {
    let mut gatherers = Vec::new();
    let mut owners = Vec::new();
    for (idx, player) in world.players.iter().enumerate() {
        if !player.online {
            continue;
        }
        let dog = &world.dogs[player.dog];
        gatherers.push(Gatherer {
            start: dog.start_position,
            end: dog.position,
            width: GATHERER_WIDTH,
        });
        owners.push(idx);
    }
    (gatherers, owners)
}

//! The mutable world model: dogs, loot, sessions, players and the
//! aggregate clock.
//!
//! OWNERSHIP RULES:
//!   - Loot lives in exactly one place, the world's loot arena.
//!     Sessions and bags hold loot *ids*, never loot objects.
//!   - Dogs live in the world's dog arena; sessions and players hold
//!     dog handles.
//!   - Sessions are created lazily on first join and are singletons
//!     per map id for the process lifetime.
//!   - All mutation happens through `&mut World` — one logical writer.

use crate::{
    config::GameConfig,
    error::{GameError, GameResult},
    geom::Point2,
    loot_spawner::LootSpawner,
    map::Map,
    rng::WorldRng,
    types::{DogHandle, LootId, MapId, PlayerHandle, Token},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "U")]
    Up,
    #[serde(rename = "D")]
    Down,
    #[serde(rename = "")]
    Stop,
}

/// A player-controlled agent.
#[derive(Debug)]
pub struct Dog {
    pub uuid: Uuid,
    pub name: String,
    pub position: Point2,
    /// Position at the start of the current tick's move; together with
    /// `position` it forms the gather segment.
    pub start_position: Point2,
    pub velocity: Point2,
    pub direction: Direction,
    pub nominal_speed: f64,
    pub bag: Vec<LootId>,
    pub bag_capacity: u32,
    /// Elapsed time this dog has existed, in seconds.
    pub elapsed: f64,
    pub last_activity: f64,
    pub start_time: f64,
}

impl Dog {
    fn new(
        uuid: Uuid,
        name: &str,
        position: Point2,
        nominal_speed: f64,
        bag_capacity: u32,
        start_time: f64,
    ) -> Self {
        Self {
            uuid,
            name: name.to_string(),
            position,
            start_position: position,
            velocity: Point2::new(0.0, 0.0),
            direction: Direction::Up,
            nominal_speed,
            bag: Vec::new(),
            bag_capacity,
            elapsed: start_time,
            last_activity: start_time,
            start_time,
        }
    }

    /// Move to a new position, recording the old one as the start of
    /// the gather segment.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.start_position = self.position;
        self.position = Point2::new(x, y);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        let v = self.nominal_speed;
        self.velocity = match direction {
            Direction::Left => Point2::new(-v, 0.0),
            Direction::Right => Point2::new(v, 0.0),
            Direction::Up => Point2::new(0.0, -v),
            Direction::Down => Point2::new(0.0, v),
            Direction::Stop => Point2::new(0.0, 0.0),
        };
        self.direction = direction;
    }

    pub fn stop(&mut self) {
        self.velocity = Point2::new(0.0, 0.0);
    }

    pub fn bag_has_room(&self) -> bool {
        self.bag.len() < self.bag_capacity as usize
    }

    /// Seconds since the dog last moved. A moving dog's velocity
    /// components differ, which counts as activity and resets the
    /// idle clock.
    pub fn idle_time(&mut self) -> f64 {
        if (self.velocity.x - self.velocity.y).abs() > f64::EPSILON {
            self.last_activity = self.elapsed;
        }
        self.elapsed - self.last_activity
    }
}

#[derive(Debug, Clone)]
pub struct LootObject {
    pub id: LootId,
    pub kind: u32,
    pub position: Point2,
    pub visible: bool,
}

/// One live instance of a map.
#[derive(Debug)]
pub struct GameSession {
    pub map_id: MapId,
    pub dogs: Vec<DogHandle>,
    /// Ids of loot currently lying on this map.
    pub loot: BTreeSet<LootId>,
    pub retired: u32,
    pub bag_capacity: u32,
    pub timer: f64,
    /// This session's own spawn clock; other sessions' spawns never
    /// touch it.
    pub spawner: LootSpawner,
}

impl GameSession {
    /// Dogs still in play; retired dogs no longer count as looters.
    pub fn active_looters(&self) -> usize {
        self.dogs.len() - self.retired as usize
    }
}

#[derive(Debug)]
pub struct Player {
    pub dog: DogHandle,
    pub map_id: MapId,
    pub online: bool,
    pub score: i64,
}

/// The root aggregate. Owns every piece of mutable simulation state.
pub struct World {
    pub maps: Vec<Map>,
    pub(crate) map_index: HashMap<MapId, usize>,
    /// Keyed and iterated in map-id order so per-tick processing is
    /// deterministic.
    pub sessions: BTreeMap<MapId, GameSession>,
    pub dogs: Vec<Dog>,
    pub players: Vec<Player>,
    pub tokens: BTreeMap<Token, PlayerHandle>,
    /// The loot arena — sole owner of every `LootObject`.
    pub loot: BTreeMap<LootId, LootObject>,
    pub next_loot_id: LootId,
    /// Global simulation clock, in seconds.
    pub clock: f64,
    pub retirement_time: f64,
    pub default_bag_capacity: u32,
    pub randomize_spawn_points: bool,
    pub(crate) spawn_interval_ms: f64,
    pub(crate) spawn_probability: f64,
    pub(crate) rng: WorldRng,
}

impl World {
    pub fn new(config: &GameConfig, seed: u64) -> GameResult<Self> {
        config.validate()?;
        let mut maps = Vec::with_capacity(config.maps.len());
        let mut map_index = HashMap::new();
        for map_config in &config.maps {
            if map_index.contains_key(&map_config.id) {
                return Err(GameError::Config(format!(
                    "duplicate map id '{}'",
                    map_config.id
                )));
            }
            map_index.insert(map_config.id.clone(), maps.len());
            maps.push(Map::from_config(map_config, config.default_dog_speed)?);
        }
        Ok(Self {
            maps,
            map_index,
            sessions: BTreeMap::new(),
            dogs: Vec::new(),
            players: Vec::new(),
            tokens: BTreeMap::new(),
            loot: BTreeMap::new(),
            next_loot_id: 0,
            clock: 0.0,
            retirement_time: config.dog_retirement_time,
            default_bag_capacity: config.default_bag_capacity,
            randomize_spawn_points: config.randomize_spawn_points,
            spawn_interval_ms: config.loot_generator.period * 1_000.0,
            spawn_probability: config.loot_generator.probability,
            rng: WorldRng::new(seed),
        })
    }

    pub fn find_map(&self, id: &str) -> Option<&Map> {
        self.map_index.get(id).map(|&i| &self.maps[i])
    }

    /// (id, name) of every map, for listing queries.
    pub fn map_summaries(&self) -> Vec<(MapId, String)> {
        self.maps
            .iter()
            .map(|m| (m.id.clone(), m.name.clone()))
            .collect()
    }

    /// Join a player to a map, lazily creating the session. Returns
    /// the auth token and the player handle.
    pub fn join(&mut self, map_id: &str, name: &str) -> GameResult<(Token, PlayerHandle)> {
        if name.is_empty() {
            return Err(GameError::InvalidArgument("empty player name".into()));
        }
        let map_idx = *self
            .map_index
            .get(map_id)
            .ok_or_else(|| GameError::MapNotFound(map_id.to_string()))?;

        let bag_capacity = self.maps[map_idx]
            .bag_capacity
            .unwrap_or(self.default_bag_capacity);
        let clock = self.clock;
        let spawn_interval_ms = self.spawn_interval_ms;
        let spawn_probability = self.spawn_probability;
        self.sessions
            .entry(map_id.to_string())
            .or_insert_with(|| GameSession {
                map_id: map_id.to_string(),
                dogs: Vec::new(),
                loot: BTreeSet::new(),
                retired: 0,
                bag_capacity,
                timer: clock,
                spawner: LootSpawner::new(spawn_interval_ms, spawn_probability),
            });

        let position = self.pick_spawn_point(map_idx);
        let uuid = Uuid::from_u64_pair(self.rng.next_u64(), self.rng.next_u64());
        let dog = Dog::new(
            uuid,
            name,
            position,
            self.maps[map_idx].dog_speed,
            bag_capacity,
            clock,
        );
        let handle = self.dogs.len();
        self.dogs.push(dog);

        if let Some(session) = self.sessions.get_mut(map_id) {
            session.dogs.push(handle);
        }

        let player = self.players.len();
        self.players.push(Player {
            dog: handle,
            map_id: map_id.to_string(),
            online: true,
            score: 0,
        });

        let mut token = self.rng.token_hex();
        while self.tokens.contains_key(&token) {
            token = self.rng.token_hex();
        }
        self.tokens.insert(token.clone(), player);

        log::debug!("player {player} ('{name}') joined map '{map_id}'");
        Ok((token, player))
    }

    pub fn player_by_token(&self, token: &str) -> Option<PlayerHandle> {
        self.tokens.get(token).copied()
    }

    /// Set an online player's movement direction. Retirement is
    /// terminal: commands addressed to an offline player fail the same
    /// way as an unknown token.
    pub fn set_direction(&mut self, token: &str, direction: Direction) -> GameResult<()> {
        let player = *self.tokens.get(token).ok_or(GameError::UnknownToken)?;
        if !self.players[player].online {
            return Err(GameError::UnknownToken);
        }
        let dog = self.players[player].dog;
        self.dogs[dog].set_direction(direction);
        Ok(())
    }

    /// Run the spawn policy once per session and place any new loot.
    /// Returns ids of everything spawned this tick.
    pub fn spawn_loot(&mut self, delta_ms: u64) -> Vec<LootId> {
        let mut spawned = Vec::new();
        let session_ids: Vec<MapId> = self.sessions.keys().cloned().collect();
        for map_id in session_ids {
            let count = match self.sessions.get_mut(&map_id) {
                Some(s) => {
                    let loot_count = s.loot.len();
                    let looter_count = s.active_looters();
                    s.spawner
                        .generate(delta_ms, loot_count, looter_count, &mut self.rng)
                }
                None => continue,
            };
            if count == 0 {
                continue;
            }
            let map_idx = match self.map_index.get(&map_id) {
                Some(&i) => i,
                None => continue,
            };
            let type_count = self.maps[map_idx].loot_type_count();
            if type_count == 0 {
                continue;
            }
            for _ in 0..count {
                let kind = self.rng.next_u64_below(type_count as u64) as u32;
                let position = self.pick_spawn_point(map_idx);
                let id = self.next_loot_id;
                self.next_loot_id += 1;
                self.loot.insert(
                    id,
                    LootObject {
                        id,
                        kind,
                        position,
                        visible: true,
                    },
                );
                if let Some(session) = self.sessions.get_mut(&map_id) {
                    session.loot.insert(id);
                }
                spawned.push(id);
            }
            log::debug!("spawned {count} loot object(s) on map '{map_id}'");
        }
        spawned
    }

    /// Where new dogs and loot appear: a random road point when
    /// randomization is on, the first road's start otherwise.
    fn pick_spawn_point(&mut self, map_idx: usize) -> Point2 {
        let map = &self.maps[map_idx];
        if !self.randomize_spawn_points {
            let start = map.roads[0].start;
            return Point2::new(start.x as f64, start.y as f64);
        }
        let road = &map.roads[self.rng.next_u64_below(map.roads.len() as u64) as usize];
        let (x0, x1) = (road.start.x.min(road.end.x), road.start.x.max(road.end.x));
        let (y0, y1) = (road.start.y.min(road.end.y), road.start.y.max(road.end.y));
        let x = x0 + self.rng.next_u64_below((x1 - x0 + 1) as u64) as i64;
        let y = y0 + self.rng.next_u64_below((y1 - y0 + 1) as u64) as i64;
        Point2::new(x as f64, y as f64)
    }
}

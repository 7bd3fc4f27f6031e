//! Behavior with more than one live session: each session keeps its
//! own spawn clock, the office pass reaches offices on every map, and
//! deposit events resolve the first session whose dog count matches.

use lootworld_core::{
    config::{
        GameConfig, LootGeneratorConfig, LootTypeConfig, MapConfig, OfficeConfig, RoadConfig,
    },
    engine::GameEngine,
    geom::Point2,
    store::ConnectionPool,
    types::LootId,
    world::{Direction, LootObject, World},
};
use std::sync::Arc;

fn map(id: &str, office_x: i64, loot_value: i64) -> MapConfig {
    MapConfig {
        id: id.into(),
        name: id.into(),
        roads: vec![RoadConfig {
            x0: 0,
            y0: 0,
            x1: Some(100),
            y1: None,
        }],
        buildings: Vec::new(),
        offices: vec![OfficeConfig {
            id: format!("{id}-office"),
            x: office_x,
            y: 0,
            offset_x: 1,
            offset_y: 1,
        }],
        loot_types: vec![LootTypeConfig {
            name: None,
            value: loot_value,
        }],
        dog_speed: None,
        bag_capacity: None,
    }
}

// Two maps with distinct loot values so tests can tell which value
// table scored a deposit. "east" sorts before "west".
fn two_map_config(probability: f64) -> GameConfig {
    GameConfig {
        maps: vec![map("east", 10, 7), map("west", 40, 30)],
        loot_generator: LootGeneratorConfig {
            period: 5.0,
            probability,
        },
        default_dog_speed: 1.0,
        default_bag_capacity: 3,
        dog_retirement_time: 60.0,
        randomize_spawn_points: false,
    }
}

fn build_engine(config: &GameConfig, seed: u64) -> GameEngine {
    let world = World::new(config, seed).expect("world");
    let pool = Arc::new(ConnectionPool::in_memory(1).expect("pool"));
    GameEngine::new(world, pool)
}

fn place_loot(world: &mut World, map_id: &str, x: f64) -> LootId {
    let id = world.next_loot_id;
    world.next_loot_id += 1;
    world.loot.insert(
        id,
        LootObject {
            id,
            kind: 0,
            position: Point2::new(x, 0.0),
            visible: true,
        },
    );
    world
        .sessions
        .get_mut(map_id)
        .expect("session")
        .loot
        .insert(id);
    id
}

#[test]
fn sessions_accrue_spawn_time_independently() {
    let config = two_map_config(0.0);
    let mut world = World::new(&config, 1).expect("world");
    world.join("east", "alpha").expect("join");
    world.join("west", "beta").expect("join");

    // With probability zero nothing spawns, so the accumulators only
    // ever grow. Each session must see exactly one delta per tick,
    // not one per session in the world.
    world.spawn_loot(100);
    assert_eq!(world.sessions["east"].spawner.accrued_ms(), 100.0);
    assert_eq!(world.sessions["west"].spawner.accrued_ms(), 100.0);

    world.spawn_loot(100);
    assert_eq!(world.sessions["east"].spawner.accrued_ms(), 200.0);
    assert_eq!(world.sessions["west"].spawner.accrued_ms(), 200.0);
}

#[test]
fn deposit_with_equal_dog_counts_resolves_the_first_session() {
    let config = two_map_config(0.0);
    let mut engine = build_engine(&config, 3);
    engine.world.join("east", "alpha").expect("join");
    let (token, player) = engine.world.join("west", "beta").expect("join");
    let loot_id = place_loot(&mut engine.world, "west", 2.0);

    // Only the west dog moves; the east dog never becomes a gatherer.
    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(3_000).expect("tick");
    assert_eq!(report.pickups, vec![(player, loot_id)]);

    // Walk through west's office at (40, 0). The flattened office
    // sequence must reach it even though it sits on the second map.
    let dog = engine.world.players[player].dog;
    engine.world.dogs[dog].position = Point2::new(39.0, 0.0);
    engine.world.dogs[dog].start_position = Point2::new(39.0, 0.0);
    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(2_000).expect("tick");

    // Both sessions hold one dog, so the first dog-count match is
    // east, and east's value table prices the bag: 7, not west's 30.
    assert_eq!(report.deposits, vec![(player, 7)]);
    assert_eq!(engine.world.players[player].score, 7);
    assert!(engine.world.dogs[dog].bag.is_empty());
}

#[test]
fn deposit_matches_the_session_with_the_same_dog_count() {
    let config = two_map_config(0.0);
    let mut engine = build_engine(&config, 3);
    engine.world.join("east", "alpha").expect("join");
    engine.world.join("east", "gamma").expect("join");
    let (token, player) = engine.world.join("west", "beta").expect("join");
    let loot_id = place_loot(&mut engine.world, "west", 2.0);

    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(3_000).expect("tick");
    assert_eq!(report.pickups, vec![(player, loot_id)]);

    let dog = engine.world.players[player].dog;
    engine.world.dogs[dog].position = Point2::new(39.0, 0.0);
    engine.world.dogs[dog].start_position = Point2::new(39.0, 0.0);
    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(2_000).expect("tick");

    // East holds two dogs and no longer matches; the one-dog bucket
    // is west, so west's value table applies.
    assert_eq!(report.deposits, vec![(player, 30)]);
    assert_eq!(engine.world.players[player].score, 30);
}

//! End-to-end tick behavior of the two collision passes: loot pickup
//! into the bag, office deposit into the score, and the bag-capacity
//! refusal path.

use lootworld_core::{
    config::GameConfig,
    engine::GameEngine,
    geom::Point2,
    store::ConnectionPool,
    types::LootId,
    world::{Direction, LootObject, World},
};
use std::sync::Arc;

fn build_engine(seed: u64) -> GameEngine {
    let mut config = GameConfig::test_default();
    // These tests place loot by hand; the spawn policy stays quiet.
    config.loot_generator.probability = 0.0;
    let world = World::new(&config, seed).expect("world");
    let pool = Arc::new(ConnectionPool::in_memory(1).expect("pool"));
    GameEngine::new(world, pool)
}

fn place_loot(world: &mut World, kind: u32, x: f64, y: f64) -> LootId {
    let id = world.next_loot_id;
    world.next_loot_id += 1;
    world.loot.insert(
        id,
        LootObject {
            id,
            kind,
            position: Point2::new(x, y),
            visible: true,
        },
    );
    world
        .sessions
        .get_mut("town")
        .expect("session")
        .loot
        .insert(id);
    id
}

#[test]
fn swept_loot_lands_in_the_bag() {
    let mut engine = build_engine(3);
    let (token, player) = engine.world.join("town", "alpha").expect("join");
    let loot_id = place_loot(&mut engine.world, 0, 2.0, 0.0);

    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(3_000).expect("tick");

    assert_eq!(report.pickups, vec![(player, loot_id)]);
    let dog = engine.world.players[player].dog;
    assert_eq!(engine.world.dogs[dog].bag, vec![loot_id]);
    assert!(!engine.world.loot[&loot_id].visible);
    assert!(engine.world.sessions["town"].loot.is_empty());
}

#[test]
fn full_bag_refuses_pickup_and_leaves_loot_live() {
    let mut engine = build_engine(3);
    let (token, player) = engine.world.join("town", "alpha").expect("join");
    let first = place_loot(&mut engine.world, 0, 1.0, 0.0);
    let second = place_loot(&mut engine.world, 1, 2.0, 0.0);

    let dog = engine.world.players[player].dog;
    engine.world.dogs[dog].bag_capacity = 1;

    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(3_000).expect("tick");

    // Contact order decides: the nearer item fills the bag, the
    // further one is refused and stays exactly where it was.
    assert_eq!(report.pickups, vec![(player, first)]);
    assert_eq!(engine.world.dogs[dog].bag, vec![first]);
    assert!(engine.world.loot[&second].visible);
    assert!(engine.world.sessions["town"].loot.contains(&second));
}

#[test]
fn office_deposit_scores_and_empties_the_bag() {
    let mut engine = build_engine(3);
    let (token, player) = engine.world.join("town", "alpha").expect("join");
    let cheap = place_loot(&mut engine.world, 0, 1.0, 0.0); // value 10
    let dear = place_loot(&mut engine.world, 1, 2.0, 0.0); // value 30

    engine.world.set_direction(&token, Direction::Right).expect("command");
    engine.tick(3_000).expect("tick");

    let dog = engine.world.players[player].dog;
    assert_eq!(engine.world.dogs[dog].bag, vec![cheap, dear]);

    // Teleport next to the office at (40, 0) and walk through it.
    engine.world.dogs[dog].position = Point2::new(39.0, 0.0);
    engine.world.dogs[dog].start_position = Point2::new(39.0, 0.0);
    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(2_000).expect("tick");

    assert_eq!(report.deposits, vec![(player, 40)]);
    assert_eq!(engine.world.players[player].score, 40);
    assert!(engine.world.dogs[dog].bag.is_empty());
}

#[test]
fn empty_bag_deposit_is_a_no_op() {
    let mut engine = build_engine(3);
    let (token, player) = engine.world.join("town", "alpha").expect("join");

    let dog = engine.world.players[player].dog;
    engine.world.dogs[dog].position = Point2::new(39.0, 0.0);
    engine.world.dogs[dog].start_position = Point2::new(39.0, 0.0);
    engine.world.set_direction(&token, Direction::Right).expect("command");
    let report = engine.tick(2_000).expect("tick");

    assert!(report.deposits.is_empty());
    assert_eq!(engine.world.players[player].score, 0);
}

//! Movement resolver — advances one dog along the road network.
//!
//! Motion is axis-aligned: direction commands produce a velocity with
//! exactly one nonzero component, and only that dominant axis is
//! resolved per tick. The dog advances toward its expected position
//! but is clamped to the union of the roads covering its current
//! integer cell; a clamp zeroes the velocity ("had to stop").

use crate::{
    map::{Map, ROAD_HALF_WIDTH},
    world::Dog,
};

/// Resolve one tick of movement for `dog`. Returns true when the dog
/// hit a road boundary and was stopped.
pub fn resolve(dog: &mut Dog, map: &Map, delta_ms: u64) -> bool {
    let delta = delta_ms as f64 / 1_000.0;
    let position = dog.position;
    let cell = (position.x.round() as i64, position.y.round() as i64);
    let roads = map.roads_at(cell);

    let (vx, vy) = (dog.velocity.x, dog.velocity.y);
    let mut x = position.x;
    let mut y = position.y;
    let mut clamped = false;

    if vx > f64::EPSILON {
        let expected = position.x + vx * delta;
        let limit = roads
            .iter()
            .map(|&i| map.roads[i].start.x.max(map.roads[i].end.x) as f64 + ROAD_HALF_WIDTH)
            .fold(f64::NEG_INFINITY, f64::max);
        if roads.is_empty() {
            // Off-road: frozen in place.
        } else if expected > limit + f64::EPSILON {
            x = limit.max(position.x);
            clamped = true;
        } else {
            x = expected;
        }
    } else if vx < -f64::EPSILON {
        let expected = position.x + vx * delta;
        let limit = roads
            .iter()
            .map(|&i| map.roads[i].start.x.min(map.roads[i].end.x) as f64 - ROAD_HALF_WIDTH)
            .fold(f64::INFINITY, f64::min);
        if roads.is_empty() {
        } else if expected < limit - f64::EPSILON {
            x = limit.min(position.x);
            clamped = true;
        } else {
            x = expected;
        }
    } else if vy > f64::EPSILON {
        let expected = position.y + vy * delta;
        let limit = roads
            .iter()
            .map(|&i| map.roads[i].start.y.max(map.roads[i].end.y) as f64 + ROAD_HALF_WIDTH)
            .fold(f64::NEG_INFINITY, f64::max);
        if roads.is_empty() {
        } else if expected > limit + f64::EPSILON {
            y = limit.max(position.y);
            clamped = true;
        } else {
            y = expected;
        }
    } else if vy < -f64::EPSILON {
        let expected = position.y + vy * delta;
        let limit = roads
            .iter()
            .map(|&i| map.roads[i].start.y.min(map.roads[i].end.y) as f64 - ROAD_HALF_WIDTH)
            .fold(f64::INFINITY, f64::min);
        if roads.is_empty() {
        } else if expected < limit - f64::EPSILON {
            y = limit.min(position.y);
            clamped = true;
        } else {
            y = expected;
        }
    }
    // Both components near zero: stationary, nothing to resolve.

    if clamped {
        dog.stop();
    }
    // Always recorded, even when stationary: this rolls the gather
    // segment forward so start == end for dogs that did not move.
    dog.set_position(x, y);
    clamped
}

//! Collision engine — sweeps dog movement segments against target
//! sets and reports gather events in time-of-contact order.
//!
//! Two target sources exist: live visible loot (pass A) and offices
//! across all maps (pass B). Both satisfy the same `TargetSource`
//! contract; the detection algorithm does not care which it is given.

use crate::{
    geom::{project_point, Point2},
    map::Map,
    types::LootId,
    world::{LootObject, World},
};

/// Sweep radius of a moving dog.
pub const GATHERER_WIDTH: f64 = 0.6;
/// Loot objects are collected on centre contact.
pub const LOOT_WIDTH: f64 = 0.0;
/// Capture radius of a return-zone.
pub const OFFICE_WIDTH: f64 = 0.5;

/// Events closer than this along the path are considered simultaneous
/// and keep their discovery order.
const SORT_EPSILON: f64 = 1e-5;

/// A dog's movement segment for one tick.
#[derive(Debug, Clone, Copy)]
pub struct Gatherer {
    pub start: Point2,
    pub end: Point2,
    pub width: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub position: Point2,
    pub width: f64,
}

/// An indexable set of stationary targets for one detection pass.
pub trait TargetSource {
    fn count(&self) -> usize;
    fn target(&self, idx: usize) -> Target;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatherEvent {
    pub target: usize,
    pub gatherer: usize,
    pub sq_distance: f64,
    /// Projection ratio along the gatherer's path — the time of
    /// contact, with 0 at the segment start and 1 at the end.
    pub ratio: f64,
}

/// All live, visible loot across the whole world, in id order.
pub struct LootSource {
    items: Vec<(LootId, Point2)>,
}

impl LootSource {
    pub fn new(world: &World) -> Self {
        Self {
            items: world
                .loot
                .values()
                .filter(|l| l.visible)
                .map(|l: &LootObject| (l.id, l.position))
                .collect(),
        }
    }

    pub fn loot_id(&self, idx: usize) -> LootId {
        self.items[idx].0
    }
}

impl TargetSource for LootSource {
    fn count(&self) -> usize {
        self.items.len()
    }

    fn target(&self, idx: usize) -> Target {
        Target {
            position: self.items[idx].1,
            width: LOOT_WIDTH,
        }
    }
}

/// Every office on every map, flattened into one indexable sequence.
pub struct OfficeSource {
    positions: Vec<Point2>,
}

impl OfficeSource {
    pub fn new(maps: &[Map]) -> Self {
        Self {
            positions: maps
                .iter()
                .flat_map(|m| m.offices.iter())
                .map(|o| Point2::new(o.position.x as f64, o.position.y as f64))
                .collect(),
        }
    }
}

impl TargetSource for OfficeSource {
    fn count(&self) -> usize {
        self.positions.len()
    }

    /// `idx` must come from `count()`; anything else is a programming
    /// error and panics.
    fn target(&self, idx: usize) -> Target {
        Target {
            position: self.positions[idx],
            width: OFFICE_WIDTH,
        }
    }
}

/// Test every moving gatherer against every target and return the hits
/// ordered by time of contact. Gatherers that did not move this tick
/// (start == end) cannot gather and are skipped.
pub fn find_gather_events(
    gatherers: &[Gatherer],
    source: &impl TargetSource,
) -> Vec<GatherEvent> {
    let mut events = Vec::new();

    for (g, gatherer) in gatherers.iter().enumerate() {
        if gatherer.start == gatherer.end {
            continue;
        }
        for i in 0..source.count() {
            let target = source.target(i);
            let projection = project_point(gatherer.start, gatherer.end, target.position);
            if projection.is_hit(gatherer.width + target.width) {
                events.push(GatherEvent {
                    target: i,
                    gatherer: g,
                    sq_distance: projection.sq_distance,
                    ratio: projection.ratio,
                });
            }
        }
    }

    // Stable sort: ties within SORT_EPSILON keep discovery order.
    events.sort_by(|left, right| {
        if left.ratio < right.ratio - SORT_EPSILON {
            std::cmp::Ordering::Less
        } else if right.ratio < left.ratio - SORT_EPSILON {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    });

    events
}

//! Collision ordering semantics: events come back sorted by time of
//! contact along the path, near-simultaneous events keep discovery
//! order, and a gatherer that did not move gathers nothing.

use lootworld_core::{
    collision::{find_gather_events, Gatherer, OfficeSource, Target, TargetSource},
    config::GameConfig,
    geom::Point2,
    map::Map,
};

struct FixedTargets(Vec<Target>);

impl TargetSource for FixedTargets {
    fn count(&self) -> usize {
        self.0.len()
    }

    fn target(&self, idx: usize) -> Target {
        self.0[idx]
    }
}

fn target(x: f64, y: f64) -> Target {
    Target {
        position: Point2::new(x, y),
        width: 0.0,
    }
}

#[test]
fn events_sorted_by_contact_time() {
    // One dog sweeping up a vertical segment past two items. The item
    // further along the path was listed first; the sort must reorder.
    let gatherers = [Gatherer {
        start: Point2::new(0.0, 0.0),
        end: Point2::new(0.0, 1.5),
        width: 0.6,
    }];
    let targets = FixedTargets(vec![target(0.0, 1.5), target(0.19, 1.0)]);

    let events = find_gather_events(&gatherers, &targets);
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].target, 1);
    assert!((events[0].ratio - 1.0 / 1.5).abs() < 1e-9);
    assert!((events[0].sq_distance - 0.0361).abs() < 1e-9);

    assert_eq!(events[1].target, 0);
    assert!((events[1].ratio - 1.0).abs() < 1e-9);
}

#[test]
fn miss_when_lateral_distance_exceeds_width() {
    let gatherers = [Gatherer {
        start: Point2::new(0.0, 0.0),
        end: Point2::new(0.0, 1.5),
        width: 0.6,
    }];
    // 0.7 off the line: beyond the 0.6 sweep radius.
    let targets = FixedTargets(vec![target(0.7, 1.0)]);

    assert!(find_gather_events(&gatherers, &targets).is_empty());
}

#[test]
fn miss_when_projection_falls_outside_segment() {
    let gatherers = [Gatherer {
        start: Point2::new(0.0, 0.0),
        end: Point2::new(1.0, 0.0),
        width: 0.6,
    }];
    // On the line but past the segment end.
    let targets = FixedTargets(vec![target(2.0, 0.0)]);

    assert!(find_gather_events(&gatherers, &targets).is_empty());
}

#[test]
fn stationary_gatherer_collects_nothing() {
    let gatherers = [Gatherer {
        start: Point2::new(3.0, 3.0),
        end: Point2::new(3.0, 3.0),
        width: 0.6,
    }];
    // Sitting directly on a target still does not collect it.
    let targets = FixedTargets(vec![target(3.0, 3.0)]);

    assert!(find_gather_events(&gatherers, &targets).is_empty());
}

#[test]
fn office_source_covers_every_office_exactly() {
    let config = GameConfig::test_default();
    let maps = vec![Map::from_config(&config.maps[0], config.default_dog_speed).expect("map")];
    let source = OfficeSource::new(&maps);

    assert_eq!(source.count(), 1);
    let target = source.target(0);
    assert_eq!(target.position, Point2::new(40.0, 0.0));
}

#[test]
#[should_panic]
fn office_source_rejects_out_of_range_index() {
    let config = GameConfig::test_default();
    let maps = vec![Map::from_config(&config.maps[0], config.default_dog_speed).expect("map")];
    let source = OfficeSource::new(&maps);

    source.target(source.count());
}

#[test]
fn near_simultaneous_events_keep_discovery_order() {
    let gatherers = [Gatherer {
        start: Point2::new(0.0, 0.0),
        end: Point2::new(0.0, 2.0),
        width: 0.6,
    }];
    // Same contact time to within the sort tolerance; target order is
    // the tiebreak.
    let targets = FixedTargets(vec![
        target(0.1, 1.0),
        target(-0.1, 1.000001),
    ]);

    let events = find_gather_events(&gatherers, &targets);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].target, 0);
    assert_eq!(events[1].target, 1);
}

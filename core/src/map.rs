//! Static map templates — roads, buildings, offices and the per-cell
//! road index.
//!
//! A `Map` is built once from its config at load time and never
//! mutated afterwards. The road index is derived data: every integer
//! cell a road passes through maps to the indices of the roads
//! covering it, which is what the movement resolver consults each
//! tick.

use crate::{
    config::MapConfig,
    error::{GameError, GameResult},
    types::MapId,
};
use std::collections::HashMap;

/// Lateral clearance either side of a road's centre line.
pub const ROAD_HALF_WIDTH: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Road {
    pub start: GridPoint,
    pub end: GridPoint,
}

impl Road {
    pub fn horizontal(start: GridPoint, end_x: i64) -> Self {
        Self {
            start,
            end: GridPoint {
                x: end_x,
                y: start.y,
            },
        }
    }

    pub fn vertical(start: GridPoint, end_y: i64) -> Self {
        Self {
            start,
            end: GridPoint {
                x: start.x,
                y: end_y,
            },
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Every integer cell this road covers.
    fn cells(&self) -> Vec<(i64, i64)> {
        if self.is_horizontal() {
            let (lo, hi) = ordered(self.start.x, self.end.x);
            (lo..=hi).map(|x| (x, self.start.y)).collect()
        } else {
            let (lo, hi) = ordered(self.start.y, self.end.y);
            (lo..=hi).map(|y| (self.start.x, y)).collect()
        }
    }
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Building {
    pub position: GridPoint,
    pub width: i64,
    pub height: i64,
}

/// A return-zone: carried loot is converted to score here.
#[derive(Debug, Clone)]
pub struct Office {
    pub id: String,
    pub position: GridPoint,
    pub offset: (i64, i64),
}

#[derive(Debug)]
pub struct Map {
    pub id: MapId,
    pub name: String,
    pub roads: Vec<Road>,
    pub buildings: Vec<Building>,
    pub offices: Vec<Office>,
    /// Values awarded per loot type index when deposited at an office.
    pub loot_values: Vec<i64>,
    pub dog_speed: f64,
    pub bag_capacity: Option<u32>,
    road_index: HashMap<(i64, i64), Vec<usize>>,
}

impl Map {
    pub fn from_config(config: &MapConfig, default_dog_speed: f64) -> GameResult<Self> {
        let mut roads = Vec::with_capacity(config.roads.len());
        for (i, road) in config.roads.iter().enumerate() {
            let start = GridPoint {
                x: road.x0,
                y: road.y0,
            };
            let road = match (road.x1, road.y1) {
                (Some(x1), None) => Road::horizontal(start, x1),
                (None, Some(y1)) => Road::vertical(start, y1),
                _ => {
                    return Err(GameError::Config(format!(
                        "map '{}' road {i}: exactly one of x1/y1 must be set",
                        config.id
                    )))
                }
            };
            roads.push(road);
        }

        let mut road_index: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (idx, road) in roads.iter().enumerate() {
            for cell in road.cells() {
                road_index.entry(cell).or_default().push(idx);
            }
        }

        let mut offices = Vec::with_capacity(config.offices.len());
        for office in &config.offices {
            if offices.iter().any(|o: &Office| o.id == office.id) {
                return Err(GameError::Config(format!(
                    "map '{}': duplicate office '{}'",
                    config.id, office.id
                )));
            }
            offices.push(Office {
                id: office.id.clone(),
                position: GridPoint {
                    x: office.x,
                    y: office.y,
                },
                offset: (office.offset_x, office.offset_y),
            });
        }

        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone(),
            roads,
            buildings: config
                .buildings
                .iter()
                .map(|b| Building {
                    position: GridPoint { x: b.x, y: b.y },
                    width: b.w,
                    height: b.h,
                })
                .collect(),
            offices,
            loot_values: config.loot_types.iter().map(|t| t.value).collect(),
            dog_speed: config.dog_speed.unwrap_or(default_dog_speed),
            bag_capacity: config.bag_capacity,
            road_index,
        })
    }

    /// Indices of the roads covering an integer cell. Empty slice when
    /// the cell is off-road.
    pub fn roads_at(&self, cell: (i64, i64)) -> &[usize] {
        self.road_index.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn loot_type_count(&self) -> usize {
        self.loot_values.len()
    }

    /// Value of a loot type; unknown indices score nothing.
    pub fn loot_value(&self, type_index: u32) -> i64 {
        self.loot_values
            .get(type_index as usize)
            .copied()
            .unwrap_or(0)
    }
}

//! Game configuration — the JSON world description consumed at startup.
//!
//! The shape mirrors the deployed map files: a list of maps, each with
//! roads, buildings, offices and loot types, plus global defaults.
//! Malformed or missing fields fail at load time; the world cannot
//! start from a broken config.

use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadConfig {
    pub x0: i64,
    pub y0: i64,
    #[serde(default)]
    pub x1: Option<i64>,
    #[serde(default)]
    pub y1: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingConfig {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeConfig {
    pub id: String,
    pub x: i64,
    pub y: i64,
    #[serde(rename = "offsetX")]
    pub offset_x: i64,
    #[serde(rename = "offsetY")]
    pub offset_y: i64,
}

/// One loot type. Only `value` matters to the core; the remaining
/// fields (sprite, colour, ...) belong to the client and are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootTypeConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub id: String,
    pub name: String,
    pub roads: Vec<RoadConfig>,
    #[serde(default)]
    pub buildings: Vec<BuildingConfig>,
    #[serde(default)]
    pub offices: Vec<OfficeConfig>,
    #[serde(rename = "lootTypes")]
    pub loot_types: Vec<LootTypeConfig>,
    #[serde(rename = "dogSpeed", default)]
    pub dog_speed: Option<f64>,
    #[serde(rename = "bagCapacity", default)]
    pub bag_capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootGeneratorConfig {
    /// Base spawn interval, in seconds.
    pub period: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub maps: Vec<MapConfig>,
    #[serde(rename = "lootGeneratorConfig")]
    pub loot_generator: LootGeneratorConfig,
    #[serde(rename = "defaultDogSpeed", default = "default_dog_speed")]
    pub default_dog_speed: f64,
    #[serde(rename = "defaultBagCapacity", default = "default_bag_capacity")]
    pub default_bag_capacity: u32,
    /// Idle-time threshold after which an agent retires, in seconds.
    #[serde(rename = "dogRetirementTime", default = "default_retirement_time")]
    pub dog_retirement_time: f64,
    /// When set, new dogs and loot spawn at random road points instead
    /// of the first road's start. Not part of the JSON file; toggled by
    /// the host process.
    #[serde(skip)]
    pub randomize_spawn_points: bool,
}

fn default_dog_speed() -> f64 {
    1.0
}

fn default_bag_capacity() -> u32 {
    3
}

fn default_retirement_time() -> f64 {
    60.0
}

impl GameConfig {
    /// Load and validate a config file. Any structural problem is
    /// unrecoverable and surfaces here, before the world exists.
    pub fn load(path: &str) -> GameResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GameError::Config(format!("cannot read {path}: {e}")))?;
        let config: GameConfig = serde_json::from_str(&content)
            .map_err(|e| GameError::Config(format!("cannot parse {path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.maps.is_empty() {
            return Err(GameError::Config("no maps defined".into()));
        }
        for map in &self.maps {
            if map.roads.is_empty() {
                return Err(GameError::Config(format!("map '{}' has no roads", map.id)));
            }
            for (i, road) in map.roads.iter().enumerate() {
                if road.x1.is_some() == road.y1.is_some() {
                    return Err(GameError::Config(format!(
                        "map '{}' road {i}: exactly one of x1/y1 must be set",
                        map.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// A small two-road, one-office world. In tests, use this instead
    /// of `load()`.
    pub fn test_default() -> Self {
        Self {
            maps: vec![MapConfig {
                id: "town".into(),
                name: "Town".into(),
                roads: vec![
                    RoadConfig {
                        x0: 0,
                        y0: 0,
                        x1: Some(100),
                        y1: None,
                    },
                    RoadConfig {
                        x0: 0,
                        y0: 0,
                        x1: None,
                        y1: Some(50),
                    },
                ],
                buildings: vec![BuildingConfig {
                    x: 5,
                    y: 5,
                    w: 4,
                    h: 4,
                }],
                offices: vec![OfficeConfig {
                    id: "o0".into(),
                    x: 40,
                    y: 0,
                    offset_x: 1,
                    offset_y: 1,
                }],
                loot_types: vec![
                    LootTypeConfig {
                        name: Some("key".into()),
                        value: 10,
                    },
                    LootTypeConfig {
                        name: Some("wallet".into()),
                        value: 30,
                    },
                ],
                dog_speed: None,
                bag_capacity: None,
            }],
            loot_generator: LootGeneratorConfig {
                period: 5.0,
                probability: 0.5,
            },
            default_dog_speed: 1.0,
            default_bag_capacity: 3,
            dog_retirement_time: 60.0,
            randomize_spawn_points: false,
        }
    }
}

//! world-runner: headless driver for the loot-world simulation core.
//!
//! Usage:
//!   world-runner --config data/config.json --seed 12345 --ticks 2000
//!   world-runner --seed 12345 --ticks 2000 --db run.db --players 8
//!   world-runner --tick-period 50 --save-file world.save --save-period 5000
//!   world-runner --ticks 500 --json
//!
//! With `--tick-period 0` (the default) the run is as-fast-as-possible
//! with a fixed 50 ms virtual delta per tick. A positive period runs in
//! real time and feeds measured wall-clock deltas into the engine.

use anyhow::Result;
use lootworld_core::{
    config::GameConfig,
    engine::GameEngine,
    snapshot,
    store::ConnectionPool,
    world::{Direction, World},
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const VIRTUAL_DELTA_MS: u64 = 50;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 2_000u64);
    let tick_period = parse_arg(&args, "--tick-period", 0u64);
    let players = parse_arg(&args, "--players", 4usize);
    let save_period = parse_arg(&args, "--save-period", 0u64);
    let db = str_arg(&args, "--db");
    let config_path = str_arg(&args, "--config");
    let save_file = str_arg(&args, "--save-file").map(PathBuf::from);
    let json_output = args.iter().any(|a| a == "--json");

    if !json_output {
        println!("loot world — world-runner");
        println!("  seed:        {seed}");
        println!("  ticks:       {ticks}");
        println!("  tick period: {tick_period} ms");
        println!("  players:     {players}");
        println!("  db:          {}", db.as_deref().unwrap_or(":memory:"));
        println!("  started:     {}", chrono::Utc::now().to_rfc3339());
        println!();
    }

    let config = match &config_path {
        Some(path) => GameConfig::load(path)?,
        None => {
            log::warn!("no --config given, using the built-in demo world");
            GameConfig::test_default()
        }
    };

    let pool = Arc::new(match &db {
        Some(path) => ConnectionPool::open(path, 2)?,
        None => ConnectionPool::in_memory(2)?,
    });

    let world = match &save_file {
        Some(path) => match snapshot::load(path)? {
            Some(snap) => {
                log::info!("restoring world from {}", path.display());
                snapshot::restore(&config, seed, &snap)?
            }
            None => World::new(&config, seed)?,
        },
        None => World::new(&config, seed)?,
    };

    let mut engine = GameEngine::new(world, pool);
    if let Some(path) = save_file.clone() {
        if save_period > 0 {
            engine = engine.with_autosave(path, save_period);
        }
    }

    // Synthetic players spread round-robin across the maps.
    let map_ids: Vec<String> = engine
        .world
        .map_summaries()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    let mut tokens = Vec::with_capacity(players);
    for i in 0..players {
        let map_id = &map_ids[i % map_ids.len()];
        let (token, _) = engine.world.join(map_id, &format!("dog-{i}"))?;
        tokens.push(token);
    }

    let mut totals = RunTotals::default();
    let mut last = chrono::Utc::now();
    for t in 0..ticks {
        // Deterministic direction churn: every 20th tick each player
        // turns, cycling through the four directions.
        if t % 20 == 0 {
            for (i, token) in tokens.iter().enumerate() {
                let dir = match (t / 20 + i as u64) % 4 {
                    0 => Direction::Right,
                    1 => Direction::Down,
                    2 => Direction::Left,
                    _ => Direction::Up,
                };
                // Retired players reject commands; that is expected.
                let _ = engine.world.set_direction(token, dir);
            }
        }

        let delta_ms = if tick_period > 0 {
            std::thread::sleep(std::time::Duration::from_millis(tick_period));
            let now = chrono::Utc::now();
            let delta = (now - last).num_milliseconds().max(0) as u64;
            last = now;
            delta
        } else {
            VIRTUAL_DELTA_MS
        };

        let report = engine.tick(delta_ms)?;
        totals.spawned += report.spawned.len();
        totals.pickups += report.pickups.len();
        totals.deposits += report.deposits.len();
        totals.retired += report.retired.len();
    }

    if let Some(path) = &save_file {
        snapshot::save(path, &snapshot::capture(&engine.world))?;
    }

    if json_output {
        let leaderboard = engine
            .leaderboard(0, 10)?
            .into_iter()
            .map(|r| LeaderboardRow {
                name: r.name,
                score: r.score,
                play_time_ms: r.play_time_ms,
            })
            .collect();
        let summary = RunSummary {
            seed,
            ticks,
            clock: engine.world.clock,
            spawned: totals.spawned,
            pickups: totals.pickups,
            deposits: totals.deposits,
            retired: totals.retired,
            leaderboard,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&engine, &totals)?;
    }
    Ok(())
}

#[derive(Default)]
struct RunTotals {
    spawned: usize,
    pickups: usize,
    deposits: usize,
    retired: usize,
}

#[derive(serde::Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    clock: f64,
    spawned: usize,
    pickups: usize,
    deposits: usize,
    retired: usize,
    leaderboard: Vec<LeaderboardRow>,
}

#[derive(serde::Serialize)]
struct LeaderboardRow {
    name: String,
    score: i64,
    play_time_ms: f64,
}

fn print_summary(engine: &GameEngine, totals: &RunTotals) -> Result<()> {
    println!("=== RUN SUMMARY ===");
    println!("  world clock:   {:.1}s", engine.world.clock);
    println!("  loot spawned:  {}", totals.spawned);
    println!("  pickups:       {}", totals.pickups);
    println!("  deposits:      {}", totals.deposits);
    println!("  retired:       {}", totals.retired);

    println!();
    println!("=== LEADERBOARD (top 10) ===");
    let records = engine.leaderboard(0, 10)?;
    if records.is_empty() {
        println!("  (no retired players yet)");
    } else {
        for (rank, r) in records.iter().enumerate() {
            println!(
                "  {:>2}. {:<16} score {:>6}  played {:.1}s",
                rank + 1,
                r.name,
                r.score,
                r.play_time_ms / 1_000.0
            );
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}

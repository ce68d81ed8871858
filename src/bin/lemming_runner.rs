//! Headless Lemming Runner
//!
//! Runs a level without any player, assigning random skills on a seeded
//! schedule, and prints a JSON summary.

use clap::Parser;
use lemming_sim::core::error::Result;
use lemming_sim::core::types::Direction;
use lemming_sim::core::SimulationConfig;
use lemming_sim::lemming::{LemmingType, Resources};
use lemming_sim::level::{Level, LevelConfig, LevelLayout, Material, ObjectKind, ObjectPlacement, TerrainPlacement, TriggerMode};
use lemming_sim::simulation::{Simulation, SimulationStats};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Headless Lemming Runner - seeded runs without a player
#[derive(Parser, Debug)]
#[command(name = "lemming_runner")]
#[command(about = "Run a lemming level headless and print a summary")]
struct Args {
    /// Level layout (TOML); a random level is generated when omitted
    #[arg(long)]
    level: Option<PathBuf>,

    /// Resource directory with a resources.toml manifest; builtin shapes
    /// are used when omitted
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Simulation config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of lemmings released
    #[arg(long, default_value_t = 20)]
    lemmings: u32,

    /// Ticks between two releases
    #[arg(long, default_value_t = 30)]
    release_interval: u64,

    /// Ticks between two random skill assignments (0 disables them)
    #[arg(long, default_value_t = 45)]
    skill_interval: u64,

    /// Nuke all remaining lemmings at this tick
    #[arg(long)]
    nuke_at: Option<u64>,

    /// Maximum ticks before the run is cut off
    #[arg(long, default_value_t = 6000)]
    max_ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    level: String,
    seed: u64,
    ticks: u64,
    remaining: usize,
    skills_assigned: u32,
    stats: SimulationStats,
}

const SPAWN_X: i32 = 40;
const SPAWN_Y: i32 = 20;

const ASSIGNABLE: [LemmingType; 8] = [
    LemmingType::Climber,
    LemmingType::Floater,
    LemmingType::Bomber,
    LemmingType::Stopper,
    LemmingType::Builder,
    LemmingType::Basher,
    LemmingType::Miner,
    LemmingType::Digger,
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lemming_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let level = match &args.level {
        Some(path) => Level::load(path, config.minimap_scale)?,
        None => Level::from_layout(&generate_layout(&mut rng), config.minimap_scale)?,
    };
    let resources = match &args.resources {
        Some(dir) => Resources::load(dir)?,
        None => Resources::builtin(),
    };

    let level_name = level.config().name.clone();
    let mut sim = Simulation::new(level, Arc::new(resources), config)?;
    let mut released = 0;
    let mut skills_assigned = 0;

    while sim.current_tick() < args.max_ticks {
        let tick = sim.current_tick();
        if released < args.lemmings && tick % args.release_interval.max(1) == 0 {
            sim.spawn(SPAWN_X, SPAWN_Y, Direction::Right);
            released += 1;
        }

        if args.skill_interval > 0 && tick > 0 && tick % args.skill_interval == 0 && !sim.is_finished() {
            let index = rng.gen_range(0..sim.lemmings().len());
            let skill = ASSIGNABLE[rng.gen_range(0..ASSIGNABLE.len())];
            if sim.assign_skill(index, skill) {
                skills_assigned += 1;
            }
        }

        if args.nuke_at == Some(tick) {
            sim.nuke();
        }

        sim.tick();
        if released == args.lemmings && sim.is_finished() {
            break;
        }
    }

    let summary = RunSummary {
        level: level_name,
        seed,
        ticks: sim.current_tick(),
        remaining: sim.lemmings().len(),
        skills_assigned,
        stats: sim.stats().clone(),
    };

    if args.format == "text" {
        println!("Level: {}", summary.level);
        println!("Seed: {}", summary.seed);
        println!("Ticks: {}", summary.ticks);
        println!(
            "Released: {}  Saved: {}  Lost: {}  Remaining: {}",
            summary.stats.spawned, summary.stats.saved, summary.stats.lost, summary.remaining
        );
        println!("Skills assigned: {}  Explosions: {}", summary.skills_assigned, summary.stats.explosions);
    } else {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize summary: {}", e),
        }
    }
    Ok(())
}

/// Random rolling terrain with a steel block, a water trap and an exit
fn generate_layout(rng: &mut ChaCha8Rng) -> LevelLayout {
    let (width, height) = (640u32, 200u32);
    let base = 150;
    let mut terrain = vec![TerrainPlacement {
        x: 0,
        y: base,
        w: width,
        h: height - base as u32,
        material: Material::Brick,
        color: [150, 90, 40, 255],
    }];

    // Hills
    for _ in 0..rng.gen_range(3..7) {
        let w = rng.gen_range(20..80);
        let h = rng.gen_range(4..30);
        terrain.push(TerrainPlacement {
            x: rng.gen_range(80..width as i32 - 120),
            y: base - h as i32,
            w,
            h,
            material: Material::Brick,
            color: [130, 80, 30, 255],
        });
    }

    // One steel pillar somewhere in the middle
    terrain.push(TerrainPlacement {
        x: rng.gen_range(200..400),
        y: base - 24,
        w: 8,
        h: 24,
        material: Material::Steel,
        color: [110, 110, 120, 255],
    });

    let pit = rng.gen_range(420..520);
    let objects = vec![
        ObjectPlacement {
            kind: ObjectKind::TrapDrown,
            x: pit,
            y: base - 4,
            w: 16,
            h: 10,
            trigger: TriggerMode::Continuous,
            sound: None,
        },
        ObjectPlacement {
            kind: ObjectKind::Exit,
            x: width as i32 - 40,
            y: base - 20,
            w: 12,
            h: 20,
            trigger: TriggerMode::Continuous,
            sound: None,
        },
    ];

    LevelLayout {
        width,
        height,
        config: LevelConfig {
            name: format!("Generated {}", rng.gen_range(1000..10000)),
            ..LevelConfig::default()
        },
        terrain,
        objects,
    }
}

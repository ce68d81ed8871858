//! Level and config loading integration tests
//!
//! Runs agents on the bundled `just_dig` level with the bundled config.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lemming_sim::core::{Direction, SimulationConfig, Sound};
use lemming_sim::lemming::{Lemming, LemmingType, Resources};
use lemming_sim::level::{Level, ObjectKind};
use lemming_sim::simulation::{SimContext, SimEvent, Simulation};
use lemming_sim::terrain::StencilCell;

fn data_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(relative)
}

fn bundled_config() -> SimulationConfig {
    SimulationConfig::load(&data_path("config/simulation.toml")).unwrap()
}

fn bundled_level(config: &SimulationConfig) -> Level {
    Level::load(&data_path("levels/just_dig.toml"), config.minimap_scale).unwrap()
}

fn cell(level: &Level, x: i32, y: i32) -> StencilCell {
    level.stencil().get_xy(x, y).unwrap()
}

#[test]
fn test_bundled_config_loads() {
    let config = bundled_config();
    assert_eq!(config.ticks_per_second, 33);
    assert_eq!(config.explosion_unit_ticks(), 6);
    assert!(config.validate().is_ok());
}

#[test]
fn test_bundled_level_layout() {
    let level = bundled_level(&bundled_config());

    assert_eq!((level.width(), level.height()), (320, 160));
    assert_eq!(level.config().name, "Just dig!");
    assert_eq!(level.max_fall_distance(), 126);

    assert!(cell(&level, 10, 60).is_solid());
    assert!(cell(&level, 90, 70).contains(StencilCell::STEEL));
    assert!(!cell(&level, 10, 70).is_solid());
    assert!(cell(&level, 185, 110).contains(StencilCell::BRICK | StencilCell::NO_DIG_LEFT));
    assert!(cell(&level, 230, 110).contains(StencilCell::TRAP_DROWN));
    assert!(cell(&level, 300, 110).contains(StencilCell::EXIT));

    let kinds: Vec<ObjectKind> = level.objects().iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![ObjectKind::NoDigLeft, ObjectKind::TrapDrown, ObjectKind::TrapDie, ObjectKind::Exit]
    );
    assert!(level.objects()[2].can_be_triggered());
    assert_eq!(cell(&level, 262, 110).object_id(), Some(level.objects()[2].id));
}

#[test]
fn test_missing_level_file_is_an_error() {
    let result = Level::load(&data_path("levels/no_such_level.toml"), 16);
    assert!(result.is_err());
}

#[test]
fn test_one_way_wall_resists_left_basher() {
    let config = bundled_config();
    let level = bundled_level(&config);
    let mut ctx = SimContext::new(level, Arc::new(Resources::builtin()), config);
    let mut lem = Lemming::new(210, 120, Direction::Left, Arc::clone(&ctx.resources)).with_type(LemmingType::Walker);
    assert!(lem.set_skill(LemmingType::Basher, &mut ctx));

    for _ in 0..200 {
        lem.update(&mut ctx);
        if lem.current_type() != LemmingType::Basher {
            break;
        }
    }

    assert_eq!(lem.current_type(), LemmingType::Walker);
    assert!(ctx.events().contains(&SimEvent::Sound(Sound::Steel)));
    for x in 180..192 {
        for y in 96..120 {
            assert!(cell(&ctx.level, x, y).is_solid(), "({}, {}) was dug", x, y);
        }
    }
}

#[test]
fn test_basher_opens_wall_and_lemming_drowns() {
    let config = bundled_config();
    let level = bundled_level(&config);
    let mut sim = Simulation::new(level, Arc::new(Resources::builtin()), config).unwrap();
    let resources = Arc::clone(&sim.context().resources);
    sim.add(Lemming::new(160, 120, Direction::Right, resources).with_type(LemmingType::Walker));
    assert!(sim.assign_skill(0, LemmingType::Basher));

    sim.run(1000);

    assert!(sim.is_finished());
    assert_eq!(sim.stats().spawned, 1);
    assert_eq!(sim.stats().lost, 1);
    assert_eq!(sim.stats().saved, 0);
    assert_eq!(sim.stats().sounds.get(&Sound::Drown), Some(&1));
    assert_eq!(sim.stats().sounds.get(&Sound::Steel), None);

    // Tunnel under the remaining top of the wall
    assert!(!cell(sim.level(), 185, 110).is_solid());
    assert!(cell(sim.level(), 185, 98).is_solid());
}

#[test]
fn test_released_lemmings_survive_platform_drop() {
    let config = bundled_config();
    let level = bundled_level(&config);
    let mut sim = Simulation::new(level, Arc::new(Resources::builtin()), config).unwrap();
    for x in [20, 40, 60] {
        sim.spawn(x, 40, Direction::Right);
    }

    for _ in 0..150 {
        sim.tick();
    }

    assert_eq!(sim.lemmings().len(), 3);
    for lem in sim.lemmings() {
        assert_eq!(lem.current_type(), LemmingType::Walker);
        assert_eq!(lem.foot_y(), 120);
    }
    assert_eq!(sim.stats().lost, 0);
}

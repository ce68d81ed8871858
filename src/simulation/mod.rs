//! Simulation context and tick driver
//!
//! The context owns the level and shared resources and collects the side
//! effects agents ask for (sounds, explosions, bookkeeping) as events. The
//! driver in [`tick`] owns the context and the live agents.

pub mod tick;

pub use tick::{Simulation, SimulationStats};

use serde::Serialize;
use std::sync::Arc;

use crate::core::config::SimulationConfig;
use crate::core::types::Sound;
use crate::lemming::Resources;
use crate::level::Level;

/// Side effects requested during a tick, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimEvent {
    Sound(Sound),
    Explosion { x: i32, y: i32 },
    Exited,
    Died,
}

/// Everything an agent may read or mutate while updating
#[derive(Debug)]
pub struct SimContext {
    pub level: Level,
    pub resources: Arc<Resources>,
    pub config: SimulationConfig,
    events: Vec<SimEvent>,
    exit_count: u32,
}

impl SimContext {
    pub fn new(level: Level, resources: Arc<Resources>, config: SimulationConfig) -> Self {
        Self {
            level,
            resources,
            config,
            events: Vec::new(),
            exit_count: 0,
        }
    }

    pub fn play(&mut self, sound: Sound) {
        self.events.push(SimEvent::Sound(sound));
    }

    pub fn spawn_explosion(&mut self, x: i32, y: i32) {
        self.events.push(SimEvent::Explosion { x, y });
    }

    pub fn increment_exit_count(&mut self) {
        self.exit_count += 1;
    }

    pub fn exit_count(&self) -> u32 {
        self.exit_count
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Events not yet drained
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelConfig;

    #[test]
    fn test_events_drain_in_order() {
        let level = Level::new(16, 16, LevelConfig::default(), 16);
        let mut ctx = SimContext::new(level, Arc::new(Resources::builtin()), SimulationConfig::default());
        ctx.play(Sound::Ting);
        ctx.spawn_explosion(3, 4);
        ctx.emit(SimEvent::Died);

        let events = ctx.drain_events();
        assert_eq!(
            events,
            vec![SimEvent::Sound(Sound::Ting), SimEvent::Explosion { x: 3, y: 4 }, SimEvent::Died]
        );
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_exit_count() {
        let level = Level::new(16, 16, LevelConfig::default(), 16);
        let mut ctx = SimContext::new(level, Arc::new(Resources::builtin()), SimulationConfig::default());
        ctx.increment_exit_count();
        ctx.increment_exit_count();
        assert_eq!(ctx.exit_count(), 2);
    }
}

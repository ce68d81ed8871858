//! Tick driver - advances every live agent once per tick
//!
//! Agents update in spawn order. After all agents ran, trap cooldowns tick,
//! events are tallied and agents that died or exited are removed.

use ahash::AHashMap;
use serde::Serialize;
use std::sync::Arc;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{Direction, Sound, Tick};
use crate::lemming::{Lemming, LemmingType, Resources};
use crate::level::Level;
use crate::simulation::{SimContext, SimEvent};

/// Running totals over the whole simulation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationStats {
    pub spawned: u32,
    pub saved: u32,
    pub lost: u32,
    pub explosions: u32,
    pub sounds: AHashMap<Sound, u32>,
}

impl SimulationStats {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Sound(sound) => *self.sounds.entry(*sound).or_insert(0) += 1,
            SimEvent::Explosion { .. } => self.explosions += 1,
            SimEvent::Exited => self.saved += 1,
            SimEvent::Died => self.lost += 1,
        }
    }
}

pub struct Simulation {
    ctx: SimContext,
    lemmings: Vec<Lemming>,
    current_tick: Tick,
    stats: SimulationStats,
}

impl Simulation {
    pub fn new(level: Level, resources: Arc<Resources>, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ctx: SimContext::new(level, resources, config),
            lemmings: Vec::new(),
            current_tick: 0,
            stats: SimulationStats::default(),
        })
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    pub fn level(&self) -> &Level {
        &self.ctx.level
    }

    /// Live agents in update order
    pub fn lemmings(&self) -> &[Lemming] {
        &self.lemmings
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Drop a new agent into the level; returns its index among live agents
    pub fn spawn(&mut self, x: i32, y: i32, dir: Direction) -> usize {
        self.add(Lemming::new(x, y, dir, Arc::clone(&self.ctx.resources)))
    }

    /// Add a prepared agent, e.g. one built with [`Lemming::with_type`]
    pub fn add(&mut self, lemming: Lemming) -> usize {
        self.lemmings.push(lemming);
        self.stats.spawned += 1;
        self.lemmings.len() - 1
    }

    /// Request a skill for the live agent at `index`
    pub fn assign_skill(&mut self, index: usize, skill: LemmingType) -> bool {
        match self.lemmings.get_mut(index) {
            Some(lemming) => lemming.set_skill(skill, &mut self.ctx),
            None => false,
        }
    }

    /// Arm every live agent; returns how many accepted
    pub fn nuke(&mut self) -> usize {
        let mut armed = 0;
        for lemming in &mut self.lemmings {
            if lemming.set_skill(LemmingType::Nuke, &mut self.ctx) {
                armed += 1;
            }
        }
        tracing::info!("Nuke requested: {} of {} lemmings armed", armed, self.lemmings.len());
        armed
    }

    /// No agent left to simulate
    pub fn is_finished(&self) -> bool {
        self.lemmings.is_empty()
    }

    /// Advance one tick and return the events it produced
    pub fn tick(&mut self) -> Vec<SimEvent> {
        for lemming in &mut self.lemmings {
            lemming.update(&mut self.ctx);
        }
        self.ctx.level.tick_objects();

        let events = self.ctx.drain_events();
        for event in &events {
            self.stats.record(event);
        }

        let before = self.lemmings.len();
        self.lemmings.retain(|lemming| !lemming.has_died() && !lemming.has_exited());
        let removed = before - self.lemmings.len();
        if removed > 0 {
            tracing::debug!(
                "Tick {}: removed {} lemmings ({} live, {} saved, {} lost)",
                self.current_tick,
                removed,
                self.lemmings.len(),
                self.stats.saved,
                self.stats.lost
            );
        }

        self.current_tick += 1;
        events
    }

    /// Tick until every agent is gone or `max_ticks` have passed
    pub fn run(&mut self, max_ticks: Tick) -> Tick {
        let start = self.current_tick;
        while !self.is_finished() && self.current_tick - start < max_ticks {
            self.tick();
        }
        self.current_tick - start
    }
}

//! Animation completion rules
//!
//! Run when a looping animation wraps or a one-shot animation reaches its
//! last frame, unless a type change is already pending for this tick.

use std::sync::Arc;

use crate::core::types::Sound;
use crate::lemming::constants::*;
use crate::lemming::physics::free_below;
use crate::lemming::{Lemming, LemmingType};
use crate::simulation::{SimContext, SimEvent};
use crate::terrain::{Stencil, StencilCell};

pub type CompletionRule = fn(&mut Lemming, &mut SimContext) -> Option<LemmingType>;

pub fn rule_for(kind: LemmingType) -> CompletionRule {
    match kind {
        LemmingType::ClimberToWalker => climber_to_walker,
        LemmingType::Builder => builder,
        LemmingType::BuilderEnd => to_walker,
        LemmingType::Digger => digger,
        LemmingType::Splat | LemmingType::Drowning | LemmingType::Trapped => dies,
        LemmingType::Exiting => exits,
        LemmingType::Bomber | LemmingType::BomberStopper => explodes,
        _ => none,
    }
}

fn none(_: &mut Lemming, _: &mut SimContext) -> Option<LemmingType> {
    None
}

fn to_walker(_: &mut Lemming, _: &mut SimContext) -> Option<LemmingType> {
    Some(LemmingType::Walker)
}

fn climber_to_walker(lem: &mut Lemming, _: &mut SimContext) -> Option<LemmingType> {
    lem.y -= CLIMBER_HAND_HEIGHT;
    Some(LemmingType::Walker)
}

fn solid_at(stencil: &Stencil, x: i32, y: i32) -> bool {
    stencil.get_xy(x, y).is_some_and(|cell| cell.is_solid())
}

/// One step finished: move onto it, then decide whether to keep building
fn builder(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let dx = lem.dir.dx();
    lem.x += BUILDER_STEP_X * dx;
    lem.y -= BUILDER_STEP_Y;

    if lem.step_counter >= BUILDER_STEPS {
        return Some(LemmingType::BuilderEnd);
    }

    let stencil = ctx.level.stencil();
    let ceiling = (lem.y - BUILDER_CEILING_TOP..=lem.y - BUILDER_CEILING_BOTTOM)
        .any(|y| solid_at(stencil, lem.x, y));
    if ceiling {
        return Some(LemmingType::Walker);
    }

    if solid_at(stencil, lem.x + dx, lem.y - 1) || solid_at(stencil, lem.x + dx, lem.y - 2) {
        lem.dir = lem.dir.reversed();
        return Some(LemmingType::Walker);
    }
    None
}

/// One dig cycle: clear the ground under the feet, sink, then look for a
/// cavity below
fn digger(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let resources = Arc::clone(&lem.resources);
    if let Some(placed) = resources.get(lem.kind.resource_kind()).mask(lem.dir) {
        let (ox, oy) = placed.origin(lem.x, lem.y);
        if placed.mask.erase(&mut ctx.level, ox, oy, 0, StencilCell::STEEL) {
            ctx.play(Sound::Steel);
            return Some(LemmingType::Walker);
        }
    }

    lem.y += DIGGER_STEP;

    // The window is narrower than the footprint and off center
    let stencil = ctx.level.stencil();
    let drop = (lem.x - DIGGER_PROBE_LEFT..=lem.x + DIGGER_PROBE_RIGHT)
        .map(|x| free_below(stencil, x, lem.y, DIGGER_FALL_WINDOW))
        .filter(|&free| free > 0)
        .min();
    if let Some(free) = drop {
        lem.y += free;
        return Some(LemmingType::Faller);
    }
    None
}

fn dies(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    lem.die(ctx);
    None
}

fn exits(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    lem.has_exited = true;
    ctx.increment_exit_count();
    ctx.emit(SimEvent::Exited);
    tracing::debug!("Lemming exited at ({}, {})", lem.x, lem.y);
    None
}

fn explodes(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    lem.explode(ctx);
    None
}


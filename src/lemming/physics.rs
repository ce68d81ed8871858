//! Per-tick movement rules, one plain function per agent type
//!
//! A rule reads the stencil around the agent, moves it and returns the type
//! it should switch to at the end of the tick (if any). Rules run on the
//! frame that was current when the tick started.

use std::sync::Arc;

use crate::core::types::{Direction, Sound};
use crate::lemming::constants::*;
use crate::lemming::{Lemming, LemmingType};
use crate::simulation::SimContext;
use crate::terrain::{Stencil, StencilCell};

pub type PhysicsRule = fn(&mut Lemming, &mut SimContext) -> Option<LemmingType>;

pub fn rule_for(kind: LemmingType) -> PhysicsRule {
    match kind {
        LemmingType::Walker => walker,
        LemmingType::Faller => faller,
        LemmingType::Climber => climber,
        LemmingType::FloaterStart => floater_start,
        LemmingType::Floater => floater,
        LemmingType::Jumper => jumper,
        LemmingType::Builder => builder,
        LemmingType::Basher => basher,
        LemmingType::Miner => miner,
        LemmingType::Stopper | LemmingType::BomberStopper => stopper,
        LemmingType::Bomber => bomber,
        _ => idle,
    }
}

// Stencil probes. Out-of-range samples never fault: a column outside the
// level reads as solid ground, rows below the level as open air.

fn is_solid(stencil: &Stencil, x: i32, y: i32) -> bool {
    stencil.get_xy(x, y).is_some_and(|cell| cell.is_solid())
}

/// Empty cells from row `y` downward, up to `max`
pub fn free_below(stencil: &Stencil, x: i32, y: i32, max: i32) -> i32 {
    if x < 0 || x >= stencil.width() as i32 {
        return 0;
    }
    let mut free = 0;
    while free < max {
        let row = y + free;
        if row >= 0 && is_solid(stencil, x, row) {
            break;
        }
        free += 1;
    }
    free
}

/// Solid cells stacked on top of the ground row, counted upward from `y - 1`
pub fn obstacle_height(stencil: &Stencil, x: i32, y: i32) -> i32 {
    if x < 0 || x >= stencil.width() as i32 {
        return WALKER_OBSTACLE_HEIGHT;
    }
    let mut height = 0;
    while height < WALKER_OBSTACLE_HEIGHT && is_solid(stencil, x, y - 1 - height) {
        height += 1;
    }
    height
}

/// Stopper bit that turns an agent with this heading
pub fn blocking_bit(dir: Direction) -> StencilCell {
    match dir {
        Direction::Left => StencilCell::BLOCK_LEFTWARD,
        Direction::Right => StencilCell::BLOCK_RIGHTWARD,
        Direction::None => StencilCell::empty(),
    }
}

/// No-dig bit that protects terrain from an agent with this heading
pub fn no_dig_bit(dir: Direction) -> StencilCell {
    match dir {
        Direction::Left => StencilCell::NO_DIG_LEFT,
        Direction::Right => StencilCell::NO_DIG_RIGHT,
        Direction::None => StencilCell::empty(),
    }
}

/// Reverse the agent if its mid point sits in a zone blocking its heading
fn turned_by_stopper(lem: &mut Lemming, stencil: &Stencil) -> bool {
    let blocked = stencil
        .get_xy(lem.x, lem.mid_y())
        .is_some_and(|cell| cell.intersects(blocking_bit(lem.dir)));
    if blocked {
        lem.dir = lem.dir.reversed();
    }
    blocked
}

fn idle(_: &mut Lemming, _: &mut SimContext) -> Option<LemmingType> {
    None
}

fn walker(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let old_x = lem.x;
    lem.x += WALKER_STEP * lem.dir.dx();
    let stencil = ctx.level.stencil();

    if turned_by_stopper(lem, stencil) {
        lem.x = old_x;
        return None;
    }

    let height = obstacle_height(stencil, lem.x, lem.y);
    if height >= WALKER_OBSTACLE_HEIGHT {
        lem.x = old_x;
        if lem.can_climb {
            return Some(LemmingType::Climber);
        }
        lem.dir = lem.dir.reversed();
        return None;
    }
    if height >= JUMPER_MIN_OBSTACLE {
        lem.y -= JUMPER_STEP;
        return Some(LemmingType::Jumper);
    }
    if height > 0 {
        lem.y -= height;
        return None;
    }

    let free = free_below(stencil, lem.x, lem.y, FALL_DISTANCE_FALL);
    if free >= FALL_DISTANCE_FALL {
        lem.y += FALLER_STEP;
        lem.fall_counter = FALLER_STEP;
        return Some(LemmingType::Faller);
    }
    lem.y += free;
    None
}

fn faller(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let free = free_below(ctx.level.stencil(), lem.x, lem.y, FALLER_STEP);
    if free == 0 {
        if lem.fall_counter > ctx.level.max_fall_distance() {
            return Some(LemmingType::Splat);
        }
        return Some(LemmingType::Walker);
    }

    lem.y += free;
    lem.fall_counter += free;
    if lem.can_float && lem.fall_counter >= FALL_DISTANCE_FLOAT {
        return Some(LemmingType::FloaterStart);
    }
    None
}

fn climber(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    lem.step_counter += 1;
    if lem.step_counter % 2 == 0 {
        return None;
    }

    let stencil = ctx.level.stencil();
    let head = lem.y - LEMMING_HEIGHT;
    if head < 0 || is_solid(stencil, lem.x, head) {
        lem.dir = lem.dir.reversed();
        return Some(LemmingType::Faller);
    }

    lem.y -= 1;
    let ahead = lem.x + lem.dir.dx();
    let hand = lem.y - CLIMBER_HAND_HEIGHT;
    if !is_solid(stencil, ahead, hand - 1) && !is_solid(stencil, ahead, hand - 2) {
        return Some(LemmingType::ClimberToWalker);
    }
    None
}

fn floater_start(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let step = FLOATER_START_STEPS[(lem.step_counter as usize).min(FLOATER_START_STEPS.len() - 1)];
    let free = free_below(ctx.level.stencil(), lem.x, lem.y, step);
    if free == 0 {
        return Some(LemmingType::Walker);
    }
    lem.y += free;
    lem.step_counter += 1;
    if lem.step_counter as usize >= FLOATER_START_STEPS.len() {
        return Some(LemmingType::Floater);
    }
    None
}

fn floater(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let free = free_below(ctx.level.stencil(), lem.x, lem.y, FLOATER_STEP);
    if free == 0 {
        return Some(LemmingType::Walker);
    }
    lem.y += free;
    None
}

fn jumper(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let stencil = ctx.level.stencil();
    if turned_by_stopper(lem, stencil) {
        return Some(LemmingType::Walker);
    }

    let height = obstacle_height(stencil, lem.x, lem.y);
    if height > JUMPER_STEP {
        lem.y -= JUMPER_STEP;
        return None;
    }
    lem.y -= height;
    Some(LemmingType::Walker)
}

fn builder(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    if lem.frame != BUILDER_STAMP_FRAME {
        return None;
    }

    let resources = Arc::clone(&lem.resources);
    if let Some(placed) = resources.get(lem.kind.resource_kind()).mask(lem.dir) {
        let (ox, oy) = placed.origin(lem.x, lem.y);
        let color = ctx.level.debris_color();
        placed.mask.paint_step(&mut ctx.level, ox, oy, 0, color);
    }
    if lem.step_counter >= BUILDER_WARN_FROM_STEP {
        ctx.play(Sound::Ting);
    }
    lem.step_counter += 1;
    None
}

/// Erase a tool footprint in the heading; true when steel stopped it
fn dig_ahead(lem: &Lemming, ctx: &mut SimContext, mask_frame: usize) -> bool {
    let resources = Arc::clone(&lem.resources);
    let Some(placed) = resources.get(lem.kind.resource_kind()).mask(lem.dir) else {
        return false;
    };
    let (ox, oy) = placed.origin(lem.x, lem.y);
    let protect = StencilCell::STEEL | no_dig_bit(lem.dir);
    let blocked = placed.mask.erase(&mut ctx.level, ox, oy, mask_frame, protect);
    if blocked {
        ctx.play(Sound::Steel);
    }
    blocked
}

fn basher(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    if let Some(mask_frame) = BASHER_ERASE_FRAMES.iter().position(|&f| f == lem.frame) {
        if dig_ahead(lem, ctx, mask_frame) {
            return Some(LemmingType::Walker);
        }

        let stencil = ctx.level.stencil();
        let dx = lem.dir.dx();
        let brick_ahead = (BASHER_PROBE_NEAR..=BASHER_PROBE_FAR).any(|i| {
            let x = lem.x + i * dx;
            (lem.y - BASHER_PROBE_ROWS..lem.y).any(|y| is_solid(stencil, x, y))
        });
        if !brick_ahead {
            return Some(LemmingType::Walker);
        }
    }

    if BASHER_MOVE_FRAMES.contains(&lem.frame) {
        lem.x += lem.dir.dx();
        let free = free_below(ctx.level.stencil(), lem.x, lem.y, BASHER_FALL_DISTANCE);
        if free >= BASHER_FALL_DISTANCE {
            return Some(LemmingType::Faller);
        }
        lem.y += free;
    }
    None
}

fn miner(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    if let Some(mask_frame) = MINER_ERASE_FRAMES.iter().position(|&f| f == lem.frame) {
        if dig_ahead(lem, ctx, mask_frame) {
            return Some(LemmingType::Walker);
        }
    }

    if MINER_MOVE_FRAMES.contains(&lem.frame) {
        lem.x += MINER_STEP_X * lem.dir.dx();
        lem.y += MINER_STEP_Y;
        let free = free_below(ctx.level.stencil(), lem.x, lem.y, MINER_FALL_DISTANCE);
        if free >= MINER_FALL_DISTANCE {
            return Some(LemmingType::Faller);
        }
        lem.y += free;
    }
    None
}

fn stopper(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    let free = free_below(ctx.level.stencil(), lem.x, lem.y, STOPPER_FALL_WINDOW);
    if free == 0 {
        return None;
    }

    lem.release_stopper(ctx);
    if lem.kind == LemmingType::BomberStopper {
        return Some(LemmingType::Bomber);
    }
    if free >= STOPPER_FALL_WINDOW {
        return Some(LemmingType::Faller);
    }
    lem.y += free;
    Some(LemmingType::Walker)
}

fn bomber(lem: &mut Lemming, ctx: &mut SimContext) -> Option<LemmingType> {
    lem.y += free_below(ctx.level.stencil(), lem.x, lem.y, FALLER_STEP);
    None
}

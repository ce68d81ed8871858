//! Skill assignment requests from the player (or a script)

use std::sync::Arc;

use crate::lemming::physics::{free_below, no_dig_bit};
use crate::lemming::{Lemming, LemmingType, ResourceKind};
use crate::simulation::SimContext;
use crate::terrain::StencilCell;

impl Lemming {
    /// Try to give the agent a skill. Returns whether the request took
    /// effect; rejected requests leave the agent untouched.
    pub fn set_skill(&mut self, requested: LemmingType, ctx: &mut SimContext) -> bool {
        if self.has_died || self.has_exited || requested == self.kind {
            return false;
        }

        if self.kind.is_terminal() {
            if requested != LemmingType::Nuke || self.nuke || self.explode_num > 0 {
                return false;
            }
            self.nuke = true;
            self.arm_explosion();
            return true;
        }

        let accepted = match requested {
            LemmingType::Climber => !std::mem::replace(&mut self.can_climb, true),
            LemmingType::Floater => !std::mem::replace(&mut self.can_float, true),
            LemmingType::Bomber => {
                if self.explode_num > 0 {
                    return false;
                }
                self.arm_explosion();
                true
            }
            LemmingType::Nuke => {
                if self.nuke {
                    return false;
                }
                self.nuke = true;
                if self.explode_num == 0 {
                    self.arm_explosion();
                }
                return true;
            }
            kind if kind.is_primary_skill() => self.assign_primary(kind, ctx),
            _ => false,
        };

        if accepted {
            self.select_ctr = ctx.config.select_highlight_ticks;
            tracing::debug!("Assigned {} at ({}, {})", requested.name(), self.x, self.y);
        }
        accepted
    }

    fn assign_primary(&mut self, kind: LemmingType, ctx: &mut SimContext) -> bool {
        if !self.can_change_skill {
            return false;
        }

        let resources = Arc::clone(&self.resources);
        let stencil = ctx.level.stencil();
        match kind {
            LemmingType::Digger => {
                let below = stencil.get_xy(self.x, self.y).unwrap_or_default();
                if !below.is_solid() || below.contains(StencilCell::STEEL) {
                    return false;
                }
            }
            LemmingType::Miner => {
                let Some(placed) = resources.get(ResourceKind::Miner).mask(self.dir) else {
                    return false;
                };
                let (ox, oy) = placed.origin(self.x, self.y);
                let protect = StencilCell::STEEL | no_dig_bit(self.dir);
                if !placed.mask.check(stencil, ox, oy, 0, StencilCell::TERRAIN)
                    || placed.mask.check(stencil, ox, oy, 0, protect)
                {
                    return false;
                }
            }
            LemmingType::Builder => {
                if free_below(stencil, self.x, self.y, 1) != 0 {
                    return false;
                }
            }
            LemmingType::Stopper => {
                let Some(placed) = resources.get(ResourceKind::Stopper).mask(self.dir) else {
                    return false;
                };
                let (ox, oy) = placed.origin(self.x, self.y);
                if placed.mask.check(stencil, ox, oy, 0, StencilCell::STOPPER) {
                    return false;
                }
                placed.mask.set_stopper(&mut ctx.level, ox, oy, self.x);
                self.stopper_origin = Some((ox, oy));
            }
            _ => {}
        }

        self.change_type(kind, ctx);
        true
    }
}

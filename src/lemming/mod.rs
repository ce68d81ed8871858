//! Lemming agents: a per-tick state machine over the shared terrain
//!
//! Each tick runs, in order: explosion countdown, edge clamp, the physics
//! rule of the current type, the trap/exit sample at the mid point, the
//! animation advance with its completion rule, and finally the type switch.

pub mod completion;
pub mod constants;
pub mod kind;
pub mod physics;
pub mod resources;
pub mod skill;

pub use kind::{LemmingType, ResourceKind};
pub use resources::{AnimationMode, LemmingResource, PlacedMask, ResourceManifest, Resources};

use image::RgbaImage;
use std::sync::Arc;

use crate::core::config::EXPLOSION_UNITS;
use crate::core::types::{Direction, Sound};
use crate::simulation::{SimContext, SimEvent};
use crate::terrain::StencilCell;

#[derive(Debug, Clone)]
pub struct Lemming {
    x: i32,
    /// Ground row the agent stands on
    y: i32,
    dir: Direction,
    kind: LemmingType,
    frame: usize,
    fall_counter: i32,
    step_counter: u32,
    /// Countdown value shown above the agent (5..1), 0 when unarmed
    explode_num: u32,
    /// Ticks spent in the current countdown unit
    explode_ctr: u32,
    select_ctr: u32,
    can_float: bool,
    can_climb: bool,
    can_change_skill: bool,
    nuke: bool,
    has_died: bool,
    has_exited: bool,
    /// Origin of the stamped stopper zone while one is active
    stopper_origin: Option<(i32, i32)>,
    resources: Arc<Resources>,
}

impl Lemming {
    /// New agent entering the level; agents always start falling
    pub fn new(x: i32, y: i32, dir: Direction, resources: Arc<Resources>) -> Self {
        Self {
            x,
            y,
            dir,
            kind: LemmingType::Faller,
            frame: 0,
            fall_counter: 0,
            step_counter: 0,
            explode_num: 0,
            explode_ctr: 0,
            select_ctr: 0,
            can_float: false,
            can_climb: false,
            can_change_skill: false,
            nuke: false,
            has_died: false,
            has_exited: false,
            stopper_origin: None,
            resources,
        }
    }

    /// Start in a movement type other than falling, e.g. for agents placed
    /// directly on the ground. Stopper zones are only stamped through
    /// [`Lemming::set_skill`].
    pub fn with_type(mut self, kind: LemmingType) -> Self {
        self.kind = kind;
        self.frame = self.initial_frame(kind);
        self.can_change_skill = kind.can_change_skill();
        self
    }

    fn resource(&self) -> &LemmingResource {
        self.resources.get(self.kind.resource_kind())
    }

    fn initial_frame(&self, kind: LemmingType) -> usize {
        if kind == LemmingType::Digger {
            self.resources.get(kind.resource_kind()).last_frame()
        } else {
            0
        }
    }

    // Position and size

    pub fn foot_x(&self) -> i32 {
        self.x
    }

    pub fn foot_y(&self) -> i32 {
        self.y
    }

    pub fn mid_x(&self) -> i32 {
        self.x
    }

    pub fn mid_y(&self) -> i32 {
        self.y - self.resource().size()
    }

    /// Left edge of the sprite in level coordinates
    pub fn screen_x(&self) -> i32 {
        self.x - self.resource().foot_x()
    }

    /// Top edge of the sprite in level coordinates
    pub fn screen_y(&self) -> i32 {
        self.y - self.resource().foot_y()
    }

    pub fn width(&self) -> u32 {
        self.resource().width()
    }

    pub fn height(&self) -> u32 {
        self.resource().height()
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    // Status

    pub fn current_type(&self) -> LemmingType {
        self.kind
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn fall_counter(&self) -> i32 {
        self.fall_counter
    }

    pub fn has_died(&self) -> bool {
        self.has_died
    }

    pub fn has_exited(&self) -> bool {
        self.has_exited
    }

    pub fn is_nuke_requested(&self) -> bool {
        self.nuke
    }

    pub fn can_float(&self) -> bool {
        self.can_float
    }

    pub fn can_climb(&self) -> bool {
        self.can_climb
    }

    pub fn can_change_skill(&self) -> bool {
        self.can_change_skill
    }

    /// Remaining countdown units, 0 when no explosion is pending
    pub fn explosion_countdown(&self) -> u32 {
        self.explode_num
    }

    pub fn display_name(&self) -> &'static str {
        if matches!(self.kind, LemmingType::Walker | LemmingType::Faller) {
            match (self.can_climb, self.can_float) {
                (true, true) => return "ATHLETE",
                (true, false) => return "CLIMBER",
                (false, true) => return "FLOATER",
                (false, false) => {}
            }
        }
        self.kind.name()
    }

    // Rendering

    pub fn current_frame_image(&self) -> &RgbaImage {
        self.resource().frame_image(self.dir, self.frame)
    }

    pub fn explosion_countdown_image(&self) -> Option<&RgbaImage> {
        if self.has_died {
            return None;
        }
        self.resources.countdown_digit(self.explode_num)
    }

    pub fn selection_highlight_image(&self) -> Option<&RgbaImage> {
        (self.select_ctr > 0).then(|| self.resources.highlight())
    }

    // Tick

    /// Advance the agent by one simulation tick
    pub fn update(&mut self, ctx: &mut SimContext) {
        if self.has_died || self.has_exited {
            return;
        }

        self.tick_explosion(ctx);
        if self.has_died {
            return;
        }
        self.select_ctr = self.select_ctr.saturating_sub(1);

        let resources = Arc::clone(&self.resources);
        let resource = resources.get(self.kind.resource_kind());
        if resource.directions() == 2 {
            self.clamp_to_edges(ctx.level.width());
        }

        let mut new_kind = physics::rule_for(self.kind)(self, ctx).unwrap_or(self.kind);

        new_kind = self.check_traps(new_kind, ctx);
        if self.has_died {
            return;
        }

        if self.advance_frame(resource) && new_kind == self.kind {
            if let Some(kind) = completion::rule_for(self.kind)(self, ctx) {
                new_kind = kind;
            }
            if self.has_died || self.has_exited {
                return;
            }
        }

        if new_kind != self.kind {
            self.change_type(new_kind, ctx);
        }

        if self.y >= ctx.level.height() {
            ctx.play(Sound::Die);
            self.release_stopper(ctx);
            self.die(ctx);
        }
    }

    fn clamp_to_edges(&mut self, width: i32) {
        if width <= 0 {
            return;
        }
        let at_left = self.x <= 0 && self.dir == Direction::Left;
        let at_right = self.x >= width - 1 && self.dir == Direction::Right;
        if at_left || at_right {
            self.x = self.x.clamp(0, width - 1);
            self.dir = self.dir.reversed();
        }
    }

    /// Returns true when the animation completed on this tick
    fn advance_frame(&mut self, resource: &LemmingResource) -> bool {
        let last = resource.last_frame();
        match resource.mode() {
            AnimationMode::Loop => {
                if self.frame >= last {
                    self.frame = 0;
                    true
                } else {
                    self.frame += 1;
                    false
                }
            }
            AnimationMode::Once => {
                if self.frame < last {
                    self.frame += 1;
                }
                self.frame >= last
            }
        }
    }

    fn arm_explosion(&mut self) {
        self.explode_num = EXPLOSION_UNITS;
        self.explode_ctr = 0;
    }

    fn tick_explosion(&mut self, ctx: &mut SimContext) {
        if self.explode_num == 0 {
            return;
        }
        self.explode_ctr += 1;
        if self.explode_ctr < ctx.config.explosion_unit_ticks() {
            return;
        }
        self.explode_ctr = 0;
        self.explode_num -= 1;
        if self.explode_num > 0 {
            return;
        }

        match self.kind {
            LemmingType::ClimberToWalker
            | LemmingType::Faller
            | LemmingType::FloaterStart
            | LemmingType::Floater
            | LemmingType::Splat => self.explode(ctx),
            LemmingType::Walker
            | LemmingType::Jumper
            | LemmingType::Climber
            | LemmingType::Digger
            | LemmingType::Basher
            | LemmingType::Miner
            | LemmingType::Builder
            | LemmingType::BuilderEnd => {
                if !self.nuke {
                    ctx.play(Sound::OhNo);
                }
                self.change_type(LemmingType::Bomber, ctx);
            }
            LemmingType::Stopper => {
                if !self.nuke {
                    ctx.play(Sound::OhNo);
                }
                self.change_type(LemmingType::BomberStopper, ctx);
            }
            // Drowning, trapped, exiting or already exploding: the countdown just lapses
            _ => {}
        }
    }

    /// Blow up in place: crater in the terrain, agent is gone
    fn explode(&mut self, ctx: &mut SimContext) {
        ctx.play(Sound::Explode);
        ctx.spawn_explosion(self.mid_x(), self.mid_y());
        self.release_stopper(ctx);

        let resources = Arc::clone(&self.resources);
        if let Some(placed) = resources.get(ResourceKind::Bomber).mask(self.dir) {
            let (ox, oy) = placed.origin(self.x, self.y);
            placed.mask.erase(&mut ctx.level, ox, oy, 0, StencilCell::STEEL);
        }

        self.kind = LemmingType::Bomber;
        self.die(ctx);
    }

    fn die(&mut self, ctx: &mut SimContext) {
        self.has_died = true;
        ctx.emit(SimEvent::Died);
        tracing::debug!("Lemming died as {} at ({}, {})", self.kind.name(), self.x, self.y);
    }

    fn release_stopper(&mut self, ctx: &mut SimContext) {
        let Some((ox, oy)) = self.stopper_origin.take() else {
            return;
        };
        if let Some(placed) = self.resources.get(ResourceKind::Stopper).mask(self.dir) {
            placed.mask.clear(&mut ctx.level, ox, oy, 0, StencilCell::STOPPER);
        }
    }

    /// Apply trap and exit regions under the mid point
    fn check_traps(&mut self, new_kind: LemmingType, ctx: &mut SimContext) -> LemmingType {
        if self.kind.is_terminal() || new_kind.is_terminal() {
            return new_kind;
        }
        let Some(cell) = ctx.level.stencil().get_xy(self.mid_x(), self.mid_y()) else {
            return new_kind;
        };
        let owner = cell.object_id();

        if cell.contains(StencilCell::TRAP_DROWN) {
            self.release_stopper(ctx);
            if let Some(sound) = owner.and_then(|id| ctx.level.sprite_object(id)).and_then(|o| o.sound()) {
                ctx.play(sound);
            }
            return LemmingType::Drowning;
        }

        if cell.intersects(StencilCell::TRAP_DIE | StencilCell::TRAP_REPLACE) {
            if !fire_trap(owner, ctx) {
                return new_kind;
            }
            self.release_stopper(ctx);
            if cell.contains(StencilCell::TRAP_DIE) {
                return LemmingType::Trapped;
            }
            self.die(ctx);
            return new_kind;
        }

        if cell.contains(StencilCell::EXIT) && new_kind.can_exit() {
            ctx.play(Sound::Yippee);
            return LemmingType::Exiting;
        }

        new_kind
    }

    fn change_type(&mut self, new_kind: LemmingType, ctx: &mut SimContext) {
        let old_kind = self.kind;
        if old_kind.is_stopper() && !new_kind.is_stopper() {
            self.release_stopper(ctx);
        }

        let keeps_frame = matches!(
            (old_kind, new_kind),
            (LemmingType::Bomber, LemmingType::BomberStopper) | (LemmingType::BomberStopper, LemmingType::Bomber)
        );
        self.kind = new_kind;
        if !keeps_frame {
            self.frame = self.initial_frame(new_kind);
        }
        self.can_change_skill = new_kind.can_change_skill();
        self.step_counter = 0;
        if new_kind != LemmingType::Faller {
            self.fall_counter = 0;
        }

        tracing::trace!("Lemming at ({}, {}): {:?} -> {:?}", self.x, self.y, old_kind, new_kind);
    }
}

/// Let the owning trap decide whether this contact fires. Continuous traps
/// always fire.
fn fire_trap(owner: Option<crate::core::types::ObjectId>, ctx: &mut SimContext) -> bool {
    let Some(object) = owner.and_then(|id| ctx.level.sprite_object_mut(id)) else {
        return true;
    };
    let fires = !object.can_be_triggered() || object.trigger();
    let sound = object.sound();
    if fires {
        if let Some(sound) = sound {
            ctx.play(sound);
        }
    }
    fires
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::level::{Material, ObjectKind, Rect, TriggerMode};

    #[test]
    fn test_new_agents_fall() {
        let ctx = flat_context();
        let lem = Lemming::new(10, 20, Direction::Left, Arc::clone(&ctx.resources));
        assert_eq!(lem.current_type(), LemmingType::Faller);
        assert!(!lem.can_change_skill());
    }

    #[test]
    fn test_walker_walks_on_flat_ground() {
        let mut ctx = flat_context();
        let mut lem = agent(&ctx, 100, LemmingType::Walker);
        run(&mut lem, &mut ctx, 20);
        assert_eq!(lem.foot_x(), 120);
        assert_eq!(lem.foot_y(), GROUND);
        assert_eq!(lem.current_type(), LemmingType::Walker);
    }

    #[test]
    fn test_walker_steps_up_small_ledge() {
        let mut ctx = flat_context();
        ctx.level.add_terrain(Rect::new(101, GROUND - 3, 40, 3), Material::Brick, [1, 1, 1, 255]);
        let mut lem = agent(&ctx, 100, LemmingType::Walker);
        lem.update(&mut ctx);
        assert_eq!(lem.foot_x(), 101);
        assert_eq!(lem.foot_y(), GROUND - 3);
        assert_eq!(lem.current_type(), LemmingType::Walker);
    }

    #[test]
    fn test_walker_jumps_medium_obstacle() {
        let mut ctx = flat_context();
        ctx.level.add_terrain(Rect::new(101, GROUND - 8, 40, 8), Material::Brick, [1, 1, 1, 255]);
        let mut lem = agent(&ctx, 100, LemmingType::Walker);
        lem.update(&mut ctx);
        assert_eq!(lem.current_type(), LemmingType::Jumper);
        assert_eq!(lem.foot_y(), GROUND - 2);

        // 6 left: two more 2px hops, then the last 2px and back to walking
        run(&mut lem, &mut ctx, 3);
        assert_eq!(lem.current_type(), LemmingType::Walker);
        assert_eq!(lem.foot_y(), GROUND - 8);
    }

    #[test]
    fn test_walker_turns_at_wall() {
        let mut ctx = flat_context();
        ctx.level.add_terrain(Rect::new(111, GROUND - 20, 5, 20), Material::Brick, [1, 1, 1, 255]);
        let mut lem = agent(&ctx, 110, LemmingType::Walker);
        lem.update(&mut ctx);
        assert_eq!(lem.direction(), Direction::Left);
        assert_eq!(lem.foot_x(), 110);
        assert_eq!(lem.current_type(), LemmingType::Walker);
    }

    #[test]
    fn test_walker_falls_off_ledge() {
        let mut ctx = flat_context();
        ctx.level.add_terrain(Rect::new(0, 60, 50, 1), Material::Brick, [1, 1, 1, 255]);
        let mut lem = Lemming::new(49, 60, Direction::Right, Arc::clone(&ctx.resources)).with_type(LemmingType::Walker);
        lem.update(&mut ctx);
        assert_eq!(lem.current_type(), LemmingType::Faller);
        assert_eq!(lem.foot_y(), 63);
        assert_eq!(lem.fall_counter(), 3);
    }

    #[test]
    fn test_faller_lands() {
        let mut ctx = flat_context();
        let mut lem = Lemming::new(50, GROUND - 30, Direction::Right, Arc::clone(&ctx.resources));
        run(&mut lem, &mut ctx, 11);
        assert_eq!(lem.current_type(), LemmingType::Walker);
        assert_eq!(lem.foot_y(), GROUND);
    }

    #[test]
    fn test_floater_opens_after_long_drop() {
        let mut ctx = flat_context();
        let mut lem = Lemming::new(50, 0, Direction::Right, Arc::clone(&ctx.resources));
        lem.can_float = true;
        // 11 ticks of 3px reach the 32px threshold
        run(&mut lem, &mut ctx, 11);
        assert_eq!(lem.current_type(), LemmingType::FloaterStart);
        run(&mut lem, &mut ctx, 8);
        assert_eq!(lem.current_type(), LemmingType::Floater);
        run(&mut lem, &mut ctx, 60);
        assert_eq!(lem.current_type(), LemmingType::Walker);
        assert_eq!(lem.foot_y(), GROUND);
    }

    #[test]
    fn test_edge_clamp_reverses() {
        let mut ctx = flat_context();
        let mut lem = Lemming::new(0, GROUND, Direction::Left, Arc::clone(&ctx.resources)).with_type(LemmingType::Walker);
        lem.update(&mut ctx);
        assert_eq!(lem.direction(), Direction::Right);
        assert_eq!(lem.foot_x(), 1);
    }

    #[test]
    fn test_climber_scales_wall() {
        let mut ctx = flat_context();
        // 30px tall wall with a plateau on top
        ctx.level.add_terrain(Rect::new(111, GROUND - 30, 20, 30), Material::Brick, [1, 1, 1, 255]);
        let mut lem = agent(&ctx, 110, LemmingType::Walker);
        lem.can_climb = true;
        lem.update(&mut ctx);
        assert_eq!(lem.current_type(), LemmingType::Climber);
        assert_eq!(lem.foot_x(), 110);

        let mut ticks = 0;
        while lem.current_type() != LemmingType::Walker && ticks < 200 {
            lem.update(&mut ctx);
            ticks += 1;
        }
        assert_eq!(lem.current_type(), LemmingType::Walker);
        assert_eq!(lem.foot_y(), GROUND - 30);
        lem.update(&mut ctx);
        assert_eq!(lem.foot_x(), 111);
        assert_eq!(lem.foot_y(), GROUND - 30);
    }

    #[test]
    fn test_climber_falls_under_overhang() {
        let mut ctx = flat_context();
        ctx.level.add_terrain(Rect::new(111, GROUND - 60, 5, 60), Material::Brick, [1, 1, 1, 255]);
        ctx.level.add_terrain(Rect::new(100, GROUND - 25, 11, 2), Material::Brick, [1, 1, 1, 255]);
        let mut lem = agent(&ctx, 110, LemmingType::Climber);
        // Head meets the overhang on the fifth climbing tick
        run(&mut lem, &mut ctx, 9);
        assert_eq!(lem.current_type(), LemmingType::Faller);
        assert_eq!(lem.direction(), Direction::Left);
    }

    #[test]
    fn test_drown_trap() {
        let mut ctx = flat_context();
        ctx.level.add_object(ObjectKind::TrapDrown, Rect::new(105, GROUND - 20, 10, 20));
        let mut lem = agent(&ctx, 100, LemmingType::Walker);
        run(&mut lem, &mut ctx, 5);
        assert_eq!(lem.current_type(), LemmingType::Drowning);
        assert!(ctx.events().contains(&SimEvent::Sound(Sound::Drown)));

        run(&mut lem, &mut ctx, 40);
        assert!(lem.has_died());
    }

    #[test]
    fn test_one_shot_trap_takes_one_victim() {
        let mut ctx = flat_context();
        let id = ctx.level.add_object(ObjectKind::TrapDie, Rect::new(105, GROUND - 20, 10, 20));
        ctx.level.sprite_object_mut(id).unwrap().set_trigger_mode(TriggerMode::OneShot);

        let mut first = agent(&ctx, 100, LemmingType::Walker);
        let mut second = agent(&ctx, 98, LemmingType::Walker);
        for _ in 0..12 {
            first.update(&mut ctx);
            second.update(&mut ctx);
        }
        assert!(first.has_died() || first.current_type() == LemmingType::Trapped);
        assert_eq!(second.current_type(), LemmingType::Walker);
        assert!(!second.has_died());
    }

    #[test]
    fn test_replace_trap_kills_directly() {
        let mut ctx = flat_context();
        ctx.level.add_object(ObjectKind::TrapReplace, Rect::new(105, GROUND - 20, 10, 20));
        let mut lem = agent(&ctx, 100, LemmingType::Walker);
        run(&mut lem, &mut ctx, 5);
        assert!(lem.has_died());
        assert!(ctx.events().contains(&SimEvent::Died));
    }

    #[test]
    fn test_exit_only_for_eligible_types() {
        let mut ctx = flat_context();
        ctx.level.add_object(ObjectKind::Exit, Rect::new(105, GROUND - 20, 10, 20));

        let mut walker = agent(&ctx, 100, LemmingType::Walker);
        run(&mut walker, &mut ctx, 5);
        assert_eq!(walker.current_type(), LemmingType::Exiting);
        run(&mut walker, &mut ctx, 20);
        assert!(walker.has_exited());
        assert_eq!(ctx.exit_count(), 1);

        // A floater drifting down through the exit does not leave
        let mut floater = Lemming::new(108, GROUND - 25, Direction::Right, Arc::clone(&ctx.resources))
            .with_type(LemmingType::Floater);
        run(&mut floater, &mut ctx, 12);
        assert_eq!(floater.current_type(), LemmingType::Floater);
    }

    #[test]
    fn test_zero_width_level_skips_edge_clamp() {
        let level = crate::level::Level::new(0, 40, crate::level::LevelConfig::default(), 16);
        let mut ctx = SimContext::new(level, Arc::new(Resources::builtin()), Default::default());
        let mut lem = Lemming::new(0, 10, Direction::Left, Arc::clone(&ctx.resources)).with_type(LemmingType::Walker);
        // Everything outside the level reads as wall, so the walker paces on the spot
        for _ in 0..40 {
            lem.update(&mut ctx);
            assert_eq!(lem.foot_x(), 0);
        }
        assert_eq!(lem.current_type(), LemmingType::Walker);
        assert!(!lem.has_died());
    }

    #[test]
    fn test_falling_out_of_level_dies() {
        let mut level = crate::level::Level::new(64, 40, crate::level::LevelConfig::default(), 16);
        level.add_terrain(Rect::new(0, 30, 10, 1), Material::Brick, [1, 1, 1, 255]);
        let mut ctx = SimContext::new(level, Arc::new(Resources::builtin()), Default::default());
        let mut lem = Lemming::new(30, 0, Direction::Right, Arc::clone(&ctx.resources));
        run(&mut lem, &mut ctx, 20);
        assert!(lem.has_died());
        assert!(ctx.events().contains(&SimEvent::Sound(Sound::Die)));
    }

    #[test]
    fn test_display_name() {
        let ctx = flat_context();
        let mut lem = agent(&ctx, 10, LemmingType::Walker);
        assert_eq!(lem.display_name(), "WALKER");
        lem.can_climb = true;
        assert_eq!(lem.display_name(), "CLIMBER");
        lem.can_float = true;
        assert_eq!(lem.display_name(), "ATHLETE");

        let digger = agent(&ctx, 10, LemmingType::Digger);
        assert_eq!(digger.display_name(), "DIGGER");
    }

    #[test]
    fn test_screen_geometry() {
        let ctx = flat_context();
        let lem = agent(&ctx, 50, LemmingType::Walker);
        assert_eq!(lem.mid_y(), GROUND - 10);
        assert_eq!(lem.screen_x(), 42);
        assert_eq!(lem.screen_y(), GROUND - 20);
        assert_eq!((lem.width(), lem.height()), (16, 20));
        assert!(lem.explosion_countdown_image().is_none());
        assert!(lem.selection_highlight_image().is_none());
    }

    #[test]
    fn test_overlay_images_follow_state() {
        let mut ctx = flat_context();
        let mut lem = agent(&ctx, 50, LemmingType::Walker);
        assert_eq!(lem.current_frame_image().dimensions(), (16, 20));

        assert!(lem.set_skill(LemmingType::Bomber, &mut ctx));
        assert_eq!(lem.explosion_countdown_image(), ctx.resources.countdown_digit(5));
        assert!(lem.selection_highlight_image().is_some());

        let highlight_ticks = ctx.config.select_highlight_ticks as usize;
        run(&mut lem, &mut ctx, highlight_ticks);
        assert!(lem.selection_highlight_image().is_none());
        assert!(lem.explosion_countdown_image().is_some());
    }
}

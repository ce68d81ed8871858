//! Sprite objects placed in a level: traps, exits and one-way markers
//!
//! Objects own a rectangular stencil region. Traps may need explicit
//! triggering (one-shot or cooldown) before their effect applies.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::core::types::{Color, ObjectId, Sound, TRANSPARENT};
use crate::terrain::StencilCell;

/// What an object does to agents inside its region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Exit,
    TrapDrown,
    TrapDie,
    /// Trap that shows its own death animation instead of the agent's
    TrapReplace,
    /// One-way arrows: terrain under them cannot be dug heading left
    NoDigLeft,
    /// One-way arrows: terrain under them cannot be dug heading right
    NoDigRight,
}

impl ObjectKind {
    /// Stencil bits written over the object's region
    pub fn stencil_flags(self) -> StencilCell {
        match self {
            ObjectKind::Exit => StencilCell::EXIT,
            ObjectKind::TrapDrown => StencilCell::TRAP_DROWN,
            ObjectKind::TrapDie => StencilCell::TRAP_DIE,
            ObjectKind::TrapReplace => StencilCell::TRAP_REPLACE,
            ObjectKind::NoDigLeft => StencilCell::NO_DIG_LEFT,
            ObjectKind::NoDigRight => StencilCell::NO_DIG_RIGHT,
        }
    }

    /// Sound used when the level file does not name one
    pub fn default_sound(self) -> Option<Sound> {
        match self {
            ObjectKind::Exit => Some(Sound::Yippee),
            ObjectKind::TrapDrown => Some(Sound::Drown),
            ObjectKind::TrapDie => Some(Sound::Squish),
            ObjectKind::TrapReplace => Some(Sound::Fire),
            ObjectKind::NoDigLeft | ObjectKind::NoDigRight => None,
        }
    }
}

/// How a trap arbitrates repeated activations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Always active, no triggering needed
    #[default]
    Continuous,
    /// Fires exactly once per level
    OneShot,
    /// Fires, then stays busy for the given number of ticks
    Cooldown(u32),
}

#[derive(Debug, Clone)]
pub struct SpriteObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: i32,
    pub y: i32,
    image: RgbaImage,
    sound: Option<Sound>,
    trigger_mode: TriggerMode,
    times_fired: u32,
    busy_ticks: u32,
}

impl SpriteObject {
    pub fn new(
        id: ObjectId,
        kind: ObjectKind,
        x: i32,
        y: i32,
        image: RgbaImage,
        sound: Option<Sound>,
        trigger_mode: TriggerMode,
    ) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            image,
            sound,
            trigger_mode,
            times_fired: 0,
            busy_ticks: 0,
        }
    }

    /// Solid-colored object covering `w` x `h` pixels
    pub fn filled(
        id: ObjectId,
        kind: ObjectKind,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        color: Color,
    ) -> Self {
        let image = RgbaImage::from_pixel(w, h, Rgba(color));
        Self::new(id, kind, x, y, image, kind.default_sound(), TriggerMode::Continuous)
    }

    pub fn with_trigger_mode(mut self, mode: TriggerMode) -> Self {
        self.trigger_mode = mode;
        self
    }

    pub fn with_sound(mut self, sound: Option<Sound>) -> Self {
        self.sound = sound;
        self
    }

    pub fn set_trigger_mode(&mut self, mode: TriggerMode) {
        self.trigger_mode = mode;
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn sound(&self) -> Option<Sound> {
        self.sound
    }

    pub fn can_be_triggered(&self) -> bool {
        self.trigger_mode != TriggerMode::Continuous
    }

    pub fn times_fired(&self) -> u32 {
        self.times_fired
    }

    /// Try to fire the trap. Returns whether this activation takes effect.
    pub fn trigger(&mut self) -> bool {
        let fires = match self.trigger_mode {
            TriggerMode::Continuous => true,
            TriggerMode::OneShot => self.times_fired == 0,
            TriggerMode::Cooldown(ticks) => {
                if self.busy_ticks == 0 {
                    self.busy_ticks = ticks;
                    true
                } else {
                    false
                }
            }
        };
        if fires {
            self.times_fired += 1;
        }
        fires
    }

    /// Advance cooldown by one tick
    pub fn tick(&mut self) {
        self.busy_ticks = self.busy_ticks.saturating_sub(1);
    }

    /// Hide the image pixel covering level position (lx, ly), if any
    pub fn hide_pixel(&mut self, lx: i32, ly: i32) {
        let (ix, iy) = (lx - self.x, ly - self.y);
        if ix >= 0 && iy >= 0 && (ix as u32) < self.image.width() && (iy as u32) < self.image.height() {
            self.image.put_pixel(ix as u32, iy as u32, Rgba(TRANSPARENT));
        }
    }

    pub fn is_pixel_visible(&self, lx: i32, ly: i32) -> bool {
        let (ix, iy) = (lx - self.x, ly - self.y);
        ix >= 0
            && iy >= 0
            && (ix as u32) < self.image.width()
            && (iy as u32) < self.image.height()
            && self.image.get_pixel(ix as u32, iy as u32).0[3] != 0
    }
}

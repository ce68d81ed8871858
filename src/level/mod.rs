//! Level state shared by every agent: stencil, background, minimap, objects
//!
//! The level is built once from a [`LevelLayout`] (or programmatically in
//! tests) and then only mutated through terrain edits.

pub mod objects;

pub use objects::{ObjectKind, SpriteObject, TriggerMode};

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, SimError};
use crate::core::types::{Color, ObjectId, Sound};
use crate::terrain::{Minimap, Stencil, StencilCell};

/// Largest level the stencil id encoding and the runner are meant for
pub const MAX_LEVEL_WIDTH: u32 = 3200;
pub const MAX_LEVEL_HEIGHT: u32 = 640;

/// Per-level rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    /// Falls longer than this many pixels end in a splat
    pub max_fall_distance: i32,
    /// Color of builder steps
    pub debris_color: Color,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            max_fall_distance: 126,
            debris_color: [200, 128, 64, 255],
        }
    }
}

/// Terrain material of a layout rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Brick,
    Steel,
}

impl Material {
    fn stencil_flags(self) -> StencilCell {
        match self {
            Material::Brick => StencilCell::BRICK,
            Material::Steel => StencilCell::BRICK | StencilCell::STEEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainPlacement {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub material: Material,
    #[serde(default = "default_terrain_color")]
    pub color: Color,
}

fn default_terrain_color() -> Color {
    [150, 90, 40, 255]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub kind: ObjectKind,
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub trigger: TriggerMode,
    #[serde(default)]
    pub sound: Option<Sound>,
}

/// Parsed level description: size, terrain rectangles, objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub config: LevelConfig,
    #[serde(default)]
    pub terrain: Vec<TerrainPlacement>,
    #[serde(default)]
    pub objects: Vec<ObjectPlacement>,
}

impl LevelLayout {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone)]
pub struct Level {
    config: LevelConfig,
    pub(crate) stencil: Stencil,
    pub(crate) background: RgbaImage,
    pub(crate) minimap: Minimap,
    pub(crate) objects: Vec<SpriteObject>,
}

impl Level {
    /// Empty level of the given size
    pub fn new(width: u32, height: u32, config: LevelConfig, minimap_scale: u32) -> Self {
        let background = RgbaImage::new(width, height);
        let minimap = Minimap::from_background(&background, minimap_scale);
        Self {
            config,
            stencil: Stencil::new(width as usize, height as usize),
            background,
            minimap,
            objects: Vec::new(),
        }
    }

    /// Build a level from a parsed layout
    pub fn from_layout(layout: &LevelLayout, minimap_scale: u32) -> Result<Self> {
        if layout.width == 0 || layout.height == 0 {
            return Err(SimError::InvalidLevel("level size must be positive".into()));
        }
        if layout.width > MAX_LEVEL_WIDTH || layout.height > MAX_LEVEL_HEIGHT {
            return Err(SimError::InvalidLevel(format!(
                "level size {}x{} exceeds {}x{}",
                layout.width, layout.height, MAX_LEVEL_WIDTH, MAX_LEVEL_HEIGHT
            )));
        }
        if layout.objects.len() > u16::MAX as usize {
            return Err(SimError::InvalidLevel("too many objects".into()));
        }

        let mut level = Level::new(layout.width, layout.height, layout.config.clone(), minimap_scale);
        for placement in &layout.terrain {
            let rect = Rect::new(placement.x, placement.y, placement.w, placement.h);
            level.add_terrain(rect, placement.material, placement.color);
        }
        for placement in &layout.objects {
            let rect = Rect::new(placement.x, placement.y, placement.w, placement.h);
            let sound = placement.sound.or(placement.kind.default_sound());
            level.insert_object(placement.kind, rect, placement.trigger, sound);
        }

        tracing::info!(
            "Built level '{}' ({}x{}, {} terrain pieces, {} objects)",
            level.config.name,
            layout.width,
            layout.height,
            layout.terrain.len(),
            layout.objects.len()
        );
        Ok(level)
    }

    /// Load a TOML layout from disk
    pub fn load(path: &Path, minimap_scale: u32) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let layout = LevelLayout::from_toml_str(&content)?;
        Self::from_layout(&layout, minimap_scale)
    }

    pub fn width(&self) -> i32 {
        self.stencil.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.stencil.height() as i32
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn stencil(&self) -> &Stencil {
        &self.stencil
    }

    pub fn background(&self) -> &RgbaImage {
        &self.background
    }

    pub fn minimap(&self) -> &Minimap {
        &self.minimap
    }

    pub fn objects(&self) -> &[SpriteObject] {
        &self.objects
    }

    pub fn sprite_object(&self, id: ObjectId) -> Option<&SpriteObject> {
        self.objects.get(id.0 as usize)
    }

    pub fn sprite_object_mut(&mut self, id: ObjectId) -> Option<&mut SpriteObject> {
        self.objects.get_mut(id.0 as usize)
    }

    pub fn max_fall_distance(&self) -> i32 {
        self.config.max_fall_distance
    }

    pub fn debris_color(&self) -> Color {
        self.config.debris_color
    }

    /// Stamp a terrain rectangle into the stencil, background and minimap
    pub fn add_terrain(&mut self, rect: Rect, material: Material, color: Color) {
        let flags = material.stencil_flags();
        for y in rect.y..rect.y + rect.h as i32 {
            for x in rect.x..rect.x + rect.w as i32 {
                if let Some(pos) = self.stencil.index(x, y) {
                    self.stencil.or_mask(pos, flags);
                    self.background.put_pixel(x as u32, y as u32, Rgba(color));
                    self.minimap.update(x as u32, y as u32, color);
                }
            }
        }
    }

    /// Register an object and mark its region in the stencil
    pub fn add_object(&mut self, kind: ObjectKind, rect: Rect) -> ObjectId {
        self.insert_object(kind, rect, TriggerMode::Continuous, kind.default_sound())
    }

    fn insert_object(
        &mut self,
        kind: ObjectKind,
        rect: Rect,
        trigger: TriggerMode,
        sound: Option<Sound>,
    ) -> ObjectId {
        let id = ObjectId(self.objects.len() as u16);
        let color = match kind {
            ObjectKind::NoDigLeft | ObjectKind::NoDigRight => [60, 60, 255, 255],
            _ => [255, 255, 255, 255],
        };
        let object = SpriteObject::filled(id, kind, rect.x, rect.y, rect.w, rect.h, color)
            .with_trigger_mode(trigger)
            .with_sound(sound);
        let flags = kind.stencil_flags();
        for y in rect.y..rect.y + rect.h as i32 {
            for x in rect.x..rect.x + rect.w as i32 {
                if let Some(pos) = self.stencil.index(x, y) {
                    self.stencil.set_object(pos, flags, id);
                }
            }
        }
        self.objects.push(object);
        id
    }

    /// Advance trap cooldowns
    pub fn tick_objects(&mut self) {
        for object in &mut self.objects {
            object.tick();
        }
    }
}

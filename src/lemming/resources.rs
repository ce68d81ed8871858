//! Shared per-type animation and mask resources
//!
//! Resources are populated once, either procedurally ([`Resources::builtin`])
//! or from a directory of PNG strips described by a TOML manifest
//! ([`Resources::load`]). Agents only hold a type; everything else is looked
//! up here through [`LemmingType::resource_kind`](crate::lemming::LemmingType::resource_kind).

use image::imageops;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::config::EXPLOSION_UNITS;
use crate::core::error::{Result, SimError};
use crate::core::types::{Color, Direction};
use crate::lemming::ResourceKind;
use crate::terrain::Mask;

/// Manifest file expected inside a resource directory
pub const MANIFEST_FILE: &str = "resources.toml";

const SPRITE_WIDTH: u32 = 16;
const SPRITE_HEIGHT: u32 = 20;
const FOOT_X: i32 = 8;
const FOOT_Y: i32 = 20;
const HALF_HEIGHT: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    #[default]
    Loop,
    /// Plays once and holds the last frame
    Once,
}

/// A mask together with the offset between the agent's foot and the mask
/// origin
#[derive(Debug, Clone)]
pub struct PlacedMask {
    pub mask: Mask,
    pub anchor_x: i32,
    pub anchor_y: i32,
}

impl PlacedMask {
    pub fn new(mask: Mask, anchor_x: i32, anchor_y: i32) -> Self {
        Self { mask, anchor_x, anchor_y }
    }

    /// Level position of the mask origin for an agent standing at (x, y)
    pub fn origin(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.anchor_x, y - self.anchor_y)
    }
}

#[derive(Debug, Clone)]
pub struct LemmingResource {
    kind: ResourceKind,
    mode: AnimationMode,
    frame_count: usize,
    foot_x: i32,
    foot_y: i32,
    size: i32,
    width: u32,
    height: u32,
    /// `frames[direction][frame]`, one or two directions
    frames: Vec<Vec<RgbaImage>>,
    masks: Vec<PlacedMask>,
}

impl LemmingResource {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn last_frame(&self) -> usize {
        self.frame_count - 1
    }

    pub fn directions(&self) -> usize {
        self.frames.len()
    }

    pub fn foot_x(&self) -> i32 {
        self.foot_x
    }

    pub fn foot_y(&self) -> i32 {
        self.foot_y
    }

    /// Distance from the foot up to the agent's mid point
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_image(&self, dir: Direction, frame: usize) -> &RgbaImage {
        let frames = &self.frames[dir.index().min(self.frames.len() - 1)];
        &frames[frame % frames.len()]
    }

    /// Mask for the heading; single-direction masks serve both headings
    pub fn mask(&self, dir: Direction) -> Option<&PlacedMask> {
        if self.masks.is_empty() {
            return None;
        }
        self.masks.get(dir.index().min(self.masks.len() - 1))
    }
}

/// Immutable resource arena indexed by [`ResourceKind`]
#[derive(Debug, Clone)]
pub struct Resources {
    table: Vec<LemmingResource>,
    countdown: Vec<RgbaImage>,
    highlight: RgbaImage,
}

impl Resources {
    pub fn get(&self, kind: ResourceKind) -> &LemmingResource {
        &self.table[kind.index()]
    }

    /// Countdown digit shown above an armed agent, `value` in 1..=5
    pub fn countdown_digit(&self, value: u32) -> Option<&RgbaImage> {
        if value == 0 {
            return None;
        }
        self.countdown.get(value as usize - 1)
    }

    pub fn highlight(&self) -> &RgbaImage {
        &self.highlight
    }

    /// Procedural resource set: flat-colored sprites and geometric masks
    pub fn builtin() -> Self {
        let table = ResourceKind::ALL.iter().map(|&kind| builtin_resource(kind)).collect();
        Self {
            table,
            countdown: builtin_countdown(),
            highlight: builtin_highlight(),
        }
    }

    /// Load sprites and masks from `dir` as described by its manifest
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&manifest_path)?;
        let manifest = ResourceManifest::from_toml_str(&content)?;

        let mut table = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            let entry = manifest.entry(kind).ok_or_else(|| SimError::MissingResource {
                kind,
                path: manifest_path.display().to_string(),
            })?;
            table.push(entry.load(dir)?);
        }

        let countdown = match &manifest.countdown {
            Some(file) => split_strip(&open_image(dir, file)?, EXPLOSION_UNITS as usize)?,
            None => builtin_countdown(),
        };
        let highlight = match &manifest.highlight {
            Some(file) => open_image(dir, file)?,
            None => builtin_highlight(),
        };

        tracing::info!("Loaded {} lemming resources from {}", table.len(), dir.display());
        Ok(Self { table, countdown, highlight })
    }
}

/// Top-level manifest listing one entry per resource kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceManifest {
    /// Strip of the five countdown digits (1 first)
    #[serde(default)]
    pub countdown: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
}

impl ResourceManifest {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn entry(&self, kind: ResourceKind) -> Option<&ResourceEntry> {
        self.resources.iter().find(|entry| entry.kind == kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub kind: ResourceKind,
    /// Vertical strip: all left-facing frames, then all right-facing frames
    pub sprite: String,
    pub frames: usize,
    #[serde(default = "default_directions")]
    pub directions: usize,
    #[serde(default)]
    pub mode: AnimationMode,
    #[serde(default = "default_foot_x")]
    pub foot_x: i32,
    #[serde(default = "default_foot_y")]
    pub foot_y: i32,
    #[serde(default = "default_size")]
    pub size: i32,
    #[serde(default)]
    pub mask: Option<MaskEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskEntry {
    pub file: String,
    pub frames: usize,
    /// One anchor per direction (left first); a single anchor serves both
    pub anchors: Vec<[i32; 2]>,
}

fn default_directions() -> usize {
    2
}

fn default_foot_x() -> i32 {
    FOOT_X
}

fn default_foot_y() -> i32 {
    FOOT_Y
}

fn default_size() -> i32 {
    HALF_HEIGHT
}

impl ResourceEntry {
    fn load(&self, dir: &Path) -> Result<LemmingResource> {
        if self.frames == 0 {
            return Err(SimError::InvalidResource(format!("{:?} has no frames", self.kind)));
        }
        if !(1..=2).contains(&self.directions) {
            return Err(SimError::InvalidResource(format!(
                "{:?} must have one or two directions, got {}",
                self.kind, self.directions
            )));
        }

        let sprite_path = dir.join(&self.sprite);
        if !sprite_path.exists() {
            return Err(SimError::MissingResource {
                kind: self.kind,
                path: sprite_path.display().to_string(),
            });
        }
        let strip = image::open(&sprite_path)?.to_rgba8();
        let all = split_strip(&strip, self.frames * self.directions)?;
        let frames: Vec<Vec<RgbaImage>> = all.chunks(self.frames).map(|c| c.to_vec()).collect();

        let masks = match &self.mask {
            Some(entry) => entry.load(dir, self.kind)?,
            None if self.kind.needs_mask() => {
                return Err(SimError::MissingResource {
                    kind: self.kind,
                    path: format!("mask entry in {}", dir.join(MANIFEST_FILE).display()),
                });
            }
            None => Vec::new(),
        };

        Ok(LemmingResource {
            kind: self.kind,
            mode: self.mode,
            frame_count: self.frames,
            foot_x: self.foot_x,
            foot_y: self.foot_y,
            size: self.size,
            width: strip.width(),
            height: strip.height() / (self.frames * self.directions) as u32,
            frames,
            masks,
        })
    }
}

impl MaskEntry {
    fn load(&self, dir: &Path, kind: ResourceKind) -> Result<Vec<PlacedMask>> {
        if !(1..=2).contains(&self.anchors.len()) {
            return Err(SimError::InvalidResource(format!(
                "mask of {:?} needs one or two anchors",
                kind
            )));
        }
        let path = dir.join(&self.file);
        if !path.exists() {
            return Err(SimError::MissingResource {
                kind,
                path: path.display().to_string(),
            });
        }
        let strip = image::open(&path)?.to_rgba8();
        let parts = split_strip(&strip, self.anchors.len())?;
        parts
            .iter()
            .zip(&self.anchors)
            .map(|(part, [ax, ay])| Ok(PlacedMask::new(Mask::from_image(part, self.frames)?, *ax, *ay)))
            .collect()
    }
}

fn open_image(dir: &Path, file: &str) -> Result<RgbaImage> {
    Ok(image::open(dir.join(file))?.to_rgba8())
}

/// Cut a vertical strip into `count` equally tall images
fn split_strip(strip: &RgbaImage, count: usize) -> Result<Vec<RgbaImage>> {
    if count == 0 || strip.height() % count as u32 != 0 {
        return Err(SimError::InvalidResource(format!(
            "strip of height {} cannot be split into {} frames",
            strip.height(),
            count
        )));
    }
    let h = strip.height() / count as u32;
    Ok((0..count as u32)
        .map(|i| imageops::crop_imm(strip, 0, i * h, strip.width(), h).to_image())
        .collect())
}

// Builtin procedural set

struct BuiltinShape {
    frames: usize,
    mode: AnimationMode,
    directions: usize,
    color: Color,
}

fn builtin_shape(kind: ResourceKind) -> BuiltinShape {
    use AnimationMode::{Loop, Once};
    let (frames, mode, directions, color) = match kind {
        ResourceKind::Walker => (16, Loop, 2, [0, 176, 0, 255]),
        ResourceKind::Faller => (8, Loop, 2, [0, 176, 0, 255]),
        ResourceKind::Climber => (16, Loop, 2, [0, 176, 120, 255]),
        ResourceKind::ClimberToWalker => (16, Once, 2, [0, 176, 120, 255]),
        ResourceKind::Floater => (16, Loop, 2, [120, 176, 255, 255]),
        ResourceKind::Splat => (32, Once, 1, [200, 0, 0, 255]),
        ResourceKind::Stopper => (32, Loop, 1, [64, 64, 255, 255]),
        ResourceKind::Drowning => (32, Once, 1, [0, 96, 200, 255]),
        ResourceKind::Trapped => (2, Once, 1, [96, 0, 0, 255]),
        ResourceKind::Exiting => (16, Once, 1, [255, 255, 0, 255]),
        ResourceKind::Bomber => (32, Once, 1, [255, 96, 0, 255]),
        ResourceKind::Builder => (12, Loop, 2, [176, 120, 0, 255]),
        ResourceKind::BuilderEnd => (16, Once, 2, [176, 120, 0, 255]),
        ResourceKind::Digger => (16, Loop, 1, [120, 80, 40, 255]),
        ResourceKind::Basher => (32, Loop, 2, [160, 80, 40, 255]),
        ResourceKind::Miner => (24, Loop, 2, [140, 100, 60, 255]),
        ResourceKind::Jumper => (4, Loop, 2, [0, 176, 0, 255]),
    };
    BuiltinShape { frames, mode, directions, color }
}

fn builtin_resource(kind: ResourceKind) -> LemmingResource {
    let shape = builtin_shape(kind);
    let frames = (0..shape.directions)
        .map(|dir| (0..shape.frames).map(|frame| builtin_frame(shape.color, dir, frame)).collect())
        .collect();

    LemmingResource {
        kind,
        mode: shape.mode,
        frame_count: shape.frames,
        foot_x: FOOT_X,
        foot_y: FOOT_Y,
        size: HALF_HEIGHT,
        width: SPRITE_WIDTH,
        height: SPRITE_HEIGHT,
        frames,
        masks: builtin_masks(kind),
    }
}

/// Body block with a moving marker row so frames are distinguishable
fn builtin_frame(color: Color, dir: usize, frame: usize) -> RgbaImage {
    let mut img = RgbaImage::new(SPRITE_WIDTH, SPRITE_HEIGHT);
    for y in 4..SPRITE_HEIGHT {
        for x in 5..11 {
            img.put_pixel(x, y, Rgba(color));
        }
    }
    let marker_y = 4 + (frame as u32 % (SPRITE_HEIGHT - 4));
    let marker_x = if dir == 0 { 5 } else { 10 };
    img.put_pixel(marker_x, marker_y, Rgba([255, 255, 255, 255]));
    img
}

/// Mask geometry relative to the foot (x, y):
/// - builder step: 12x2 at rows y-2..=y-1 from the foot column forward
/// - basher: four frames reaching 12 to 18 columns ahead, rows y-19..=y-1
/// - miner: two frames in front reaching two rows below the foot
/// - digger: 16 columns around the foot, rows y..=y+1
/// - stopper: 18x20 zone centered on the foot column
/// - bomber: disc of radius 12 around (x, y-8)
fn builtin_masks(kind: ResourceKind) -> Vec<PlacedMask> {
    match kind {
        ResourceKind::Builder => {
            let step = Mask::from_fn(12, 2, 1, |_, _, _| true);
            vec![PlacedMask::new(step.clone(), 11, 2), PlacedMask::new(step, 0, 2)]
        }
        ResourceKind::Basher => {
            let reach = |frame: usize| 12 + 2 * frame as u32;
            let right = Mask::from_fn(18, 19, 4, |f, x, _| x < reach(f));
            let left = Mask::from_fn(18, 19, 4, |f, x, _| 17 - x < reach(f));
            vec![PlacedMask::new(left, 18, 19), PlacedMask::new(right, -1, 19)]
        }
        ResourceKind::Miner => {
            let span = |frame: usize| if frame == 0 { 0..10 } else { 4..14 };
            let right = Mask::from_fn(14, 20, 2, move |f, x, _| span(f).contains(&x));
            let left = Mask::from_fn(14, 20, 2, move |f, x, _| span(f).contains(&(13 - x)));
            vec![PlacedMask::new(left, 14, 18), PlacedMask::new(right, -1, 18)]
        }
        ResourceKind::Digger => vec![PlacedMask::new(Mask::from_fn(16, 2, 1, |_, _, _| true), 8, 0)],
        ResourceKind::Stopper => vec![PlacedMask::new(Mask::from_fn(18, 20, 1, |_, _, _| true), 9, 20)],
        ResourceKind::Bomber => {
            let disc = Mask::from_fn(25, 25, 1, |_, x, y| {
                let (dx, dy) = (x as i32 - 12, y as i32 - 12);
                dx * dx + dy * dy <= 144
            });
            vec![PlacedMask::new(disc, 12, 20)]
        }
        _ => Vec::new(),
    }
}

/// Digit n is drawn as n lit columns
fn builtin_countdown() -> Vec<RgbaImage> {
    (1..=EXPLOSION_UNITS)
        .map(|n| {
            let mut img = RgbaImage::new(8, 8);
            for x in 0..n.min(8) {
                for y in 1..7 {
                    img.put_pixel(x + 1, y, Rgba([255, 255, 255, 255]));
                }
            }
            img
        })
        .collect()
}

fn builtin_highlight() -> RgbaImage {
    let mut img = RgbaImage::new(SPRITE_WIDTH, SPRITE_HEIGHT);
    for x in 0..SPRITE_WIDTH {
        img.put_pixel(x, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(x, SPRITE_HEIGHT - 1, Rgba([255, 255, 255, 255]));
    }
    for y in 0..SPRITE_HEIGHT {
        img.put_pixel(0, y, Rgba([255, 255, 255, 255]));
        img.put_pixel(SPRITE_WIDTH - 1, y, Rgba([255, 255, 255, 255]));
    }
    img
}

//! Multi-frame collision masks stamped into the stencil
//!
//! A mask frame is a 0/1 pixel pattern. Stamping it at a position erases,
//! paints, queries or clears stencil bits under its set pixels. Each frame
//! carries a tolerance of `set_pixels / 3`: an erase that meets more
//! protected pixels than that reports failure so the caller can abort the
//! skill.

use image::RgbaImage;

use crate::core::error::{Result, SimError};
use crate::core::types::Color;
use crate::level::Level;
use crate::terrain::edit::TerrainEdit;
use crate::terrain::{Stencil, StencilCell};

#[derive(Debug, Clone, PartialEq, Eq)]
struct MaskFrame {
    /// Offsets of set pixels relative to the mask origin
    pixels: Vec<(i32, i32)>,
    tolerance: usize,
}

impl MaskFrame {
    fn new(pixels: Vec<(i32, i32)>) -> Self {
        let tolerance = pixels.len() / 3;
        Self { pixels, tolerance }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    frames: Vec<MaskFrame>,
}

impl Mask {
    /// Build a mask from a predicate `(frame, x, y) -> set`
    pub fn from_fn<F>(width: u32, height: u32, frame_count: usize, f: F) -> Self
    where
        F: Fn(usize, u32, u32) -> bool,
    {
        let frames = (0..frame_count.max(1))
            .map(|frame| {
                let mut pixels = Vec::new();
                for y in 0..height {
                    for x in 0..width {
                        if f(frame, x, y) {
                            pixels.push((x as i32, y as i32));
                        }
                    }
                }
                MaskFrame::new(pixels)
            })
            .collect();
        Self { width, height, frames }
    }

    /// Build a mask from a vertical strip of `frame_count` equally sized
    /// frames. Any pixel with non-zero alpha is set.
    pub fn from_image(image: &RgbaImage, frame_count: usize) -> Result<Self> {
        if frame_count == 0 {
            return Err(SimError::InvalidResource("mask needs at least one frame".into()));
        }
        if image.height() % frame_count as u32 != 0 {
            return Err(SimError::InvalidResource(format!(
                "mask height {} is not a multiple of {} frames",
                image.height(),
                frame_count
            )));
        }
        let frame_height = image.height() / frame_count as u32;
        Ok(Self::from_fn(image.width(), frame_height, frame_count, |frame, x, y| {
            image.get_pixel(x, frame as u32 * frame_height + y).0[3] != 0
        }))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, frame: usize) -> &MaskFrame {
        &self.frames[frame % self.frames.len()]
    }

    /// Maximum protected pixels an erase of this frame may meet
    pub fn tolerance(&self, frame: usize) -> usize {
        self.frame(frame).tolerance
    }

    pub fn set_pixel_count(&self, frame: usize) -> usize {
        self.frame(frame).pixels.len()
    }

    /// Absolute level positions covered by a frame stamped at (x, y)
    fn region(&self, x: i32, y: i32, frame: usize) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.frame(frame).pixels.iter().map(move |&(dx, dy)| (x + dx, y + dy))
    }

    /// Erase terrain under the frame. Returns true when more protected pixels
    /// were met than the frame tolerates.
    pub fn erase(&self, level: &mut Level, x: i32, y: i32, frame: usize, protect: StencilCell) -> bool {
        let outcome = level.apply_terrain_edit(self.region(x, y, frame), TerrainEdit::Erase { protect });
        outcome.protected > self.tolerance(frame)
    }

    /// Paint one builder step
    pub fn paint_step(&self, level: &mut Level, x: i32, y: i32, frame: usize, color: Color) {
        level.apply_terrain_edit(self.region(x, y, frame), TerrainEdit::PaintStep { color });
    }

    /// Stamp a stopper zone split at `foot_x`
    pub fn set_stopper(&self, level: &mut Level, x: i32, y: i32, foot_x: i32) {
        level.apply_terrain_edit(self.region(x, y, 0), TerrainEdit::SetStopper { foot_x });
    }

    /// Remove `bits` under the frame
    pub fn clear(&self, level: &mut Level, x: i32, y: i32, frame: usize, bits: StencilCell) {
        level.apply_terrain_edit(self.region(x, y, frame), TerrainEdit::Clear { bits });
    }

    /// True iff any covered cell intersects `test`
    pub fn check(&self, stencil: &Stencil, x: i32, y: i32, frame: usize, test: StencilCell) -> bool {
        self.region(x, y, frame)
            .filter_map(|(px, py)| stencil.get_xy(px, py))
            .any(|cell| cell.intersects(test))
    }

    /// Number of covered cells intersecting `test`
    pub fn count(&self, stencil: &Stencil, x: i32, y: i32, frame: usize, test: StencilCell) -> usize {
        self.region(x, y, frame)
            .filter_map(|(px, py)| stencil.get_xy(px, py))
            .filter(|cell| cell.intersects(test))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelConfig, Material, Rect};
    use image::Rgba;

    fn solid_mask(w: u32, h: u32) -> Mask {
        Mask::from_fn(w, h, 1, |_, _, _| true)
    }

    fn floor_level() -> Level {
        let mut level = Level::new(64, 32, LevelConfig::default(), 16);
        level.add_terrain(Rect::new(0, 16, 64, 16), Material::Brick, [120, 60, 20, 255]);
        level
    }

    #[test]
    fn test_tolerance_is_third_of_set_pixels() {
        let mask = Mask::from_fn(4, 4, 2, |frame, x, _| frame == 0 || x < 2);
        assert_eq!(mask.set_pixel_count(0), 16);
        assert_eq!(mask.tolerance(0), 5);
        assert_eq!(mask.set_pixel_count(1), 8);
        assert_eq!(mask.tolerance(1), 2);
    }

    #[test]
    fn test_from_image_strip() {
        let mut img = RgbaImage::new(3, 4);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 2, Rgba([255, 255, 255, 255]));
        img.put_pixel(2, 3, Rgba([255, 255, 255, 255]));

        let mask = Mask::from_image(&img, 2).unwrap();
        assert_eq!(mask.height(), 2);
        assert_eq!(mask.set_pixel_count(0), 1);
        assert_eq!(mask.set_pixel_count(1), 2);
    }

    #[test]
    fn test_from_image_rejects_uneven_strip() {
        let img = RgbaImage::new(3, 5);
        assert!(Mask::from_image(&img, 2).is_err());
        assert!(Mask::from_image(&img, 0).is_err());
    }

    #[test]
    fn test_erase_clears_terrain_only() {
        let mut level = floor_level();
        let pos = level.stencil().index(10, 17).unwrap();
        level.stencil.or_mask(pos, StencilCell::BLOCK_LEFTWARD);

        let mask = solid_mask(4, 4);
        let exceeded = mask.erase(&mut level, 8, 16, 0, StencilCell::STEEL);
        assert!(!exceeded);
        let cell = level.stencil().get(pos);
        assert!(!cell.is_solid());
        assert!(cell.contains(StencilCell::BLOCK_LEFTWARD));
    }

    #[test]
    fn test_erase_reports_exceeded_tolerance() {
        let mut level = floor_level();
        // 16-pixel mask, tolerance 5
        let mask = solid_mask(4, 4);

        level.add_terrain(Rect::new(0, 16, 5, 1), Material::Steel, [0, 0, 0, 255]);
        // 4 steel pixels under the mask: within tolerance
        assert!(!mask.erase(&mut level, 0, 16, 0, StencilCell::STEEL));

        level.add_terrain(Rect::new(20, 16, 4, 2), Material::Steel, [0, 0, 0, 255]);
        // 8 steel pixels: over tolerance
        assert!(mask.erase(&mut level, 20, 16, 0, StencilCell::STEEL));
        // Non-steel part was still erased
        assert!(!level.stencil().get_xy(21, 19).unwrap().is_solid());
    }

    #[test]
    fn test_erase_over_empty_is_noop() {
        let mut level = floor_level();
        let before: Vec<_> = (0..16 * 64).map(|pos| level.stencil().get(pos)).collect();
        let mask = solid_mask(8, 8);
        assert!(!mask.erase(&mut level, 10, 2, 0, StencilCell::STEEL));
        let after: Vec<_> = (0..16 * 64).map(|pos| level.stencil().get(pos)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_erase_clips_at_bounds() {
        let mut level = floor_level();
        let mask = solid_mask(8, 8);
        assert!(!mask.erase(&mut level, -4, 28, 0, StencilCell::STEEL));
        assert!(!mask.erase(&mut level, 60, -4, 0, StencilCell::STEEL));
        assert!(!level.stencil().get_xy(0, 31).unwrap().is_solid());
    }

    #[test]
    fn test_set_stopper_split() {
        let mut level = floor_level();
        let mask = solid_mask(6, 2);
        mask.set_stopper(&mut level, 10, 4, 12);

        for x in 10..=12 {
            let cell = level.stencil().get_xy(x, 4).unwrap();
            assert!(cell.contains(StencilCell::BLOCK_RIGHTWARD));
            assert!(!cell.contains(StencilCell::BLOCK_LEFTWARD));
        }
        for x in 13..16 {
            let cell = level.stencil().get_xy(x, 5).unwrap();
            assert!(cell.contains(StencilCell::BLOCK_LEFTWARD));
            assert!(!cell.contains(StencilCell::BLOCK_RIGHTWARD));
        }
    }

    #[test]
    fn test_check_and_clear() {
        let mut level = floor_level();
        let mask = solid_mask(4, 4);
        assert!(!mask.check(level.stencil(), 0, 0, 0, StencilCell::STOPPER));

        mask.set_stopper(&mut level, 0, 0, 1);
        assert!(mask.check(level.stencil(), 2, 2, 0, StencilCell::STOPPER));
        assert_eq!(mask.count(level.stencil(), 0, 0, 0, StencilCell::STOPPER), 16);

        mask.clear(&mut level, 0, 0, 0, StencilCell::STOPPER);
        assert!(!mask.check(level.stencil(), 0, 0, 0, StencilCell::STOPPER));
    }

    #[test]
    fn test_paint_step() {
        let mut level = floor_level();
        let mask = solid_mask(12, 2);
        mask.paint_step(&mut level, 4, 14, 0, [9, 9, 9, 255]);
        let cell = level.stencil().get_xy(10, 15).unwrap();
        assert!(cell.contains(StencilCell::STAIR));
        assert_eq!(level.background().get_pixel(10, 15).0, [9, 9, 9, 255]);
    }
}

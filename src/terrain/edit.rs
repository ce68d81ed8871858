//! Single terrain edit path over the three terrain views
//!
//! Stencil, background image and minimap are always changed together here,
//! so mask operations cannot leave them out of sync.

use image::Rgba;

use crate::core::types::{Color, TRANSPARENT};
use crate::level::Level;
use crate::terrain::StencilCell;

/// Effect applied to every pixel of an edit region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainEdit {
    /// Remove terrain unless the cell carries any `protect` bit
    Erase { protect: StencilCell },
    /// Add builder stair terrain on empty cells
    PaintStep { color: Color },
    /// Stopper zone: pixels at x <= foot_x turn right-movers, others left-movers
    SetStopper { foot_x: i32 },
    /// Remove arbitrary bits
    Clear { bits: StencilCell },
}

/// Counters gathered while applying an edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditOutcome {
    /// Pixels whose stencil cell changed
    pub changed: usize,
    /// Pixels skipped because of protection bits
    pub protected: usize,
}

impl Level {
    /// Apply `edit` to every pixel in `region`. Pixels outside the level are
    /// skipped.
    pub fn apply_terrain_edit<I>(&mut self, region: I, edit: TerrainEdit) -> EditOutcome
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut outcome = EditOutcome::default();

        for (x, y) in region {
            let Some(pos) = self.stencil.index(x, y) else {
                continue;
            };
            let cell = self.stencil.get(pos);

            match edit {
                TerrainEdit::Erase { protect } => {
                    if cell.intersects(protect) {
                        outcome.protected += 1;
                        continue;
                    }
                    if !cell.is_solid() {
                        continue;
                    }
                    if cell.intersects(StencilCell::NO_DIG) {
                        if let Some(id) = cell.object_id() {
                            if let Some(object) = self.sprite_object_mut(id) {
                                object.hide_pixel(x, y);
                            }
                        }
                    }
                    self.stencil.clear_bits(pos, StencilCell::TERRAIN);
                    self.background.put_pixel(x as u32, y as u32, Rgba(TRANSPARENT));
                    self.minimap.clear_pixel(x as u32, y as u32);
                    outcome.changed += 1;
                }
                TerrainEdit::PaintStep { color } => {
                    if cell.is_solid() {
                        continue;
                    }
                    self.stencil.or_mask(pos, StencilCell::BRICK | StencilCell::STAIR);
                    self.background.put_pixel(x as u32, y as u32, Rgba(color));
                    self.minimap.update(x as u32, y as u32, color);
                    outcome.changed += 1;
                }
                TerrainEdit::SetStopper { foot_x } => {
                    let flag = if x <= foot_x {
                        StencilCell::BLOCK_RIGHTWARD
                    } else {
                        StencilCell::BLOCK_LEFTWARD
                    };
                    self.stencil.or_mask(pos, flag);
                    outcome.changed += 1;
                }
                TerrainEdit::Clear { bits } => {
                    if cell.intersects(bits) {
                        self.stencil.clear_bits(pos, bits);
                        outcome.changed += 1;
                    }
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelConfig, Material, ObjectKind, Rect};

    fn level_with_floor() -> Level {
        let mut level = Level::new(32, 32, LevelConfig::default(), 16);
        level.add_terrain(Rect::new(0, 16, 32, 16), Material::Brick, [100, 50, 0, 255]);
        level
    }

    #[test]
    fn test_erase_updates_all_views() {
        let mut level = level_with_floor();
        let outcome = level.apply_terrain_edit(
            [(16, 16), (17, 16)],
            TerrainEdit::Erase { protect: StencilCell::STEEL },
        );
        assert_eq!(outcome.changed, 2);
        assert!(!level.stencil().get_xy(16, 16).unwrap().is_solid());
        assert_eq!(level.background().get_pixel(16, 16).0, TRANSPARENT);
        // (16, 16) sits on the minimap grid
        assert_eq!(level.minimap().image().get_pixel(1, 1).0, TRANSPARENT);
    }

    #[test]
    fn test_erase_skips_protected() {
        let mut level = level_with_floor();
        level.add_terrain(Rect::new(4, 16, 2, 1), Material::Steel, [80, 80, 80, 255]);
        let outcome = level.apply_terrain_edit(
            [(4, 16), (5, 16), (6, 16)],
            TerrainEdit::Erase { protect: StencilCell::STEEL },
        );
        assert_eq!(outcome.protected, 2);
        assert_eq!(outcome.changed, 1);
        assert!(level.stencil().get_xy(4, 16).unwrap().is_solid());
    }

    #[test]
    fn test_erase_hides_marker_pixels() {
        let mut level = level_with_floor();
        let id = level.add_object(ObjectKind::NoDigLeft, Rect::new(8, 16, 4, 4));
        level.apply_terrain_edit([(9, 17)], TerrainEdit::Erase { protect: StencilCell::STEEL });

        let marker = level.sprite_object(id).unwrap();
        assert!(!marker.is_pixel_visible(9, 17));
        assert!(marker.is_pixel_visible(8, 16));
        // The no-dig flag itself survives; only terrain is removed
        let cell = level.stencil().get_xy(9, 17).unwrap();
        assert!(cell.contains(StencilCell::NO_DIG_LEFT));
        assert!(!cell.is_solid());
    }

    #[test]
    fn test_paint_step_only_on_empty() {
        let mut level = level_with_floor();
        let outcome = level.apply_terrain_edit(
            [(3, 15), (3, 16)],
            TerrainEdit::PaintStep { color: [1, 2, 3, 255] },
        );
        assert_eq!(outcome.changed, 1);
        let cell = level.stencil().get_xy(3, 15).unwrap();
        assert!(cell.contains(StencilCell::BRICK | StencilCell::STAIR));
        assert_eq!(level.background().get_pixel(3, 15).0, [1, 2, 3, 255]);
        assert_eq!(level.background().get_pixel(3, 16).0, [100, 50, 0, 255]);
    }

    #[test]
    fn test_out_of_range_region_ignored() {
        let mut level = level_with_floor();
        let outcome = level.apply_terrain_edit(
            [(-1, 0), (0, -1), (32, 0), (0, 32)],
            TerrainEdit::Clear { bits: StencilCell::all() },
        );
        assert_eq!(outcome, EditOutcome::default());
    }
}

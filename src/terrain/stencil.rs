//! Per-pixel terrain bitmask
//!
//! Every level pixel carries a [`StencilCell`]: independent bit groups for
//! terrain category, steel, directional no-dig flags, trap/exit regions,
//! one-way stopper zones, and the id of the sprite object that owns the pixel.

use ahash::AHashMap;
use bitflags::bitflags;

use crate::core::types::ObjectId;

bitflags! {
    /// Bit groups of a single stencil pixel. The upper 16 bits hold the
    /// owning object id and are not named flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StencilCell: u32 {
        const BRICK = 1 << 0;
        const STAIR = 1 << 1;
        const STEEL = 1 << 2;
        /// Cannot be dug by an agent heading left
        const NO_DIG_LEFT = 1 << 3;
        /// Cannot be dug by an agent heading right
        const NO_DIG_RIGHT = 1 << 4;
        const TRAP_DROWN = 1 << 5;
        const TRAP_DIE = 1 << 6;
        const TRAP_REPLACE = 1 << 7;
        const EXIT = 1 << 8;
        /// Stopper zone turning agents that head right
        const BLOCK_RIGHTWARD = 1 << 9;
        /// Stopper zone turning agents that head left
        const BLOCK_LEFTWARD = 1 << 10;

        const TERRAIN = Self::BRICK.bits() | Self::STAIR.bits();
        const NO_DIG = Self::NO_DIG_LEFT.bits() | Self::NO_DIG_RIGHT.bits();
        const TRAP = Self::TRAP_DROWN.bits() | Self::TRAP_DIE.bits() | Self::TRAP_REPLACE.bits();
        const STOPPER = Self::BLOCK_RIGHTWARD.bits() | Self::BLOCK_LEFTWARD.bits();
        /// Groups that carry an owning object id
        const OWNED = Self::TRAP.bits() | Self::EXIT.bits() | Self::NO_DIG.bits();
    }
}

const OBJECT_ID_SHIFT: u32 = 16;
const OBJECT_ID_MASK: u32 = 0xffff << OBJECT_ID_SHIFT;

impl StencilCell {
    /// Owning object id, if any owned bit group is present
    pub fn object_id(self) -> Option<ObjectId> {
        if self.intersects(StencilCell::OWNED) {
            Some(ObjectId((self.bits() >> OBJECT_ID_SHIFT) as u16))
        } else {
            None
        }
    }

    /// Same cell with the object id bits replaced
    pub fn with_object_id(self, id: ObjectId) -> Self {
        let bits = (self.bits() & !OBJECT_ID_MASK) | ((id.0 as u32) << OBJECT_ID_SHIFT);
        StencilCell::from_bits_retain(bits)
    }

    pub fn is_solid(self) -> bool {
        self.intersects(StencilCell::TERRAIN)
    }
}

/// Dense stencil over the whole level bitmap
#[derive(Debug, Clone)]
pub struct Stencil {
    width: usize,
    height: usize,
    cells: Vec<StencilCell>,
    /// Every object covering a pixel; the cell itself only keeps the last one
    owners: AHashMap<usize, Vec<ObjectId>>,
}

impl Stencil {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![StencilCell::empty(); width * height],
            owners: AHashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True iff the terrain category is empty (no brick, no stair)
    #[inline]
    pub fn walkable(cell: StencilCell) -> bool {
        !cell.is_solid()
    }

    /// Linear index of a pixel, or None outside the level
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Bounds-checked read
    #[inline]
    pub fn get_xy(&self, x: i32, y: i32) -> Option<StencilCell> {
        self.index(x, y).map(|pos| self.cells[pos])
    }

    /// Raw read; `pos` must be a valid index
    #[inline]
    pub fn get(&self, pos: usize) -> StencilCell {
        self.cells[pos]
    }

    #[inline]
    pub fn set(&mut self, pos: usize, cell: StencilCell) {
        self.cells[pos] = cell;
    }

    /// Keep only the bits of `mask`
    #[inline]
    pub fn and_mask(&mut self, pos: usize, mask: StencilCell) {
        let kept = self.cells[pos].bits() & mask.bits();
        self.cells[pos] = StencilCell::from_bits_retain(kept);
    }

    #[inline]
    pub fn or_mask(&mut self, pos: usize, mask: StencilCell) {
        let merged = self.cells[pos].bits() | mask.bits();
        self.cells[pos] = StencilCell::from_bits_retain(merged);
    }

    /// Remove `mask` bits, leaving every other group intact
    #[inline]
    pub fn clear_bits(&mut self, pos: usize, mask: StencilCell) {
        self.and_mask(pos, StencilCell::from_bits_retain(!mask.bits()));
    }

    /// Mark a pixel as owned by an object with the given flags
    pub fn set_object(&mut self, pos: usize, flags: StencilCell, id: ObjectId) {
        self.or_mask(pos, flags);
        self.cells[pos] = self.cells[pos].with_object_id(id);
        let owners = self.owners.entry(pos).or_default();
        if !owners.contains(&id) {
            owners.push(id);
        }
    }

    /// Single owner used by the simulation hot path
    pub fn object_id(&self, pos: usize) -> Option<ObjectId> {
        self.cells[pos].object_id()
    }

    /// Every object whose region covers this pixel
    pub fn object_ids_at(&self, pos: usize) -> Vec<ObjectId> {
        self.owners.get(&pos).cloned().unwrap_or_default()
    }

    /// Fill an axis-aligned rectangle, clipped to the level
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, flags: StencilCell) {
        for yy in y..y + h {
            for xx in x..x + w {
                if let Some(pos) = self.index(xx, yy) {
                    self.or_mask(pos, flags);
                }
            }
        }
    }
}

//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter
pub type Tick = u64;

/// RGBA color as stored in the background image
pub type Color = [u8; 4];

/// Fully transparent black, used for erased background pixels
pub const TRANSPARENT: Color = [0, 0, 0, 0];

/// Identifier of a sprite object placed in the level (trap, exit, marker)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u16);

/// Heading of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
    None,
}

impl Direction {
    /// Horizontal unit step: -1, 1 or 0
    pub fn dx(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::None => 0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    /// Index into per-direction resource tables (left = 0, right = 1)
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right | Direction::None => 1,
        }
    }
}

/// Sounds the simulation asks the audio collaborator to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// "Oh no" before an armed agent explodes
    OhNo,
    Explode,
    /// Digging tool hit indestructible terrain
    Steel,
    /// Builder is running out of bricks
    Ting,
    Yippee,
    Splat,
    Die,
    Drown,
    Squish,
    Fire,
    Electric,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_reverse() {
        assert_eq!(Direction::Left.reversed(), Direction::Right);
        assert_eq!(Direction::Right.reversed(), Direction::Left);
        assert_eq!(Direction::None.reversed(), Direction::None);
    }

    #[test]
    fn test_direction_step() {
        assert_eq!(Direction::Left.dx(), -1);
        assert_eq!(Direction::Right.dx(), 1);
        assert_eq!(Direction::None.dx(), 0);
    }

    #[test]
    fn test_object_id_ordering() {
        assert!(ObjectId(1) < ObjectId(2));
        assert_eq!(ObjectId(3), ObjectId(3));
    }
}

//! Agent movement and probe constants - all tunable values in one place
//!
//! Distances are level pixels, frame numbers are animation frames at the
//! doubled tick rate.

// Walking
pub const WALKER_STEP: i32 = 1;
pub const WALKER_OBSTACLE_HEIGHT: i32 = 14; // wall: climb or turn
pub const JUMPER_MIN_OBSTACLE: i32 = 4;
pub const JUMPER_STEP: i32 = 2;

// Falling
pub const FALL_DISTANCE_FALL: i32 = 8; // walker turns faller above this gap
pub const FALLER_STEP: i32 = 3;
pub const FALL_DISTANCE_FLOAT: i32 = 32; // umbrella opens after this drop
pub const FLOATER_STEP: i32 = 2;
pub const FLOATER_START_STEPS: [i32; 8] = [6, 5, 4, 4, 3, 3, 2, 2];

// Climbing
pub const CLIMBER_HAND_HEIGHT: i32 = 10;
pub const LEMMING_HEIGHT: i32 = 20;

// Building
pub const BUILDER_STEPS: u32 = 12;
pub const BUILDER_STAMP_FRAME: usize = 6;
pub const BUILDER_STEP_X: i32 = 4;
pub const BUILDER_STEP_Y: i32 = 2;
pub const BUILDER_WARN_FROM_STEP: u32 = 9;
/// Ceiling probe rows above the foot after a builder step
pub const BUILDER_CEILING_TOP: i32 = LEMMING_HEIGHT;
pub const BUILDER_CEILING_BOTTOM: i32 = 11;

// Bashing
pub const BASHER_ERASE_FRAMES: [usize; 4] = [2, 4, 18, 20];
pub const BASHER_MOVE_FRAMES: [usize; 4] = [10, 11, 26, 27];
pub const BASHER_PROBE_NEAR: i32 = 16;
pub const BASHER_PROBE_FAR: i32 = 24;
pub const BASHER_PROBE_ROWS: i32 = 19;
pub const BASHER_FALL_DISTANCE: i32 = 6;

// Mining
pub const MINER_ERASE_FRAMES: [usize; 2] = [0, 1];
pub const MINER_MOVE_FRAMES: [usize; 2] = [3, 15];
pub const MINER_STEP_X: i32 = 4;
pub const MINER_STEP_Y: i32 = 1;
pub const MINER_FALL_DISTANCE: i32 = 4;

// Digging
pub const DIGGER_STEP: i32 = 2;
pub const DIGGER_PROBE_LEFT: i32 = 5;
pub const DIGGER_PROBE_RIGHT: i32 = 6;
pub const DIGGER_FALL_WINDOW: i32 = 8;

// Stopper
pub const STOPPER_FALL_WINDOW: i32 = 8;

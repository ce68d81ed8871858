//! Lemming Sim - agents walking and tunneling through a destructible
//! pixel terrain

pub mod core;
pub mod lemming;
pub mod level;
pub mod simulation;
pub mod terrain;

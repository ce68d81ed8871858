//! Destructible terrain: stencil bitmask, collision masks and the edit path
//! that keeps stencil, background and minimap in step.

pub mod edit;
pub mod mask;
pub mod minimap;
pub mod stencil;

pub use edit::{EditOutcome, TerrainEdit};
pub use mask::Mask;
pub use minimap::Minimap;
pub use stencil::{Stencil, StencilCell};

// ABOUTME: Surface module - where embedded applications are rendered.
// ABOUTME: Defines the container/frame traits and an in-memory surface.

mod memory;
mod traits;

pub use memory::*;
pub use traits::*;

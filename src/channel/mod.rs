// ABOUTME: Channel module - the cross-boundary message protocol between the
// ABOUTME: host and embedded frames, and the transport capability.

mod message;
mod traits;

pub use message::*;
pub use traits::*;

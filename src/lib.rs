// ABOUTME: Root module for frameboard - coordination of embedded applications.
// ABOUTME: Re-exports all public types from submodules.

pub mod app;
pub mod channel;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod notify;
pub mod prelude;
pub mod surface;
pub mod timer;

pub use error::FrameboardError;

// ABOUTME: Notify module - the presentation layer's view of coordinator events.
// ABOUTME: Notices, the Notifier trait, logging and history implementations.

mod history;
mod notice;

pub use history::*;
pub use notice::*;

// ABOUTME: App module - records for embedded applications and the merge algebra.
// ABOUTME: Pure data; no rendering or timing concerns live here.

mod record;
mod version;

pub use record::*;
pub use version::*;

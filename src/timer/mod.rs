// ABOUTME: Timer module - the deferred-callback and time-source capabilities.
// ABOUTME: Ships a tokio-backed scheduler and a virtual-clock one for tests.

mod manual;
mod scheduler;
mod tokio_scheduler;

pub use manual::ManualScheduler;
pub use scheduler::*;
pub use tokio_scheduler::TokioScheduler;

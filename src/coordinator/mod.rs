// ABOUTME: Coordinator module - the registry of embedded applications, the
// ABOUTME: liveness handshake and the convergence poller.

mod config;
mod coordinator;
mod liveness;
mod poll;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use poll::PollStatus;

#[cfg(test)]
mod liveness_test;
#[cfg(test)]
mod test_support;

//! Scheduler Module
//!
//! Starts replication jobs and waits on their progress.

pub mod dispatcher;
pub mod poller;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::JobDispatcher;
pub use poller::{PhasePoller, PollExit, PollerConfig};

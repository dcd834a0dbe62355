//! Invocation deadlines
//!
//! Every wait in Ferry is bounded by the remaining budget of the outermost
//! invocation rather than by an internal timer.

use std::time::Duration;
use tokio::time::Instant;

/// Absolute point in time by which the current invocation must finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

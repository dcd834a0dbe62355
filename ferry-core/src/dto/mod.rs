//! Data Transfer Objects for inter-service communication
//!
//! This module contains the wire shapes Ferry exchanges with its external
//! collaborators: the job runner, the delivery queue and the record store.

pub mod job;
pub mod queue;
pub mod record;

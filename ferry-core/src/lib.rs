//! Ferry Core
//!
//! Core types and abstractions for Ferry, the cross-registry image
//! replication pipeline.
//!
//! This crate contains:
//! - Domain types: phases, job snapshots, directives, batches, failure sets
//! - DTOs: wire shapes exchanged with the job runner, queue and record store
//! - Deadlines: invocation budgets passed down to every polling operation

pub mod deadline;
pub mod domain;
pub mod dto;

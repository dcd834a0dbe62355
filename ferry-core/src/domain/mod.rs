//! Core domain types
//!
//! This module contains the core domain structures used across Ferry services.
//! They are shared between the orchestrator (which captures batches and
//! supervises jobs) and the runner (which replicates the images).

pub mod batch;
pub mod directive;
pub mod event;
pub mod failure;
pub mod job;
pub mod phase;

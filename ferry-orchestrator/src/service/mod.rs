//! Service Module
//!
//! Business logic layer for the orchestrator.

pub mod batch;
pub mod ingress;

// Re-export for convenience
pub use batch as batch_service;
pub use ingress as ingress_service;

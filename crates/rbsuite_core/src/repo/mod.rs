//! Repository layer over the SQLite project store.
//!
//! # Responsibility
//! - Define the persistence contract the workflow service depends on.
//! - Keep SQL details out of service and workflow code.
//!
//! # Invariants
//! - Repository writes enforce `Project::validate()` before persistence.
//! - Status changes are conditioned on the status the caller read.

pub mod project_repo;

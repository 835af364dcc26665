//! Project workflow state machine.
//!
//! # Responsibility
//! - Evaluate data-completeness requirements against a project snapshot.
//! - Hold the static transition policy (next status, roles, requirements).
//! - Decide and apply status transitions for an explicitly passed role.
//!
//! # Invariants
//! - Everything here is pure and synchronous; persistence and event delivery
//!   belong to callers (see `service::workflow_service`).
//! - The lifecycle is a linear chain from `draft` to `archived` with no cycles.

pub mod engine;
pub mod event;
pub mod requirement;
pub mod table;

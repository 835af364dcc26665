//! Domain model for the project workflow core.
//!
//! # Responsibility
//! - Define project/task/role records consumed by the workflow engine.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every project is identified by a stable, non-nil `ProjectId`.
//! - Nothing in this module mutates `Project::status`; only the workflow
//!   engine does.

pub mod project;
pub mod role;
pub mod task;

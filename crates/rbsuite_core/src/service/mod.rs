//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and workflow decisions.
//! - Keep API/UI callers decoupled from storage details.

pub mod workflow_service;

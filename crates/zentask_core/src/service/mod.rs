//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into optimistic, rollback-safe task mutations.
//! - Keep UI layers decoupled from storage and reconciliation details.

pub mod task_service;

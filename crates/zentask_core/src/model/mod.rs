//! Canonical task domain model.
//!
//! # Responsibility
//! - Define the single `Task` shape shared by every store backend and view.
//! - Keep identity and creation-time fields immutable after construction.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` that is never reused.
//! - `created_at` is the ordering anchor for all newest-first views.

pub mod task;

//! Task store contracts and backend implementations.
//!
//! # Responsibility
//! - Define the persistence contract the reconciliation engine depends on.
//! - Isolate blob/HTTP details from engine orchestration.
//!
//! # Invariants
//! - `create_many` is atomic as observed by the caller: a backend that can
//!   only partially succeed must surface that as one failure so the engine
//!   may roll back the entire batch.
//! - Read failures are `Unavailable`, write failures are `WriteRejected`;
//!   the engine maps the former to an empty startup state and the latter to
//!   a compensating rollback.

pub mod local;
pub mod remote;

use crate::model::task::{Category, Priority, Task, TaskId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failures surfaced to the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Read path: the backend cannot be reached or its payload parsed.
    Unavailable(String),
    /// Write path: the mutation was not persisted; nothing was written.
    WriteRejected(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::WriteRejected(message) => write!(f, "store write rejected: {message}"),
        }
    }
}

impl Error for StoreError {}

/// Partial update: only `Some` fields are written, the rest stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TaskPatch {
    /// Patch touching only the `completed` column.
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Applies the supplied fields to a task in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
    }
}

/// Persistence contract for task storage backends.
///
/// # Contract
/// - `load_all` returns every persisted task; ordering is backend-defined.
/// - Write operations either fully persist or reject without partial writes.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn load_all(&self) -> StoreResult<Vec<Task>>;
    async fn create_one(&self, task: &Task) -> StoreResult<()>;
    async fn create_many(&self, tasks: &[Task]) -> StoreResult<()>;
    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<()>;
    async fn delete_one(&self, id: TaskId) -> StoreResult<()>;
}

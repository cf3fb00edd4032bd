//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted by every store backend.
//! - Provide draft validation for user-supplied creation input.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `created_at` never changes after creation; it is the sort key for
//!   newest-first views and the re-insertion anchor for delete rollback.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for every task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Task urgency bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Life-area bucket for filtering and dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Work,
    Shopping,
    Health,
    Finance,
}

/// Canonical task record.
///
/// Field encoding matches the remote table columns one-to-one so a single
/// serde shape can serve both the local blob and the remote row boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for reconciliation rollback targeting.
    pub id: TaskId,
    /// Non-empty short description of the work.
    pub title: String,
    /// Optional longer body.
    pub description: Option<String>,
    /// Calendar date the task is due, no time component.
    pub due_date: NaiveDate,
    pub completed: bool,
    pub priority: Priority,
    pub category: Category,
    /// Unix epoch milliseconds, assigned once at creation.
    pub created_at: i64,
}

/// User intent for creating a task; identity fields are synthesized later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub category: Category,
}

/// Validation failures for task drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

impl TaskDraft {
    /// Rejects drafts that must never reach the canonical collection.
    ///
    /// # Contract
    /// - A title that is empty or whitespace-only is invalid.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

impl Task {
    /// Materializes a draft with a fresh ID and the current instant.
    pub fn new(draft: TaskDraft) -> Self {
        Self::with_identity(draft, Uuid::new_v4(), Utc::now().timestamp_millis())
    }

    /// Materializes a draft with caller-provided identity fields.
    ///
    /// Used by batch creation so every task in one batch shares the same
    /// creation instant, and by tests that need deterministic ordering.
    ///
    /// # Invariants
    /// - The provided `id` must remain stable for this task's lifetime.
    pub fn with_identity(draft: TaskDraft, id: TaskId, created_at: i64) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            completed: false,
            priority: draft.priority,
            category: draft.category,
            created_at,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unsupported priority `{other}`; expected low|medium|high"
            )),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Personal => write!(f, "Personal"),
            Self::Work => write!(f, "Work"),
            Self::Shopping => write!(f, "Shopping"),
            Self::Health => write!(f, "Health"),
            Self::Finance => write!(f, "Finance"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "work" => Ok(Self::Work),
            "shopping" => Ok(Self::Shopping),
            "health" => Ok(Self::Health),
            "finance" => Ok(Self::Finance),
            other => Err(format!(
                "unsupported category `{other}`; expected personal|work|shopping|health|finance"
            )),
        }
    }
}

//! Pure view projections over the canonical task collection.
//!
//! # Responsibility
//! - Derive filtered/sorted task subsets and dashboard statistics.
//!
//! # Invariants
//! - Every function is pure and re-derived per read; nothing is cached
//!   across mutations and nothing here mutates the collection.
//! - The reference date is an explicit argument, so projections stay
//!   deterministic under test.

use crate::model::task::{Priority, Task};
use chrono::NaiveDate;

/// Incomplete tasks due exactly on `today`.
pub fn today_tasks(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| !task.completed && task.due_date == today)
        .cloned()
        .collect()
}

/// Incomplete tasks due strictly after `today`, soonest first.
pub fn upcoming_tasks(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let mut upcoming: Vec<Task> = tasks
        .iter()
        .filter(|task| !task.completed && task.due_date > today)
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| a.due_date.cmp(&b.due_date));
    upcoming
}

/// Completed tasks, newest creation first.
pub fn completed_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut completed: Vec<Task> = tasks.iter().filter(|task| task.completed).cloned().collect();
    completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    completed
}

/// Aggregate counters for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub pending_high: usize,
    pub pending_medium: usize,
    pub pending_low: usize,
    /// Rounded percentage; `0` for an empty collection.
    pub completion_rate_percent: u32,
}

impl DashboardStats {
    pub fn compute(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        let pending = total - completed;

        let pending_with = |priority: Priority| {
            tasks
                .iter()
                .filter(|task| !task.completed && task.priority == priority)
                .count()
        };

        let completion_rate_percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        Self {
            total,
            completed,
            pending,
            pending_high: pending_with(Priority::High),
            pending_medium: pending_with(Priority::Medium),
            pending_low: pending_with(Priority::Low),
            completion_rate_percent,
        }
    }
}

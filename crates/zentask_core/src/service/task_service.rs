//! Optimistic reconciliation engine over the canonical task collection.
//!
//! # Responsibility
//! - Own the single in-memory source of truth for tasks.
//! - Apply every mutation optimistically, dispatch the store call, and roll
//!   back from captured pre-mutation values when persistence fails.
//!
//! # Invariants
//! - The collection lock is never held across an await; other operations may
//!   interleave only at the store-call suspension point.
//! - Rollback targets captured ids/values, never positions or counts, so it
//!   stays correct under interleaved mutations.
//! - A rollback whose `id` is no longer present is a silent no-op.
//! - Store failures never propagate to callers; they end in a compensating
//!   mutation plus one alert.
//!
//! # Preconditions
//! - `hydrate` completes before the first mutation; the caller enforces the
//!   loading gate, the engine does not.

use crate::model::task::{Task, TaskDraft, TaskId, TaskValidationError};
use crate::store::{TaskPatch, TaskStore};
use chrono::Utc;
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Terminal, user-visible failure signal for rolled-back mutations.
///
/// The engine never retries; delivering one alert per failed write is the
/// whole failure contract toward the user.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Reconciliation engine holding the canonical task collection.
pub struct TaskService {
    tasks: Mutex<Vec<Task>>,
    store: Arc<dyn TaskStore>,
    alerts: Arc<dyn AlertSink>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            store,
            alerts,
        }
    }

    fn collection(&self) -> MutexGuard<'_, Vec<Task>> {
        // Poisoning implies a panic mid-mutation; nothing can be salvaged.
        self.tasks.lock().expect("task collection lock poisoned")
    }

    /// Populates the collection once at startup.
    ///
    /// # Contract
    /// - `StoreError::Unavailable` yields an empty collection, not a failure.
    /// - Returns the number of tasks loaded.
    pub async fn hydrate(&self) -> usize {
        let loaded = match self.store.load_all().await {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!("event=hydrate module=engine status=degraded error={err}");
                Vec::new()
            }
        };
        let count = loaded.len();
        *self.collection() = loaded;
        info!("event=hydrate module=engine status=ok count={count}");
        count
    }

    /// Returns a point-in-time copy of the canonical collection.
    ///
    /// Views are always derived from such snapshots; they never mutate the
    /// collection.
    pub fn snapshot(&self) -> Vec<Task> {
        self.collection().clone()
    }

    /// Creates one task: optimistic prepend, then persistence.
    ///
    /// # Contract
    /// - The new task is visible to readers before the store call is
    ///   dispatched.
    /// - On store failure the exact synthesized `id` is removed (a no-op if
    ///   the user already deleted it) and one alert is raised.
    /// - Returns the synthesized id; persistence failure does not change it.
    pub async fn add_task(&self, draft: TaskDraft) -> Result<TaskId, TaskValidationError> {
        draft.validate()?;
        let task = Task::new(draft);
        let id = task.id;

        self.collection().insert(0, task.clone());

        if let Err(err) = self.store.create_one(&task).await {
            warn!("event=task_add module=engine status=rolled_back id={id} error={err}");
            self.collection().retain(|existing| existing.id != id);
            self.alerts.alert("Failed to save task to cloud.");
        } else {
            info!("event=task_add module=engine status=ok id={id}");
        }
        Ok(id)
    }

    /// Creates a batch of tasks sharing one creation instant.
    ///
    /// # Contract
    /// - The batch is prepended preserving input order before the store call.
    /// - On store failure every id in the synthesized id-set is removed,
    ///   wherever it currently sits, and one alert is raised. Entries the
    ///   user already deleted are skipped silently.
    pub async fn add_many(
        &self,
        drafts: Vec<TaskDraft>,
    ) -> Result<Vec<TaskId>, TaskValidationError> {
        for draft in &drafts {
            draft.validate()?;
        }
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let created_at = Utc::now().timestamp_millis();
        let batch: Vec<Task> = drafts
            .into_iter()
            .map(|draft| Task::with_identity(draft, Uuid::new_v4(), created_at))
            .collect();
        let ids: Vec<TaskId> = batch.iter().map(|task| task.id).collect();

        self.collection().splice(0..0, batch.iter().cloned());

        if let Err(err) = self.store.create_many(&batch).await {
            warn!(
                "event=task_add_many module=engine status=rolled_back count={} error={err}",
                ids.len()
            );
            let batch_ids: std::collections::HashSet<TaskId> = ids.iter().copied().collect();
            self.collection()
                .retain(|existing| !batch_ids.contains(&existing.id));
            self.alerts.alert("Failed to save tasks to cloud.");
        } else {
            info!(
                "event=task_add_many module=engine status=ok count={}",
                ids.len()
            );
        }
        Ok(ids)
    }

    /// Flips completion state: optimistic flip, then a partial update.
    ///
    /// # Contract
    /// - An absent `id` is a no-op.
    /// - On store failure the captured pre-toggle value is restored, and only
    ///   if the record still exists. The rollback never "flips again", so a
    ///   second toggle issued while the call was in flight keeps its intended
    ///   value.
    pub async fn toggle_completion(&self, id: TaskId) {
        let (previous, target) = {
            let mut tasks = self.collection();
            let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
                return;
            };
            let previous = task.completed;
            task.completed = !previous;
            (previous, !previous)
        };

        let patch = TaskPatch::completion(target);
        if let Err(err) = self.store.update_fields(id, &patch).await {
            warn!("event=task_toggle module=engine status=rolled_back id={id} error={err}");
            let mut tasks = self.collection();
            if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
                task.completed = previous;
            }
        } else {
            info!("event=task_toggle module=engine status=ok id={id} completed={target}");
        }
    }

    /// Deletes one task: optimistic removal, then persistence.
    ///
    /// # Contract
    /// - An absent `id` is a no-op.
    /// - On store failure the captured record is re-inserted and the whole
    ///   collection re-sorted by `created_at` descending, since its original
    ///   position may have shifted. One alert is raised.
    pub async fn delete_task(&self, id: TaskId) {
        let captured = {
            let mut tasks = self.collection();
            let Some(position) = tasks.iter().position(|task| task.id == id) else {
                return;
            };
            tasks.remove(position)
        };

        if let Err(err) = self.store.delete_one(id).await {
            warn!("event=task_delete module=engine status=rolled_back id={id} error={err}");
            let mut tasks = self.collection();
            tasks.push(captured);
            tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            self.alerts.alert("Failed to delete task from cloud.");
        } else {
            info!("event=task_delete module=engine status=ok id={id}");
        }
    }
}

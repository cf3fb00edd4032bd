//! Local JSON-blob task store.
//!
//! # Responsibility
//! - Persist the whole task list as one JSON array under a fixed file name.
//! - Treat an absent or corrupt blob as an empty list, never as an error.
//!
//! # Invariants
//! - Writes replace the blob through a temp-file rename, so an interrupted
//!   write never corrupts the previously persisted blob.
//! - A parse failure on read is logged and loads as empty; it is not
//!   surfaced to the caller.

use crate::model::task::{Task, TaskId};
use crate::store::{StoreError, StoreResult, TaskPatch, TaskStore};
use async_trait::async_trait;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const BLOB_FILE_NAME: &str = "zentask_tasks.json";

/// File-backed store holding one serialized task array.
pub struct LocalJsonStore {
    blob_path: PathBuf,
}

impl LocalJsonStore {
    /// Creates a store rooted at `data_dir`, creating the directory lazily
    /// on first write.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            blob_path: data_dir.as_ref().join(BLOB_FILE_NAME),
        }
    }

    fn read_blob(&self) -> Vec<Task> {
        let raw = match fs::read_to_string(&self.blob_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=blob_read module=store_local status=error error={} path={}",
                    err,
                    self.blob_path.display()
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => tasks,
            Err(err) => {
                // Corrupt data is treated as absence so startup never fails
                // on a damaged blob.
                warn!(
                    "event=blob_parse module=store_local status=error error={} path={}",
                    err,
                    self.blob_path.display()
                );
                Vec::new()
            }
        }
    }

    fn write_blob(&self, tasks: &[Task]) -> StoreResult<()> {
        let parent = self
            .blob_path
            .parent()
            .ok_or_else(|| StoreError::WriteRejected("blob path has no parent".to_string()))?;
        fs::create_dir_all(parent)
            .map_err(|err| StoreError::WriteRejected(format!("create data dir: {err}")))?;

        let serialized = serde_json::to_string(tasks)
            .map_err(|err| StoreError::WriteRejected(format!("serialize blob: {err}")))?;

        let tmp_path = self.blob_path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .map_err(|err| StoreError::WriteRejected(format!("write blob: {err}")))?;
        fs::rename(&tmp_path, &self.blob_path)
            .map_err(|err| StoreError::WriteRejected(format!("commit blob: {err}")))?;

        Ok(())
    }
}

#[async_trait]
impl TaskStore for LocalJsonStore {
    async fn load_all(&self) -> StoreResult<Vec<Task>> {
        let tasks = self.read_blob();
        info!(
            "event=load_all module=store_local status=ok count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    async fn create_one(&self, task: &Task) -> StoreResult<()> {
        let mut tasks = self.read_blob();
        tasks.push(task.clone());
        self.write_blob(&tasks)
    }

    async fn create_many(&self, new_tasks: &[Task]) -> StoreResult<()> {
        let mut tasks = self.read_blob();
        tasks.extend(new_tasks.iter().cloned());
        self.write_blob(&tasks)
    }

    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<()> {
        let mut tasks = self.read_blob();
        let target = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| StoreError::WriteRejected(format!("task not found: {id}")))?;
        patch.apply_to(target);
        self.write_blob(&tasks)
    }

    async fn delete_one(&self, id: TaskId) -> StoreResult<()> {
        let mut tasks = self.read_blob();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(StoreError::WriteRejected(format!("task not found: {id}")));
        }
        self.write_blob(&tasks)
    }
}

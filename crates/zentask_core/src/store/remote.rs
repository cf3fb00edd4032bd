//! Remote relational task store over a PostgREST-style HTTP boundary.
//!
//! # Responsibility
//! - Map tasks to/from rows of a remote `tasks` table.
//! - Keep HTTP and column-encoding details inside the store boundary.
//!
//! # Invariants
//! - `created_at` is persisted as RFC 3339 text and converted to/from epoch
//!   milliseconds exactly at the row boundary.
//! - Reads are ordered by `created_at` descending by the backend query.
//! - Partial updates send only the supplied columns.
//! - Batch insert is one POST of the whole array; the backend applies it
//!   transactionally, which gives `create_many` its atomic contract.

use crate::model::task::{Category, Priority, Task, TaskId};
use crate::store::{StoreError, StoreResult, TaskPatch, TaskStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

const TABLE: &str = "tasks";

/// HTTP adapter over the remote `tasks` table.
pub struct RemoteTableStore {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

/// Wire shape of one remote row.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRow {
    id: TaskId,
    title: String,
    description: Option<String>,
    due_date: NaiveDate,
    completed: bool,
    priority: Priority,
    category: Category,
    created_at: String,
}

impl TaskRow {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            completed: task.completed,
            priority: task.priority,
            category: task.category,
            created_at: epoch_ms_to_rfc3339(task.created_at),
        }
    }

    fn into_task(self) -> StoreResult<Task> {
        let created_at = rfc3339_to_epoch_ms(&self.created_at)?;
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            completed: self.completed,
            priority: self.priority,
            category: self.category,
            created_at,
        })
    }
}

fn epoch_ms_to_rfc3339(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339()
}

fn rfc3339_to_epoch_ms(value: &str) -> StoreResult<i64> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.timestamp_millis())
        .map_err(|err| {
            StoreError::Unavailable(format!("invalid created_at `{value}` in tasks row: {err}"))
        })
}

impl RemoteTableStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    fn table_url(&self, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{TABLE}", self.base_url)
        } else {
            format!("{}/rest/v1/{TABLE}?{query}", self.base_url)
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Sends a write request and maps transport or non-2xx outcomes to
    /// `WriteRejected`.
    async fn send_write(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> StoreResult<reqwest::Response> {
        let response = request.send().await.map_err(|err| {
            warn!("event={operation} module=store_remote status=error error={err}");
            StoreError::WriteRejected(format!("{operation}: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "event={operation} module=store_remote status=error http_status={status} body={body}"
            );
            return Err(StoreError::WriteRejected(format!(
                "{operation}: http {status}"
            )));
        }

        Ok(response)
    }

    /// Decodes a `return=representation` response and rejects writes that
    /// touched no row, so a missing remote id surfaces as `WriteRejected`.
    async fn expect_affected_rows(
        &self,
        operation: &'static str,
        response: reqwest::Response,
    ) -> StoreResult<()> {
        let rows: Vec<serde_json::Value> = response.json().await.map_err(|err| {
            StoreError::WriteRejected(format!("{operation}: decode response: {err}"))
        })?;
        if rows.is_empty() {
            return Err(StoreError::WriteRejected(format!(
                "{operation}: no matching row"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for RemoteTableStore {
    async fn load_all(&self) -> StoreResult<Vec<Task>> {
        let url = self.table_url("select=*&order=created_at.desc");
        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(format!("load_all: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!("load_all: http {status}")));
        }

        let rows: Vec<TaskRow> = response
            .json()
            .await
            .map_err(|err| StoreError::Unavailable(format!("load_all: decode rows: {err}")))?;

        let tasks = rows
            .into_iter()
            .map(TaskRow::into_task)
            .collect::<StoreResult<Vec<Task>>>()?;

        info!(
            "event=load_all module=store_remote status=ok count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    async fn create_one(&self, task: &Task) -> StoreResult<()> {
        let request = self
            .authorized(self.http.post(self.table_url("")))
            .json(&[TaskRow::from_task(task)]);
        self.send_write("create_one", request).await?;
        Ok(())
    }

    async fn create_many(&self, tasks: &[Task]) -> StoreResult<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from_task).collect();
        let request = self
            .authorized(self.http.post(self.table_url("")))
            .json(&rows);
        self.send_write("create_many", request).await?;
        Ok(())
    }

    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<()> {
        let url = self.table_url(&format!("id=eq.{id}"));
        let request = self
            .authorized(self.http.patch(url))
            .header("Prefer", "return=representation")
            .json(patch);
        let response = self.send_write("update_fields", request).await?;
        self.expect_affected_rows("update_fields", response).await
    }

    async fn delete_one(&self, id: TaskId) -> StoreResult<()> {
        let url = self.table_url(&format!("id=eq.{id}"));
        let request = self
            .authorized(self.http.delete(url))
            .header("Prefer", "return=representation");
        let response = self.send_write("delete_one", request).await?;
        self.expect_affected_rows("delete_one", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskDraft;
    use uuid::Uuid;

    #[test]
    fn created_at_round_trips_through_rfc3339() {
        let epoch_ms = 1_735_689_600_123;
        let text = epoch_ms_to_rfc3339(epoch_ms);
        assert_eq!(rfc3339_to_epoch_ms(&text).unwrap(), epoch_ms);
    }

    #[test]
    fn invalid_created_at_text_is_unavailable() {
        let err = rfc3339_to_epoch_ms("not-a-timestamp").unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn row_round_trip_preserves_the_task() {
        let task = Task::with_identity(
            TaskDraft {
                title: "renew passport".to_string(),
                description: Some("bring photos".to_string()),
                due_date: NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
                priority: Priority::High,
                category: Category::Finance,
            },
            Uuid::new_v4(),
            1_735_689_600_123,
        );

        let row = TaskRow::from_task(&task);
        assert_eq!(TaskRow::into_task(row).unwrap(), task);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let store = RemoteTableStore::new("https://db.example.com/", "key");
        assert_eq!(
            store.table_url("select=*"),
            "https://db.example.com/rest/v1/tasks?select=*"
        );
    }
}

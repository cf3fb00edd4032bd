//! Reconciliation engine behavior under failing and interleaved persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use uuid::Uuid;
use zentask_core::{
    AlertSink, Category, Priority, StoreError, StoreResult, Task, TaskDraft, TaskId, TaskPatch,
    TaskService, TaskStore,
};

enum Scripted {
    Reject,
    Gate(oneshot::Receiver<StoreResult<()>>),
}

/// Store double with scripted write outcomes.
///
/// Unscripted writes succeed. A `Gate` parks the write until the test
/// releases it, which is how interleavings at the suspension point are
/// driven deterministically.
#[derive(Default)]
struct MockStore {
    initial: Mutex<Vec<Task>>,
    load_error: Mutex<Option<StoreError>>,
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockStore {
    fn with_initial(tasks: Vec<Task>) -> Arc<Self> {
        let store = Self::default();
        *store.initial.lock().unwrap() = tasks;
        Arc::new(store)
    }

    fn reject_next(&self) {
        self.script.lock().unwrap().push_back(Scripted::Reject);
    }

    fn gate_next(&self) -> oneshot::Sender<StoreResult<()>> {
        let (release, parked) = oneshot::channel();
        self.script.lock().unwrap().push_back(Scripted::Gate(parked));
        release
    }

    fn calls_named(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == name)
            .count()
    }

    async fn next(&self, name: &'static str) -> StoreResult<()> {
        self.calls.lock().unwrap().push(name);
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            None => Ok(()),
            Some(Scripted::Reject) => Err(StoreError::WriteRejected(format!(
                "scripted rejection for {name}"
            ))),
            Some(Scripted::Gate(parked)) => parked
                .await
                .unwrap_or_else(|_| Err(StoreError::WriteRejected("gate dropped".to_string()))),
        }
    }
}

#[async_trait]
impl TaskStore for MockStore {
    async fn load_all(&self) -> StoreResult<Vec<Task>> {
        self.calls.lock().unwrap().push("load_all");
        if let Some(err) = self.load_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.initial.lock().unwrap().clone())
    }

    async fn create_one(&self, _task: &Task) -> StoreResult<()> {
        self.next("create_one").await
    }

    async fn create_many(&self, _tasks: &[Task]) -> StoreResult<()> {
        self.next("create_many").await
    }

    async fn update_fields(&self, _id: TaskId, _patch: &TaskPatch) -> StoreResult<()> {
        self.next("update_fields").await
    }

    async fn delete_one(&self, _id: TaskId) -> StoreResult<()> {
        self.next("delete_one").await
    }
}

#[derive(Default)]
struct CapturingAlerts {
    messages: Mutex<Vec<String>>,
}

impl AlertSink for CapturingAlerts {
    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

impl CapturingAlerts {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: None,
        due_date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
        priority: Priority::Medium,
        category: Category::Personal,
    }
}

fn seeded_task(title: &str, created_at: i64) -> Task {
    Task::with_identity(draft(title), Uuid::new_v4(), created_at)
}

fn service(store: Arc<MockStore>, alerts: Arc<CapturingAlerts>) -> Arc<TaskService> {
    Arc::new(TaskService::new(store, alerts))
}

async fn wait_for_call(store: &MockStore, name: &str, count: usize) {
    while store.calls_named(name) < count {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn hydrate_unavailable_store_yields_empty_collection() {
    let store = MockStore::with_initial(vec![seeded_task("ignored", 1)]);
    *store.load_error.lock().unwrap() =
        Some(StoreError::Unavailable("connection refused".to_string()));
    let svc = service(store, Arc::new(CapturingAlerts::default()));

    assert_eq!(svc.hydrate().await, 0);
    assert!(svc.snapshot().is_empty());
}

#[tokio::test]
async fn add_failure_leaves_collection_exactly_as_before() {
    let existing = seeded_task("already there", 100);
    let store = MockStore::with_initial(vec![existing.clone()]);
    let alerts = Arc::new(CapturingAlerts::default());
    let svc = service(store.clone(), alerts.clone());
    svc.hydrate().await;

    store.reject_next();
    svc.add_task(draft("doomed")).await.unwrap();

    assert_eq!(svc.snapshot(), vec![existing]);
    assert_eq!(alerts.messages(), vec!["Failed to save task to cloud."]);
}

#[tokio::test]
async fn optimistic_add_is_visible_before_persistence_settles() {
    let store = MockStore::with_initial(Vec::new());
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    let release = store.gate_next();
    let handle = tokio::spawn({
        let svc = svc.clone();
        async move { svc.add_task(draft("in flight")).await.unwrap() }
    });
    wait_for_call(&store, "create_one", 1).await;

    let snapshot = svc.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].title, "in flight");

    release.send(Ok(())).unwrap();
    let id = handle.await.unwrap();
    assert_eq!(svc.snapshot()[0].id, id);
}

#[tokio::test]
async fn add_rollback_after_user_delete_is_a_noop() {
    let store = MockStore::with_initial(Vec::new());
    let alerts = Arc::new(CapturingAlerts::default());
    let svc = service(store.clone(), alerts.clone());
    svc.hydrate().await;

    let release = store.gate_next();
    let handle = tokio::spawn({
        let svc = svc.clone();
        async move { svc.add_task(draft("short lived")).await.unwrap() }
    });
    wait_for_call(&store, "create_one", 1).await;

    // User deletes the task while its create call is still in flight.
    let id = svc.snapshot()[0].id;
    svc.delete_task(id).await;
    assert!(svc.snapshot().is_empty());

    release
        .send(Err(StoreError::WriteRejected("late failure".to_string())))
        .unwrap();
    handle.await.unwrap();

    assert!(svc.snapshot().is_empty());
    assert_eq!(alerts.messages(), vec!["Failed to save task to cloud."]);
}

#[tokio::test]
async fn toggle_rollback_keeps_second_toggle_when_first_fails_late() {
    let task = seeded_task("flip me", 100);
    let id = task.id;
    let store = MockStore::with_initial(vec![task]);
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    let release = store.gate_next();
    let handle = tokio::spawn({
        let svc = svc.clone();
        async move { svc.toggle_completion(id).await }
    });
    wait_for_call(&store, "update_fields", 1).await;
    assert!(svc.snapshot()[0].completed);

    // Second toggle lands while the first persistence call is in flight.
    svc.toggle_completion(id).await;
    assert!(!svc.snapshot()[0].completed);

    release
        .send(Err(StoreError::WriteRejected("late failure".to_string())))
        .unwrap();
    handle.await.unwrap();

    // Rollback restores the captured pre-first-toggle value (false), which
    // matches the second toggle's intent instead of reverting it.
    assert!(!svc.snapshot()[0].completed);
}

#[tokio::test]
async fn toggle_rollback_before_second_toggle_reverts_then_reapplies() {
    let task = seeded_task("flip me", 100);
    let id = task.id;
    let store = MockStore::with_initial(vec![task]);
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    store.reject_next();
    svc.toggle_completion(id).await;
    assert!(!svc.snapshot()[0].completed);

    svc.toggle_completion(id).await;
    assert!(svc.snapshot()[0].completed);
}

#[tokio::test]
async fn toggle_of_absent_id_is_a_noop() {
    let store = MockStore::with_initial(Vec::new());
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    svc.toggle_completion(Uuid::new_v4()).await;

    assert!(svc.snapshot().is_empty());
    assert_eq!(store.calls_named("update_fields"), 0);
}

#[tokio::test]
async fn delete_rollback_reinserts_record_sorted_by_created_at() {
    let oldest = seeded_task("oldest", 100);
    let middle = seeded_task("middle", 200);
    let newest = seeded_task("newest", 300);
    let store =
        MockStore::with_initial(vec![newest.clone(), middle.clone(), oldest.clone()]);
    let alerts = Arc::new(CapturingAlerts::default());
    let svc = service(store.clone(), alerts.clone());
    svc.hydrate().await;

    store.reject_next();
    svc.delete_task(middle.id).await;

    assert_eq!(
        svc.snapshot(),
        vec![newest.clone(), middle.clone(), oldest.clone()]
    );
    assert_eq!(alerts.messages(), vec!["Failed to delete task from cloud."]);
}

#[tokio::test]
async fn delete_of_absent_id_is_a_noop() {
    let store = MockStore::with_initial(Vec::new());
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    svc.delete_task(Uuid::new_v4()).await;

    assert_eq!(store.calls_named("delete_one"), 0);
}

#[tokio::test]
async fn batch_rollback_removes_only_batch_ids_despite_interleaved_add() {
    let existing = seeded_task("keep me", 100);
    let store = MockStore::with_initial(vec![existing.clone()]);
    let alerts = Arc::new(CapturingAlerts::default());
    let svc = service(store.clone(), alerts.clone());
    svc.hydrate().await;

    let release = store.gate_next();
    let handle = tokio::spawn({
        let svc = svc.clone();
        async move {
            svc.add_many(vec![draft("a"), draft("b"), draft("c")])
                .await
                .unwrap()
        }
    });
    wait_for_call(&store, "create_many", 1).await;
    assert_eq!(svc.snapshot().len(), 4);

    // A single add lands while the batch write is in flight.
    let survivor = svc.add_task(draft("survivor")).await.unwrap();

    release
        .send(Err(StoreError::WriteRejected("batch failure".to_string())))
        .unwrap();
    let batch_ids = handle.await.unwrap();

    let remaining: Vec<TaskId> = svc.snapshot().iter().map(|task| task.id).collect();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.contains(&existing.id));
    assert!(remaining.contains(&survivor));
    for id in batch_ids {
        assert!(!remaining.contains(&id));
    }
    assert_eq!(alerts.messages(), vec!["Failed to save tasks to cloud."]);
}

#[tokio::test]
async fn batch_prepend_preserves_input_order_and_shares_one_instant() {
    let store = MockStore::with_initial(Vec::new());
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    svc.add_many(vec![draft("first"), draft("second"), draft("third")])
        .await
        .unwrap();

    let snapshot = svc.snapshot();
    let titles: Vec<&str> = snapshot.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);
    assert!(snapshot
        .iter()
        .all(|task| task.created_at == snapshot[0].created_at));
}

#[tokio::test]
async fn ids_stay_unique_across_mixed_operations() {
    let store = MockStore::with_initial(Vec::new());
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    let first = svc.add_task(draft("one")).await.unwrap();
    svc.add_many(vec![draft("two"), draft("three")]).await.unwrap();
    svc.toggle_completion(first).await;
    store.reject_next();
    svc.add_task(draft("rolled back")).await.unwrap();
    svc.delete_task(first).await;
    svc.add_many(vec![draft("four")]).await.unwrap();

    let snapshot = svc.snapshot();
    let unique: HashSet<TaskId> = snapshot.iter().map(|task| task.id).collect();
    assert_eq!(unique.len(), snapshot.len());
}

#[tokio::test]
async fn empty_title_is_rejected_before_any_mutation() {
    let store = MockStore::with_initial(Vec::new());
    let svc = service(store.clone(), Arc::new(CapturingAlerts::default()));
    svc.hydrate().await;

    assert!(svc.add_task(draft("   ")).await.is_err());
    assert!(svc.snapshot().is_empty());
    assert_eq!(store.calls_named("create_one"), 0);
}

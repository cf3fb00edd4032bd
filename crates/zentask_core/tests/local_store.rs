//! Durability behavior of the local JSON-blob store.

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;
use zentask_core::{
    Category, LocalJsonStore, Priority, StoreError, Task, TaskDraft, TaskPatch, TaskStore,
};

fn task(title: &str, created_at: i64) -> Task {
    Task::with_identity(
        TaskDraft {
            title: title.to_string(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            priority: Priority::High,
            category: Category::Work,
        },
        Uuid::new_v4(),
        created_at,
    )
}

#[tokio::test]
async fn load_from_missing_blob_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = LocalJsonStore::new(dir.path());

    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_blob_loads_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("zentask_tasks.json"), "{not json").unwrap();
    let store = LocalJsonStore::new(dir.path());

    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = LocalJsonStore::new(dir.path());

    let first = task("first", 100);
    let second = task("second", 200);
    store.create_one(&first).await.unwrap();
    store.create_many(&[second.clone()]).await.unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.contains(&first));
    assert!(loaded.contains(&second));
}

#[tokio::test]
async fn blob_survives_process_boundaries() {
    let dir = TempDir::new().unwrap();
    let persisted = task("durable", 100);
    {
        let store = LocalJsonStore::new(dir.path());
        store.create_one(&persisted).await.unwrap();
    }

    let reopened = LocalJsonStore::new(dir.path());
    assert_eq!(reopened.load_all().await.unwrap(), vec![persisted]);
}

#[tokio::test]
async fn update_touches_only_supplied_fields() {
    let dir = TempDir::new().unwrap();
    let store = LocalJsonStore::new(dir.path());

    let original = task("untouched title", 100);
    store.create_one(&original).await.unwrap();

    store
        .update_fields(original.id, &TaskPatch::completion(true))
        .await
        .unwrap();

    let loaded = store.load_all().await.unwrap();
    assert!(loaded[0].completed);
    assert_eq!(loaded[0].title, "untouched title");
    assert_eq!(loaded[0].created_at, 100);
}

#[tokio::test]
async fn update_of_missing_task_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = LocalJsonStore::new(dir.path());

    let err = store
        .update_fields(Uuid::new_v4(), &TaskPatch::completion(true))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::WriteRejected(_)));
}

#[tokio::test]
async fn delete_removes_only_the_target() {
    let dir = TempDir::new().unwrap();
    let store = LocalJsonStore::new(dir.path());

    let doomed = task("doomed", 100);
    let survivor = task("survivor", 200);
    store.create_many(&[doomed.clone(), survivor.clone()]).await.unwrap();

    store.delete_one(doomed.id).await.unwrap();

    assert_eq!(store.load_all().await.unwrap(), vec![survivor]);
}

#[tokio::test]
async fn delete_of_missing_task_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = LocalJsonStore::new(dir.path());

    let err = store.delete_one(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StoreError::WriteRejected(_)));
}

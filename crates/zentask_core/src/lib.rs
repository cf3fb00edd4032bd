//! Core domain logic for ZenTask.
//! This crate is the single source of truth for business invariants.

pub mod advisor;
pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod view;

pub use advisor::{AdvisorError, ResponseShape, TaskAdvisor, TextModel};
pub use config::{AppConfig, BackendKind, ConfigError};
pub use logging::{default_log_level, init_logging};
pub use model::task::{Category, Priority, Task, TaskDraft, TaskId, TaskValidationError};
pub use service::task_service::{AlertSink, TaskService};
pub use store::local::LocalJsonStore;
pub use store::remote::RemoteTableStore;
pub use store::{StoreError, StoreResult, TaskPatch, TaskStore};
pub use view::{completed_tasks, today_tasks, upcoming_tasks, DashboardStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

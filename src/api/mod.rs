//! HTTP access to the Gizmo server's task endpoints.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

use crate::task::TaskStatus;

/// The server-side task endpoints the CLI drives.
///
/// Mocked in tests so the watcher can be exercised without a live server.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TasksApi: Send + Sync {
    /// Start a data-preparation task for a project. Returns the task ID.
    async fn start_prep(&self, project_name: &str) -> Result<String, ApiError>;

    /// Start a training-and-evaluation task for a project. Returns the task ID.
    async fn start_train_eval(&self, project_name: &str) -> Result<String, ApiError>;

    /// Fetch the current status of a task.
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError>;
}

//! Background task types.
//!
//! A submission returns an opaque task ID; the status endpoint reports the
//! task's state. Status is fetched fresh on every poll and never cached
//! client-side.

use serde::Deserialize;
use std::fmt::Display;

/// Status of a background task as reported by the server.
///
/// Wire form: `{"status": string, "error"?: string}`. The server reports
/// in-flight tasks as `pending` or `running`, and failures as `failed` or
/// `failure`; both spellings of each are accepted. A status string outside
/// the contract maps to [`TaskStatus::Other`] and is treated as in-flight.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    /// The task has not finished yet. Non-terminal.
    #[serde(alias = "running")]
    Pending,
    /// The task completed successfully. Terminal.
    Done,
    /// The task failed with a server-supplied message. Terminal.
    #[serde(alias = "failure")]
    Failed {
        #[serde(default)]
        error: String,
    },
    /// An unrecognized status. Non-terminal; polling continues.
    #[serde(other)]
    Other,
}

impl TaskStatus {
    /// Whether polling stops at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed { .. })
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Failed { error } => write!(f, "failed: {}", error),
            TaskStatus::Other => write!(f, "unknown"),
        }
    }
}

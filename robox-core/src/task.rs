//! Task plan items and their execution results (§4.5).

use crate::duration::RobotDuration;
use crate::id::ToolServerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which backend a task is dispatched to (§2, §4.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// Dispatched to the delegated execution agent.
    Assistant,
    /// Dispatched to a registered MCP tool server.
    Mcp {
        /// Which tool server to use.
        server: ToolServerId,
        /// The tool name on that server.
        tool: String,
    },
    /// Dispatched as a subprocess invocation.
    Process {
        /// The command to run.
        command: String,
        /// Arguments to the command.
        args: Vec<String>,
    },
}

/// Lifecycle status of one task within the run phase (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet attempted.
    Pending,
    /// Currently executing.
    Running,
    /// Completed successfully.
    Succeeded,
    /// Failed after exhausting retries.
    Failed,
    /// Cancelled before completion.
    Cancelled,
    /// Removed by a human `task.cancel` intervention before it ran.
    Withdrawn,
}

/// One task in the run-phase plan (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Id assigned when the task was planned.
    pub id: String,
    /// Free-form description.
    pub description: String,
    /// Message payload handed to the executor.
    pub message: String,
    /// Which backend executes it.
    pub executor: ExecutorKind,
    /// Free-form description of the output expected from this task.
    pub expected_output: Option<String>,
    /// Rules the output is validated against.
    #[serde(default)]
    pub validation_rules: Vec<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Position within the run phase's strictly ordered task plan (§5).
    pub order: u32,
    /// Number of attempts made so far.
    pub attempts: u8,
    /// Maximum attempts before giving up.
    pub max_attempts: u8,
    /// When execution of this task began.
    pub started_at: Option<DateTime<Utc>>,
    /// When execution of this task ended.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether this task may still be retried.
    pub fn can_retry(&self) -> bool {
        matches!(self.status, TaskStatus::Failed) && self.attempts < self.max_attempts
    }
}

/// Result of validating a task's output against its `expected_output` and
/// `validation_rules` (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the output passed validation.
    pub passed: bool,
    /// Confidence score in `[0, 1]`.
    pub score: f64,
    /// Problems found, empty if `passed`.
    #[serde(default)]
    pub issues: Vec<String>,
    /// Suggested fixes for any issues found.
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Whether the task's work is complete, distinct from whether the
    /// current output `passed`.
    pub complete: bool,
    /// Whether the executor should be given another turn with `reply_content`.
    #[serde(default)]
    pub need_reply: bool,
    /// Content to send back to the executor for a follow-up turn, present
    /// only when `need_reply` is set.
    pub reply_content: Option<String>,
}

/// Outcome of executing a single task (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Id of the task this result is for.
    pub task_id: String,
    /// Final status after execution.
    pub status: TaskStatus,
    /// Opaque output payload from the executor.
    pub output: Option<serde_json::Value>,
    /// Error message, if the task ended in `Failed`.
    pub error: Option<String>,
    /// Wall-clock time spent executing the task.
    pub duration: RobotDuration,
    /// Validation outcome, if the task's output was validated.
    pub validation: Option<ValidationResult>,
}

//! The job/log bridge and member store protocols (§4.1, §4.7, §6).

use crate::error::StoreError;
use crate::execution::{ExecutionStatus, TriggerKind};
use crate::id::{ExecutionId, JobId, MemberId, TeamId};
use crate::phase::Phase;
use crate::robot::{Config, Robot, RobotStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Severity of one log entry (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Routine progress note.
    Info,
    /// Recoverable anomaly.
    Warn,
    /// Phase or execution failure.
    Error,
}

/// One durable log line attached to a job (§4.7, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was recorded.
    pub at: chrono::DateTime<chrono::Utc>,
    /// The execution this entry belongs to.
    pub execution_id: ExecutionId,
    /// The derived job id this entry is appended to.
    pub job_id: JobId,
    /// Severity.
    pub level: LogLevel,
    /// Which phase produced this entry, if any.
    pub phase: Option<Phase>,
    /// Short machine-readable tag for the step within the phase that
    /// produced this entry (e.g. `"phase_goals_start"`).
    pub step: Option<String>,
    /// The message text, localized per the execution's locale (§4.7).
    pub message: String,
    /// Structured context accompanying the message.
    pub context: Option<serde_json::Value>,
    /// Monotonically increasing position within this execution's log (§5).
    pub sequence: u64,
}

/// Which entrypoint category an execution's job belongs to (§6), stored
/// alongside the job row for filtering/reporting independent of the
/// richer [`TriggerInput`](crate::execution::TriggerInput) payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCategory {
    /// Scheduled.
    Clock,
    /// Human-initiated.
    Human,
    /// Event-initiated.
    Event,
}

impl From<TriggerKind> for TriggerCategory {
    fn from(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Clock => Self::Clock,
            TriggerKind::Human => Self::Human,
            TriggerKind::Event => Self::Event,
        }
    }
}

/// The durable job row persisted for one execution, keyed by the derived
/// `robot_exec_<execution_id>` job id (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRow {
    /// The derived job id.
    pub job_id: JobId,
    /// The execution this job row tracks.
    pub execution_id: ExecutionId,
    /// The robot the execution belongs to.
    pub member_id: MemberId,
    /// Which entrypoint category started it.
    pub trigger: TriggerCategory,
    /// Current status, mirrored from the execution record.
    pub status: ExecutionStatus,
    /// Current phase, mirrored from the execution record.
    pub phase: Phase,
    /// Fixed progress percentage for `phase`.
    pub progress: u8,
    /// Accumulated log entries.
    pub logs: Vec<LogEntry>,
    /// When the job was created.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When the job left a terminal state, if it has.
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A lighter-weight summary row for listing executions without their full
/// log bodies (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRow {
    /// The derived job id.
    pub job_id: JobId,
    /// The execution this row summarizes.
    pub execution_id: ExecutionId,
    /// The robot the execution belongs to.
    pub member_id: MemberId,
    /// Current status.
    pub status: ExecutionStatus,
    /// When the job was created.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Durable job and log persistence (§4.7, §6).
///
/// Grounded in the teacher's `StateStore` boundary: a narrow, swappable
/// persistence seam that the controller and phase handlers write through
/// without knowing whether the backing store is in-memory, a file, or a
/// database.
#[async_trait]
pub trait JobLogStore: Send + Sync {
    /// Create the job row for a newly admitted execution.
    async fn create_job(&self, row: JobRow) -> Result<(), StoreError>;

    /// Fetch a job row by its derived job id.
    async fn get_job(&self, job_id: &JobId) -> Result<JobRow, StoreError>;

    /// Update a job's status and current phase.
    async fn update_status(
        &self,
        job_id: &JobId,
        status: ExecutionStatus,
        phase: Phase,
    ) -> Result<(), StoreError>;

    /// Append one log entry to a job.
    async fn append_log(&self, job_id: &JobId, entry: LogEntry) -> Result<(), StoreError>;

    /// List execution summary rows for a robot, most recent first.
    async fn list_executions(&self, member_id: &MemberId) -> Result<Vec<ExecutionRow>, StoreError>;
}

/// A tolerant reader for a robot's persisted configuration payload (§4.1).
///
/// Configuration may arrive as plain text (TOML or JSON, sniffed by
/// content), raw bytes, or an already-decoded value — member stores are
/// free to persist config however is native to their backend.
#[derive(Debug, Clone)]
pub enum ConfigPayload {
    /// Raw text, sniffed as TOML or JSON.
    Text(String),
    /// Raw bytes, decoded as UTF-8 text and then sniffed.
    Bytes(Vec<u8>),
    /// Already-decoded configuration.
    Decoded(Config),
}

impl ConfigPayload {
    /// Decode this payload into a [`Config`], sniffing TOML vs JSON for text
    /// and byte payloads by attempting JSON first, then falling back to
    /// TOML — mirrors the teacher's tolerant multi-format config loader.
    pub fn decode(self) -> Result<Config, StoreError> {
        match self {
            Self::Decoded(config) => Ok(config),
            Self::Text(text) => decode_text(&text),
            Self::Bytes(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| StoreError::ConfigDecodeFailed(e.to_string()))?;
                decode_text(&text)
            }
        }
    }
}

fn decode_text(text: &str) -> Result<Config, StoreError> {
    if let Ok(config) = serde_json::from_str::<Config>(text) {
        return Ok(config);
    }
    toml::from_str(text).map_err(|e| StoreError::ConfigDecodeFailed(e.to_string()))
}

/// A record of one robot as persisted by a member store (§4.1).
#[derive(Debug, Clone)]
pub struct MemberRecord {
    /// Stable identifier.
    pub id: MemberId,
    /// Team this robot belongs to.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: RobotStatus,
    /// Raw configuration payload, decoded on load.
    pub config: ConfigPayload,
}

/// Persistence for robot identity and configuration (§4.1).
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// List all members belonging to a team.
    async fn list_members(&self, team_id: &TeamId) -> Result<Vec<MemberRecord>, StoreError>;

    /// Load one member record by id.
    async fn get_member(&self, id: &MemberId) -> Result<MemberRecord, StoreError>;
}

/// Build a [`Robot`] from a decoded [`MemberRecord`].
pub fn robot_from_record(record: MemberRecord) -> Result<Robot, StoreError> {
    let config = record.config.decode()?;
    let mut robot = Robot::new(record.id, record.team_id, record.name);
    robot.status = record.status;
    robot.config = config;
    Ok(robot)
}

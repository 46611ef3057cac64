//! Robot configuration and cache record (§3, §4.1, §4.2).

use crate::duration::RobotDuration;
use crate::id::{AgentId, MemberId, TeamId, ToolServerId};
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::id::ExecutionId;

/// Whether a robot is accepting new triggers (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    /// Not currently running an execution; accepting new triggers.
    Idle,
    /// Has at least one in-flight execution; accepting new triggers.
    Working,
    /// Rejecting all new triggers; in-flight executions keep running (§4.4).
    Paused,
    /// The last execution ended in an unrecovered error; not accepting triggers.
    Error,
    /// Withdrawn from scheduling for operator maintenance; not accepting triggers.
    Maintenance,
}

impl Default for RobotStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Per-kind enable switches for the three trigger entrypoints (§2, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSwitches {
    /// Clock (scheduled) triggers enabled.
    #[serde(default = "default_true")]
    pub clock: bool,
    /// Human-initiated triggers enabled.
    #[serde(default = "default_true")]
    pub human: bool,
    /// Event-initiated triggers enabled.
    #[serde(default = "default_true")]
    pub event: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TriggerSwitches {
    fn default() -> Self {
        Self { clock: true, human: true, event: true }
    }
}

/// A scheduling mode for the clock trigger (§2, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClockMode {
    /// Wake at a fixed list of times-of-day, each `HH:MM` in `timezone`.
    Times {
        /// Wake times, `HH:MM` 24-hour format.
        at: Vec<String>,
        /// Allowed weekdays, lowercase English day names (`"mon"`..`"sun"`).
        /// An empty list or the literal `["*"]` means all days.
        #[serde(default)]
        days: Vec<String>,
    },
    /// Wake every `every` elapsed since the last wake.
    Interval {
        /// Interval between wakes.
        every: RobotDuration,
    },
    /// Never wake on a fixed schedule; the robot runs only on human/event triggers.
    Daemon,
}

/// Clock trigger configuration (§2, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// IANA timezone name the clock evaluates wake times in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// The scheduling mode.
    #[serde(flatten)]
    pub mode: ClockMode,
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { timezone: default_timezone(), mode: ClockMode::Daemon }
    }
}

/// Concurrency and queueing limits for one robot (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum concurrent in-flight executions.
    #[serde(default = "default_quota_max")]
    pub max: usize,
    /// Maximum queued (admitted but not yet running) executions.
    #[serde(default = "default_quota_queue")]
    pub queue: usize,
    /// Default priority assigned to triggers without an explicit priority.
    #[serde(default = "default_quota_priority")]
    pub priority: u8,
}

fn default_quota_max() -> usize {
    2
}

fn default_quota_queue() -> usize {
    10
}

fn default_quota_priority() -> u8 {
    5
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max: default_quota_max(),
            queue: default_quota_queue(),
            priority: default_quota_priority(),
        }
    }
}

/// The delegated agent id for each phase that runs one, keyed by [`Phase`]
/// rather than a map so every phase gets a dedicated slot at compile time (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PhaseAgents {
    /// Agent id used for the inspiration phase.
    pub inspiration: Option<AgentId>,
    /// Agent id used for the goals phase.
    pub goals: Option<AgentId>,
    /// Agent id used for the tasks (planning) phase.
    pub tasks: Option<AgentId>,
    /// Agent id used to execute tasks whose executor kind is `assistant`.
    pub run: Option<AgentId>,
    /// Agent id used for a reflective learning phase.
    pub learning: Option<AgentId>,
}

impl PhaseAgents {
    /// The agent delegated for `phase`, if any. The delivery phase never has
    /// one.
    pub fn for_phase(&self, phase: Phase) -> Option<&AgentId> {
        match phase {
            Phase::Inspiration => self.inspiration.as_ref(),
            Phase::Goals => self.goals.as_ref(),
            Phase::Tasks => self.tasks.as_ref(),
            Phase::Run => self.run.as_ref(),
            Phase::Delivery => None,
            Phase::Learning => self.learning.as_ref(),
        }
    }
}

/// Resources delegated to a robot's executions (§3, §4.3, §4.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResourceConfig {
    /// Per-phase delegated agent id.
    #[serde(default)]
    pub agents: PhaseAgents,
    /// Tool servers reachable from this robot's executions.
    #[serde(default)]
    pub tool_servers: Vec<ToolServerId>,
}

/// A single delivery channel kind (§2, §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Deliver via a chat/messaging integration.
    Chat,
    /// Deliver via email.
    Email,
    /// Deliver via a webhook callback.
    Webhook,
    /// Write only to the job log; no external delivery.
    LogOnly,
}

/// One configured delivery target (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPreference {
    /// The channel kind.
    pub kind: ChannelKind,
    /// Opaque destination (channel id, address, URL) interpreted by the bridge.
    pub destination: String,
}

/// Delivery preferences for the delivery phase (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeliveryPreferences {
    /// Ordered list of channels to attempt delivery on.
    pub channels: Vec<ChannelPreference>,
    /// Stop at the first channel that succeeds rather than delivering to all.
    #[serde(default)]
    pub first_success_only: bool,
}

/// Which kind of learning is recorded at the end of an execution (§4.6, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningType {
    /// No learning phase is run.
    None,
    /// Append a structured outcome summary only.
    Summary,
    /// Run a full reflective learning agent invocation.
    Reflective,
}

impl Default for LearningType {
    fn default() -> Self {
        Self::Summary
    }
}

/// Learning phase configuration (§4.6, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LearningConfig {
    /// The kind of learning to record.
    #[serde(rename = "type")]
    pub kind: LearningType,
}

/// Which executor backend runs a task (§2, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorMode {
    /// Tasks execute for real against delegated executors.
    Standard,
    /// Tasks are planned and validated but never actually dispatched.
    Dryrun,
    /// Tasks execute against delegated executors inside an isolated sandbox.
    Sandbox,
}

impl Default for ExecutorMode {
    fn default() -> Self {
        Self::Standard
    }
}

/// Executor configuration for the run phase (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// The execution mode.
    #[serde(default)]
    pub mode: ExecutorMode,
    /// Hard wall-clock cap on a single execution's run phase.
    #[serde(default = "default_max_duration")]
    pub max_duration: RobotDuration,
}

/// The default run-phase timeout: 30 minutes.
fn default_max_duration() -> RobotDuration {
    RobotDuration::from_mins(30)
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { mode: ExecutorMode::default(), max_duration: default_max_duration() }
    }
}

/// Event trigger subscription configuration (§2, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventsConfig {
    /// Event sources this robot subscribes to.
    pub subscriptions: Vec<String>,
}

/// A robot's identity: its role, duties, and behavioral rules (§2, §3, §4.8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IdentityConfig {
    /// Short description of the robot's role.
    pub role: Option<String>,
    /// Standing duties the robot is responsible for.
    #[serde(default)]
    pub duties: Vec<String>,
    /// Behavioral rules the robot must follow across every phase.
    #[serde(default)]
    pub rules: Vec<String>,
}

/// The full persisted configuration for one robot (§2, §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Clock trigger configuration.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Per-kind trigger enable switches.
    #[serde(default)]
    pub triggers: TriggerSwitches,
    /// Concurrency and queue limits.
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Soft resource budgets.
    #[serde(default)]
    pub resources: ResourceConfig,
    /// Delivery preferences.
    #[serde(default)]
    pub delivery: DeliveryPreferences,
    /// Learning phase configuration.
    #[serde(default)]
    pub learning: LearningConfig,
    /// Executor configuration.
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Event subscriptions.
    #[serde(default)]
    pub events: EventsConfig,
    /// Delegated agent identities.
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// A robot held in the in-memory cache (§3, §4.2).
///
/// `executions` is a lightweight set of ids for introspection only — the
/// controller, not the robot, owns the authoritative execution map and its
/// control primitives (quota semaphore, pause channel, cancellation token).
/// An [`Execution`](crate::execution::Execution) points back at its robot via
/// its own `member_id` field rather than a borrow or `Weak`, so cache and
/// controller can evolve independently without an ownership cycle.
#[derive(Debug, Clone)]
pub struct Robot {
    /// Stable identifier.
    pub id: MemberId,
    /// Team this robot belongs to.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
    /// System prompt establishing this robot's persona and standing instructions.
    pub system_prompt: String,
    /// Whether this robot plans and acts without per-execution human approval.
    pub autonomous_mode: bool,
    /// Current status.
    pub status: RobotStatus,
    /// Effective configuration.
    pub config: Config,
    /// Ids of executions currently tracked as in-flight for this robot.
    pub executions: HashSet<ExecutionId>,
    /// When the clock matcher last admitted an execution for this robot.
    /// `None` is the "zero value" the matcher treats as "never run".
    pub last_run: Option<chrono::DateTime<chrono::Utc>>,
    /// Arbitrary extension metadata, round-tripped but not interpreted.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Robot {
    /// Construct a new idle, autonomous robot with default configuration and
    /// no system prompt.
    pub fn new(id: MemberId, team_id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            team_id,
            name: name.into(),
            system_prompt: String::new(),
            autonomous_mode: true,
            status: RobotStatus::Idle,
            config: Config::default(),
            executions: HashSet::new(),
            last_run: None,
            metadata: HashMap::new(),
        }
    }

    /// Whether this robot currently accepts new triggers of the given kind.
    pub fn accepts(&self, enabled: bool) -> bool {
        matches!(self.status, RobotStatus::Idle | RobotStatus::Working) && enabled
    }
}

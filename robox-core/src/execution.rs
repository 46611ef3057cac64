//! Trigger inputs and the per-execution record (§2, §4.4, §4.6).

use crate::id::{ExecutionId, MemberId, SessionId};
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three entrypoint kinds that can start an execution (§2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Scheduled wake from the clock.
    Clock,
    /// A human operator intervention.
    Human,
    /// An external event delivery.
    Event,
}

/// Human intervention actions (§2, §4.4). Each carries the data it needs;
/// actions that reference an existing task/goal/plan item do so by string id
/// since those ids are assigned by the planning phases, not known up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InterventionAction {
    /// Add a new task to the current plan.
    TaskAdd {
        /// Free-form description of the task to add.
        description: String,
    },
    /// Cancel a specific pending or running task.
    TaskCancel {
        /// Id of the task to cancel.
        task_id: String,
    },
    /// Update a task's description or parameters.
    TaskUpdate {
        /// Id of the task to update.
        task_id: String,
        /// New description.
        description: String,
    },
    /// Add a new goal.
    GoalAdd {
        /// Free-form description of the goal to add.
        description: String,
    },
    /// Adjust an existing goal's description or priority.
    GoalAdjust {
        /// Id of the goal to adjust.
        goal_id: String,
        /// New description.
        description: String,
    },
    /// Mark a goal complete.
    GoalComplete {
        /// Id of the goal to complete.
        goal_id: String,
    },
    /// Cancel a goal and any tasks derived from it.
    GoalCancel {
        /// Id of the goal to cancel.
        goal_id: String,
    },
    /// Add a step to the current plan.
    PlanAdd {
        /// Free-form description of the plan step.
        description: String,
        /// When the step should be scheduled for.
        plan_time: chrono::DateTime<chrono::Utc>,
    },
    /// Remove a step from the current plan.
    PlanRemove {
        /// Id of the plan step to remove.
        plan_id: String,
    },
    /// Update an existing plan step.
    PlanUpdate {
        /// Id of the plan step to update.
        plan_id: String,
        /// New description.
        description: String,
    },
    /// Free-form natural-language instruction with no structured target.
    Instruct {
        /// The instruction text.
        message: String,
    },
}

/// Free-form human messages accompanying an intervention (§2, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanTriggerInput {
    /// The intervention action requested.
    pub action: InterventionAction,
    /// Chat-style messages giving the action context; required for all
    /// actions except those that are purely structural id references.
    pub messages: Vec<String>,
    /// Id of the operator that submitted this intervention.
    pub user_id: String,
    /// BCP-47-ish locale tag (e.g. `"en"`, `"zh-CN"`) governing log
    /// localization for the resulting execution (§4.7).
    pub locale: String,
    /// Id of an existing execution to intervene on, if continuing one.
    pub execution_id: Option<ExecutionId>,
}

/// An external event delivery (§2, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTriggerInput {
    /// Which subscribed source produced this event.
    pub source: String,
    /// The event type, matched against `events.subscriptions`.
    pub event_type: String,
    /// Arbitrary event payload.
    pub payload: serde_json::Value,
}

/// Calendar/clock context computed at clock-trigger time (§4.4, §9), passed
/// to the inspiration phase so planning agents can reason about recurring
/// schedules without doing date arithmetic themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockContext {
    /// Hour of day, 0-23, in the robot's configured timezone.
    pub hour: u32,
    /// Day of week, 0 = Monday .. 6 = Sunday.
    pub weekday: u32,
    /// Day of month, 1-31.
    pub day_of_month: u32,
    /// ISO week number.
    pub iso_week: u32,
    /// Month, 1-12.
    pub month: u32,
    /// Year.
    pub year: i32,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// First day of the month.
    pub is_month_start: bool,
    /// Last day of the month.
    pub is_month_end: bool,
    /// Last day of a calendar quarter.
    pub is_quarter_end: bool,
    /// Last day of the year.
    pub is_year_end: bool,
}

/// What started this execution (§2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerInput {
    /// Scheduled wake.
    Clock {
        /// Calendar context at wake time.
        context: ClockContext,
    },
    /// Human intervention.
    Human(HumanTriggerInput),
    /// External event.
    Event(EventTriggerInput),
}

impl TriggerInput {
    /// The trigger kind this input carries.
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::Clock { .. } => TriggerKind::Clock,
            Self::Human(_) => TriggerKind::Human,
            Self::Event(_) => TriggerKind::Event,
        }
    }
}

/// Lifecycle status of one execution (§4.3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Admitted, waiting for a quota slot.
    Queued,
    /// Holding a quota slot, a phase is actively running.
    Running,
    /// Running but suspended at a phase boundary awaiting resume.
    Paused,
    /// Completed all phases successfully.
    Completed,
    /// A phase returned an unrecoverable error.
    Failed,
    /// Cancelled before completion.
    Cancelled,
    /// Exceeded `executor.max_duration`.
    TimedOut,
}

/// Per-phase outputs accumulated as an execution advances (§4.6).
///
/// Each field is populated once its phase completes and is available to
/// every later phase via the execution record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutputs {
    /// Inspiration phase output: free-form situational assessment.
    pub inspiration: Option<serde_json::Value>,
    /// Goals phase output: the goal list produced.
    pub goals: Option<serde_json::Value>,
    /// Tasks phase output: the task plan produced.
    pub tasks: Option<serde_json::Value>,
    /// Run phase output: results of each executed task.
    pub run: Option<serde_json::Value>,
    /// Delivery phase output: per-channel delivery results.
    pub delivery: Option<serde_json::Value>,
    /// Learning phase output: the recorded outcome summary.
    pub learning: Option<serde_json::Value>,
}

/// One triggered, running-or-finished execution (§2, §4.3, §4.6).
///
/// `member_id` is this execution's only link back to its owning
/// [`Robot`](crate::robot::Robot) — a plain id, not a borrow, so executions
/// outlive cache eviction and carry no lifetime.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Unique id for this execution.
    pub id: ExecutionId,
    /// The robot this execution belongs to.
    pub member_id: MemberId,
    /// Bridge session id, assigned once the first phase opens a context.
    pub session_id: Option<SessionId>,
    /// What started this execution.
    pub trigger: TriggerInput,
    /// Priority inherited from the trigger or the robot's default.
    pub priority: u8,
    /// Current lifecycle status.
    pub status: ExecutionStatus,
    /// The phase currently executing or about to execute.
    pub current_phase: Phase,
    /// Accumulated per-phase outputs.
    pub outputs: PhaseOutputs,
    /// When this execution was admitted.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When this execution left a terminal state, if it has.
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Arbitrary extension metadata.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Execution {
    /// Whether this execution is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Completed
                | ExecutionStatus::Failed
                | ExecutionStatus::Cancelled
                | ExecutionStatus::TimedOut
        )
    }

    /// The locale governing log localization for this execution (§4.7).
    /// Only human triggers carry one explicitly; clock and event triggers
    /// default to English.
    pub fn locale(&self) -> &str {
        match &self.trigger {
            TriggerInput::Human(input) => &input.locale,
            TriggerInput::Clock { .. } | TriggerInput::Event(_) => "en",
        }
    }
}

//! Error taxonomy (§7), one `#[non_exhaustive]` enum per protocol boundary —
//! mirrors the teacher's per-protocol `OperatorError` / `OrchError` /
//! `StateError` / `EnvError` / `HookError` split.

use thiserror::Error;

/// Errors from trigger entrypoint validation and admission (§4.4, §7).
///
/// Returned to the caller immediately, without touching the execution store.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The trigger carried no member id.
    #[error("missing identity: member id is required")]
    MissingIdentity,

    /// The target robot was not found in the cache.
    #[error("robot not found: {0}")]
    RobotNotFound(String),

    /// The robot is paused and cannot accept new triggers.
    #[error("robot paused: {0}")]
    RobotPaused(String),

    /// The robot is in an error or maintenance status and cannot accept new
    /// triggers.
    #[error("robot unavailable: {member} is in {status} status")]
    RobotUnavailable {
        /// The robot the trigger targeted.
        member: String,
        /// The robot's current status.
        status: String,
    },

    /// `triggers.<kind>.enabled` is false for this robot.
    #[error("trigger disabled: {kind} triggers are disabled for {member}")]
    TriggerDisabled {
        /// Which trigger kind was disabled.
        kind: String,
        /// The robot the trigger targeted.
        member: String,
    },

    /// A human intervention action requires a non-empty message list and none was given.
    #[error("messages required for action: {0}")]
    MessagesRequired(String),

    /// `plan.add` requires a plan time and none was given.
    #[error("plan time required for action: plan.add")]
    PlanTimeRequired,

    /// An event trigger was missing its source or event type.
    #[error("event trigger missing field: {0}")]
    EventFieldMissing(String),

    /// The dedup oracle decided to drop this trigger.
    #[error("deduplicated: {0}")]
    Deduplicated(String),

    /// An event's type is not in the robot's configured subscriptions.
    #[error("event type {event_type} is not subscribed for {member}")]
    NotSubscribed {
        /// The event type that was delivered.
        event_type: String,
        /// The robot the event targeted.
        member: String,
    },

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Errors from the execution controller: quota, pause/resume, cancel (§4.3, §7).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The robot is at `quota.max` concurrent executions.
    #[error("robot busy: quota exceeded for {0}")]
    QuotaExceeded(String),

    /// The execution was cancelled (observed at a suspension point).
    #[error("execution cancelled: {0}")]
    Cancelled(String),

    /// The execution timed out per `executor.max_duration`.
    #[error("execution timed out: {0}")]
    TimedOut(String),

    /// No such execution is tracked.
    #[error("execution not found: {0}")]
    NotFound(String),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Errors from phase handler execution (§4.6, §7).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PhaseError {
    /// The delegated agent for this phase was not configured/found.
    #[error("phase agent not found: {0}")]
    AgentNotFound(String),

    /// Goal generation failed.
    #[error("goal generation failed: {0}")]
    GoalGenerationFailed(String),

    /// Task planning failed.
    #[error("task planning failed: {0}")]
    TaskPlanningFailed(String),

    /// A task's executor failed during the run phase.
    #[error("task execution failed: {0}")]
    TaskExecutionFailed(String),

    /// Delivery to one or more channels failed.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// The phase handler panicked; caught at the worker boundary (§7).
    #[error("phase handler panicked: {0}")]
    Panicked(String),

    /// The agent bridge reported an error.
    #[error("agent bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Errors from the agent-invocation bridge (§4.8, §7).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The scoped script context could not be opened.
    #[error("context open failed: {0}")]
    ContextFailed(String),

    /// The method invocation raised a non-absence error.
    #[error("method invocation failed: {0}")]
    InvocationFailed(String),

    /// The result could not be deserialized into the expected response shape.
    #[error("response parse failed: {0}")]
    ParseFailed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

/// Errors from the job/log bridge and member store (§4.7, §6, §7).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row exists for the given id.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The persisted config payload could not be decoded.
    #[error("config decode failed: {0}")]
    ConfigDecodeFailed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(String),
}

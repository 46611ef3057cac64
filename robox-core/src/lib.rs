//! Protocol types and trait boundaries for the autonomous robot orchestrator.
//!
//! This crate defines the domain model (robots, executions, phases, tasks)
//! and the trait boundaries (`AgentBridge`, `JobLogStore`, `MemberStore`)
//! that the rest of the workspace implements and drives. It has no async
//! runtime dependency beyond `async-trait`'s trait-object plumbing, and
//! pulls in `tokio` only behind the `test-utils` feature for shared test
//! fixtures consumed by downstream crates.

pub mod bridge;
pub mod delivery;
pub mod duration;
pub mod error;
pub mod execution;
pub mod id;
pub mod phase;
pub mod robot;
pub mod store;
pub mod task;

#[cfg(feature = "test-utils")]
pub mod test_utils;

/// Common imports for crates implementing the orchestrator protocols.
pub mod prelude {
    pub use crate::bridge::{AgentBridge, BridgeContext, CreateOutcome, NextOutcome};
    pub use crate::delivery::{ChannelResult, ChannelTarget, DeliveryContent, DeliveryResult};
    pub use crate::duration::RobotDuration;
    pub use crate::error::{BridgeError, ControllerError, PhaseError, StoreError, TriggerError};
    pub use crate::execution::{
        ClockContext, Execution, EventTriggerInput, ExecutionStatus, HumanTriggerInput,
        InterventionAction, PhaseOutputs, TriggerInput, TriggerKind,
    };
    pub use crate::id::{AgentId, ExecutionId, JobId, MemberId, SessionId, TeamId, ToolServerId};
    pub use crate::phase::Phase;
    pub use crate::robot::{
        ChannelKind, ChannelPreference, ClockConfig, ClockMode, Config, DeliveryPreferences,
        EventsConfig, ExecutorConfig, ExecutorMode, IdentityConfig, LearningConfig, LearningType,
        PhaseAgents, QuotaConfig, ResourceConfig, Robot, RobotStatus, TriggerSwitches,
    };
    pub use crate::store::{
        ConfigPayload, ExecutionRow, JobLogStore, JobRow, LogEntry, LogLevel, MemberRecord,
        MemberStore, TriggerCategory,
    };
    pub use crate::task::{ExecutorKind, Task, TaskResult, TaskStatus, ValidationResult};
}

#![deny(missing_docs)]
//! # robox — umbrella crate
//!
//! Provides a single import surface for the autonomous robot orchestrator.
//! Re-exports the protocol crate and the core pipeline (cache, controller,
//! pool, phases, triggers), plus the swappable backends behind feature
//! flags, a `prelude` for the happy path, and [`Orchestrator`], a thin
//! facade that wires all of it together the way every integration test in
//! this workspace already does by hand.

pub use robox_cache;
pub use robox_clock;
pub use robox_controller;
pub use robox_core;
pub use robox_phases;
pub use robox_pool;
pub use robox_triggers;

#[cfg(feature = "agent-bridge")]
pub use robox_agent_bridge;

#[cfg(feature = "memory-store")]
pub use robox_store_memory;

mod orchestrator;
pub use orchestrator::Orchestrator;

/// Happy-path imports for composing an orchestrator deployment.
pub mod prelude {
    pub use robox_cache::RobotCache;
    pub use robox_clock::{build_clock_context, should_wake};
    pub use robox_controller::{AcquireOutcome, ExecutionControl, ExecutionController};
    pub use robox_core::prelude::*;
    pub use robox_phases::{
        AssistantExecutor, ChannelSender, LogOnlyChannelSender, PassthroughExecutor, StateMachine,
        TaskExecutor,
    };
    pub use robox_pool::{PhaseDriver, WorkerPool};
    pub use robox_triggers::{ClockTickOutcome, DedupDecision, DedupOracle, TriggerGateway};

    #[cfg(feature = "agent-bridge")]
    pub use robox_agent_bridge::{Delegate, LocalAgentBridge};

    #[cfg(feature = "memory-store")]
    pub use robox_store_memory::{MemoryJobLogStore, MemoryMemberStore};
}

//! Convenience facade wiring the stock implementations together.

use robox_cache::RobotCache;
use robox_controller::ExecutionController;
use robox_core::bridge::AgentBridge;
use robox_core::error::TriggerError;
use robox_core::execution::{EventTriggerInput, HumanTriggerInput};
use robox_core::id::{MemberId, TeamId};
use robox_core::store::{JobLogStore, MemberStore};
use robox_phases::{ChannelSender, StateMachine, TaskExecutor};
use robox_pool::WorkerPool;
use robox_triggers::TriggerGateway;
use std::sync::Arc;

/// A fully wired orchestrator: the robot cache, execution controller, worker
/// pool running the six-phase [`StateMachine`], and the [`TriggerGateway`]
/// that admits clock, human, and event triggers onto it.
///
/// Mirrors the wiring every integration test in this workspace performs by
/// hand; use it directly when a deployment doesn't need to substitute any
/// of the individual pieces.
pub struct Orchestrator {
    cache: Arc<RobotCache>,
    controller: Arc<ExecutionController>,
    gateway: Arc<TriggerGateway>,
}

impl Orchestrator {
    /// Assemble an orchestrator over a backing [`MemberStore`] and
    /// [`JobLogStore`], driving executions through `bridge` with the given
    /// task executor and channel sender.
    ///
    /// `worker_count` and `queue_capacity` size the underlying
    /// [`WorkerPool`].
    pub fn new(
        store: Arc<dyn MemberStore>,
        log_store: Arc<dyn JobLogStore>,
        bridge: Arc<dyn AgentBridge>,
        task_executor: Arc<dyn TaskExecutor>,
        channel_sender: Arc<dyn ChannelSender>,
        worker_count: usize,
        queue_capacity: usize,
    ) -> Self {
        let cache = Arc::new(RobotCache::new(store));
        let controller = Arc::new(ExecutionController::new());
        let driver = Arc::new(StateMachine::new(
            Arc::clone(&cache),
            Arc::clone(&controller),
            bridge,
            log_store,
            task_executor,
            channel_sender,
        ));
        let pool = Arc::new(WorkerPool::start(
            worker_count,
            queue_capacity,
            Arc::clone(&cache),
            Arc::clone(&controller),
            driver,
        ));
        let gateway = Arc::new(TriggerGateway::new(Arc::clone(&cache), Arc::clone(&controller), pool));
        Self { cache, controller, gateway }
    }

    /// The robot cache backing this orchestrator.
    pub fn cache(&self) -> &Arc<RobotCache> {
        &self.cache
    }

    /// The execution controller backing this orchestrator.
    pub fn controller(&self) -> &Arc<ExecutionController> {
        &self.controller
    }

    /// Hydrate every member of `team_id` from the backing store into the
    /// cache.
    pub async fn hydrate_team(&self, team_id: &TeamId) -> Result<usize, robox_core::error::StoreError> {
        self.cache.hydrate_team(team_id).await
    }

    /// Sweep every cached robot, admitting a clock-triggered execution for
    /// each one due to wake at `now`.
    pub async fn run_clock_tick(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Vec<robox_triggers::ClockTickOutcome> {
        self.gateway.run_clock_tick(now).await
    }

    /// Admit a human intervention.
    pub async fn submit_human(
        &self,
        member_id: MemberId,
        input: HumanTriggerInput,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), TriggerError> {
        self.gateway.submit_human(member_id, input, now).await
    }

    /// Admit an external event delivery.
    pub async fn submit_event(
        &self,
        member_id: MemberId,
        input: EventTriggerInput,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), TriggerError> {
        self.gateway.submit_event(member_id, input, now).await
    }
}

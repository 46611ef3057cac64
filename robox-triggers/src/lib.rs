#![deny(missing_docs)]
//! Trigger entrypoints (§4.4): the three convergent paths — clock tick,
//! human intervention, and event delivery — that all funnel into
//! [`robox_pool::WorkerPool::submit`].
//!
//! [`TriggerGateway`] is the single point a caller (an HTTP handler, a
//! scheduler loop, an event bus consumer) goes through: it resolves the
//! robot, checks the per-kind enable switch, validates the payload,
//! consults the [`DedupOracle`], and on success builds the
//! [`Execution`](robox_core::execution::Execution) and submits it.

mod dedup;
mod validation;

pub use dedup::{DedupDecision, DedupOracle};
pub use validation::{validate_event, validate_human};

use robox_cache::RobotCache;
use robox_controller::ExecutionController;
use robox_core::error::TriggerError;
use robox_core::execution::{
    EventTriggerInput, Execution, ExecutionStatus, HumanTriggerInput, PhaseOutputs, TriggerInput,
    TriggerKind,
};
use robox_core::id::{ExecutionId, MemberId};
use robox_core::phase::Phase;
use robox_pool::WorkerPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-robot outcome of one clock tick sweep.
#[derive(Debug, Clone)]
pub struct ClockTickOutcome {
    /// The robot considered.
    pub member_id: MemberId,
    /// Whether it was admitted, and if not, why.
    pub result: Result<(), TriggerError>,
}

/// Converges the three trigger entrypoints onto the worker pool (§4.4).
pub struct TriggerGateway {
    cache: Arc<RobotCache>,
    controller: Arc<ExecutionController>,
    pool: Arc<WorkerPool>,
    dedup: DedupOracle,
}

impl TriggerGateway {
    /// Construct a gateway over the given collaborators, with the default
    /// dedup window (see [`DedupOracle::default`]).
    pub fn new(cache: Arc<RobotCache>, controller: Arc<ExecutionController>, pool: Arc<WorkerPool>) -> Self {
        Self { cache, controller, pool, dedup: DedupOracle::default() }
    }

    /// Construct a gateway with an explicit dedup window.
    pub fn with_dedup_window(
        cache: Arc<RobotCache>,
        controller: Arc<ExecutionController>,
        pool: Arc<WorkerPool>,
        window: chrono::Duration,
    ) -> Self {
        Self { cache, controller, pool, dedup: DedupOracle::new(window) }
    }

    /// Sweep every cached robot at `now`, admitting a clock-triggered
    /// execution for each one the clock matcher (§4.2) says should wake.
    ///
    /// Callers drive this on a periodic tick no finer than one-minute
    /// granularity (§4.4); the sweep itself is just one pass over the cache.
    pub async fn run_clock_tick(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<ClockTickOutcome> {
        let mut outcomes = Vec::new();
        for robot in self.cache.all().await {
            if !robot.accepts(robot.config.triggers.clock) {
                continue;
            }

            let running = self.controller.running_count(&robot.id).await;
            let has_free_quota = running < robot.config.quota.max;
            if !robox_clock::should_wake(&robot, now, has_free_quota) {
                continue;
            }

            // Same-minute dedup is the clock matcher's own job (§4.2); the
            // oracle always answers `Proceed` here.
            let _ = self.dedup.check(&robot.id, TriggerKind::Clock, now).await;

            let context = robox_clock::build_clock_context(&robot, now);
            let execution = Execution {
                id: ExecutionId::new(uuid::Uuid::new_v4().to_string()),
                member_id: robot.id.clone(),
                session_id: None,
                trigger: TriggerInput::Clock { context },
                priority: robot.config.quota.priority,
                status: ExecutionStatus::Queued,
                current_phase: Phase::entry_phase(TriggerKind::Clock),
                outputs: PhaseOutputs::default(),
                created_at: now,
                finished_at: None,
                metadata: HashMap::new(),
            };

            let result = self.pool.submit(execution).await;
            if result.is_ok() {
                self.cache.mark_run(&robot.id, now).await;
                info!(robot_id = %robot.id, "clock tick admitted execution");
            } else {
                debug!(robot_id = %robot.id, ?result, "clock tick admission refused");
            }
            outcomes.push(ClockTickOutcome { member_id: robot.id.clone(), result });
        }
        outcomes
    }

    /// Admit a human intervention (§4.4).
    pub async fn submit_human(
        &self,
        member_id: MemberId,
        input: HumanTriggerInput,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), TriggerError> {
        if member_id.as_str().trim().is_empty() {
            return Err(TriggerError::MissingIdentity);
        }
        let robot = self
            .cache
            .get(&member_id)
            .await
            .ok_or_else(|| TriggerError::RobotNotFound(member_id.to_string()))?;
        if !robot.config.triggers.human {
            return Err(TriggerError::TriggerDisabled {
                kind: "human".to_owned(),
                member: member_id.to_string(),
            });
        }
        validate_human(&input)?;

        if matches!(self.dedup.check(&member_id, TriggerKind::Human, now).await, DedupDecision::Skip) {
            return Err(TriggerError::Deduplicated(format!("human trigger for {member_id}")));
        }

        let execution = Execution {
            id: ExecutionId::new(uuid::Uuid::new_v4().to_string()),
            member_id: member_id.clone(),
            session_id: None,
            trigger: TriggerInput::Human(input),
            priority: robot.config.quota.priority,
            status: ExecutionStatus::Queued,
            current_phase: Phase::entry_phase(TriggerKind::Human),
            outputs: PhaseOutputs::default(),
            created_at: now,
            finished_at: None,
            metadata: HashMap::new(),
        };
        self.pool.submit(execution).await
    }

    /// Admit an external event delivery (§4.4).
    pub async fn submit_event(
        &self,
        member_id: MemberId,
        input: EventTriggerInput,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), TriggerError> {
        if member_id.as_str().trim().is_empty() {
            return Err(TriggerError::MissingIdentity);
        }
        let robot = self
            .cache
            .get(&member_id)
            .await
            .ok_or_else(|| TriggerError::RobotNotFound(member_id.to_string()))?;
        if !robot.config.triggers.event {
            return Err(TriggerError::TriggerDisabled {
                kind: "event".to_owned(),
                member: member_id.to_string(),
            });
        }
        validate_event(&input)?;

        let subscriptions = &robot.config.events.subscriptions;
        if !subscriptions.is_empty() && !subscriptions.contains(&input.event_type) {
            return Err(TriggerError::NotSubscribed {
                event_type: input.event_type.clone(),
                member: member_id.to_string(),
            });
        }

        match self.dedup.check(&member_id, TriggerKind::Event, now).await {
            DedupDecision::Skip => {
                return Err(TriggerError::Deduplicated(format!("event trigger for {member_id}")));
            }
            DedupDecision::Merge => {
                // No queued request to fold this payload into yet — the
                // event is admitted as its own execution, but logged so the
                // dedup signal is still observable.
                warn!(robot_id = %member_id, event_type = %input.event_type, "event merge window hit, admitting as a new execution");
            }
            DedupDecision::Proceed => {}
        }

        let execution = Execution {
            id: ExecutionId::new(uuid::Uuid::new_v4().to_string()),
            member_id: member_id.clone(),
            session_id: None,
            trigger: TriggerInput::Event(input),
            priority: robot.config.quota.priority,
            status: ExecutionStatus::Queued,
            current_phase: Phase::entry_phase(TriggerKind::Event),
            outputs: PhaseOutputs::default(),
            created_at: now,
            finished_at: None,
            metadata: HashMap::new(),
        };
        self.pool.submit(execution).await
    }
}

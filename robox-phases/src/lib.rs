#![deny(missing_docs)]
//! The six-phase execution state machine (§4.6) and its phase handlers.
//!
//! [`StateMachine`] implements `robox_pool::PhaseDriver`: given an admitted
//! [`Execution`], it drives the fixed phase sequence from the execution's
//! entry phase to a terminal status, consulting an
//! [`AgentBridge`](robox_core::bridge::AgentBridge) for phase content and a
//! [`JobLogStore`](robox_core::store::JobLogStore) for the durable job/log
//! trail, and honouring pause/cancel via the matching
//! [`ExecutionControl`](robox_controller::ExecutionControl).

mod delivery;
mod handlers;
mod locale;
mod tasks;

use async_trait::async_trait;
use futures::FutureExt;
use robox_cache::RobotCache;
use robox_controller::ExecutionController;
use robox_core::bridge::AgentBridge;
use robox_core::execution::{Execution, ExecutionStatus};
use robox_core::id::{ExecutionId, JobId};
use robox_core::phase::Phase;
use robox_core::store::{JobLogStore, JobRow, LogEntry, LogLevel, TriggerCategory};
use robox_pool::PhaseDriver;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub use delivery::{ChannelSender, LogOnlyChannelSender};
pub use tasks::{AssistantExecutor, PassthroughExecutor, TaskExecutor};

/// Drives executions through the fixed phase sequence.
pub struct StateMachine {
    cache: Arc<RobotCache>,
    controller: Arc<ExecutionController>,
    bridge: Arc<dyn AgentBridge>,
    store: Arc<dyn JobLogStore>,
    task_executor: Arc<dyn TaskExecutor>,
    channel_sender: Arc<dyn ChannelSender>,
}

impl StateMachine {
    /// Construct a state machine over the given collaborators.
    pub fn new(
        cache: Arc<RobotCache>,
        controller: Arc<ExecutionController>,
        bridge: Arc<dyn AgentBridge>,
        store: Arc<dyn JobLogStore>,
        task_executor: Arc<dyn TaskExecutor>,
        channel_sender: Arc<dyn ChannelSender>,
    ) -> Self {
        Self { cache, controller, bridge, store, task_executor, channel_sender }
    }

    #[allow(clippy::too_many_arguments)]
    async fn log(
        &self,
        job_id: &JobId,
        execution_id: &ExecutionId,
        sequence: u64,
        level: LogLevel,
        phase: Option<Phase>,
        step: Option<&str>,
        message: impl Into<String>,
    ) {
        let entry = LogEntry {
            at: chrono::Utc::now(),
            execution_id: execution_id.clone(),
            job_id: job_id.clone(),
            level,
            phase,
            step: step.map(str::to_owned),
            message: message.into(),
            context: None,
            sequence,
        };
        if let Err(err) = self.store.append_log(job_id, entry).await {
            warn!(job_id = %job_id, error = %err, "failed to append log entry");
        }
    }

    async fn update_phase(&self, job_id: &JobId, status: ExecutionStatus, phase: Phase) {
        if let Err(err) = self.store.update_status(job_id, status, phase).await {
            warn!(job_id = %job_id, error = %err, "failed to persist phase/status update");
        }
    }
}

#[async_trait]
impl PhaseDriver for StateMachine {
    async fn run(&self, mut execution: Execution) -> ExecutionStatus {
        let job_id = JobId::for_execution(&execution.id);
        let robot = match self.cache.get(&execution.member_id).await {
            Some(robot) => robot,
            None => {
                warn!(execution_id = %execution.id, "robot missing from cache at run time");
                return ExecutionStatus::Failed;
            }
        };
        let control = self.controller.get(&execution.member_id, &execution.id).await;

        let trigger_category = TriggerCategory::from(execution.trigger.kind());
        if let Err(err) = self
            .store
            .create_job(JobRow {
                job_id: job_id.clone(),
                execution_id: execution.id.clone(),
                member_id: execution.member_id.clone(),
                trigger: trigger_category,
                status: ExecutionStatus::Queued,
                phase: execution.current_phase,
                progress: execution.current_phase.progress(),
                logs: Vec::new(),
                created_at: execution.created_at,
                finished_at: None,
            })
            .await
        {
            warn!(execution_id = %execution.id, error = %err, "failed to create job row");
        }

        execution.status = ExecutionStatus::Running;
        let entry_phase = Phase::entry_phase(execution.trigger.kind());
        execution.current_phase = entry_phase;
        let locale = execution.locale().to_owned();
        let mut sequence: u64 = 0;

        if handlers::is_simulated_failure(&execution.trigger) {
            self.log(
                &job_id,
                &execution.id,
                next_seq(&mut sequence),
                LogLevel::Error,
                Some(entry_phase),
                Some(locale::phase_slug(entry_phase)),
                locale::simulated_failure(&locale),
            )
            .await;
            self.update_phase(&job_id, ExecutionStatus::Failed, entry_phase).await;
            return ExecutionStatus::Failed;
        }

        let total_start = Instant::now();
        let mut phase = entry_phase;
        let final_status = loop {
            execution.current_phase = phase;
            self.update_phase(&job_id, ExecutionStatus::Running, phase).await;
            self.log(
                &job_id,
                &execution.id,
                next_seq(&mut sequence),
                LogLevel::Info,
                Some(phase),
                Some(locale::phase_slug(phase)),
                locale::phase_started(&locale, phase),
            )
            .await;
            let phase_start = Instant::now();

            if let Some(control) = &control {
                if control.wait_if_paused().await.is_err() {
                    self.log(
                        &job_id,
                        &execution.id,
                        next_seq(&mut sequence),
                        LogLevel::Error,
                        Some(phase),
                        Some(locale::phase_slug(phase)),
                        locale::cancelled_while_paused(&locale),
                    )
                    .await;
                    break ExecutionStatus::Cancelled;
                }
            }

            let handler = handlers::run_phase(
                phase,
                &robot,
                &execution,
                self.bridge.as_ref(),
                self.task_executor.as_ref(),
                self.channel_sender.as_ref(),
            );
            let outcome = AssertUnwindSafe(handler).catch_unwind().await;

            match outcome {
                Ok(Ok(output)) => {
                    handlers::write_output(&mut execution, phase, output);
                    let elapsed_ms = phase_start.elapsed().as_millis();
                    self.log(
                        &job_id,
                        &execution.id,
                        next_seq(&mut sequence),
                        LogLevel::Info,
                        Some(phase),
                        Some(locale::phase_slug(phase)),
                        locale::phase_completed(&locale, phase, elapsed_ms),
                    )
                    .await;
                }
                Ok(Err(err)) => {
                    self.log(
                        &job_id,
                        &execution.id,
                        next_seq(&mut sequence),
                        LogLevel::Error,
                        Some(phase),
                        Some(locale::phase_slug(phase)),
                        locale::phase_failed(&locale, phase, &err),
                    )
                    .await;
                    self.update_phase(&job_id, ExecutionStatus::Failed, phase).await;
                    break ExecutionStatus::Failed;
                }
                Err(panic) => {
                    let message = panic_message(panic);
                    self.log(
                        &job_id,
                        &execution.id,
                        next_seq(&mut sequence),
                        LogLevel::Error,
                        Some(phase),
                        Some(locale::phase_slug(phase)),
                        locale::phase_panicked(&locale, phase, &message),
                    )
                    .await;
                    self.update_phase(&job_id, ExecutionStatus::Failed, phase).await;
                    break ExecutionStatus::Failed;
                }
            }

            match phase.next() {
                Some(next) => phase = next,
                None => break ExecutionStatus::Completed,
            }
        };

        execution.status = final_status;
        execution.finished_at = Some(chrono::Utc::now());
        self.update_phase(&job_id, final_status, execution.current_phase).await;
        let total_elapsed_ms = total_start.elapsed().as_millis();
        match final_status {
            ExecutionStatus::Completed => {
                self.log(
                    &job_id,
                    &execution.id,
                    next_seq(&mut sequence),
                    LogLevel::Info,
                    None,
                    None,
                    locale::execution_completed(&locale, total_elapsed_ms),
                )
                .await;
                info!(execution_id = %execution.id, total_elapsed_ms, "execution completed");
            }
            ExecutionStatus::Cancelled => {
                self.log(
                    &job_id,
                    &execution.id,
                    next_seq(&mut sequence),
                    LogLevel::Error,
                    None,
                    None,
                    locale::execution_cancelled(&locale),
                )
                .await;
            }
            _ => {
                self.log(
                    &job_id,
                    &execution.id,
                    next_seq(&mut sequence),
                    LogLevel::Error,
                    None,
                    None,
                    locale::execution_failed(&locale),
                )
                .await;
            }
        }

        final_status
    }
}

fn next_seq(sequence: &mut u64) -> u64 {
    let current = *sequence;
    *sequence += 1;
    current
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#![deny(missing_docs)]
//! Bounded worker pool (§4.5).
//!
//! `submit` looks up the robot, checks it is accepting work, attempts the
//! atomic quota acquisition, and — on success — enqueues the admitted
//! execution onto a bounded internal queue. A fixed number of worker tasks,
//! started at construction, pop from that queue and hand each execution to
//! a [`PhaseDriver`] (implemented by `robox-phases`). When the driver
//! returns, the worker releases the execution's quota slot and untracks it
//! from the controller, regardless of how the execution ended.

use async_trait::async_trait;
use robox_cache::RobotCache;
use robox_controller::{AcquireOutcome, ExecutionController};
use robox_core::error::TriggerError;
use robox_core::execution::{Execution, ExecutionStatus};
use robox_core::id::MemberId;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

/// Drives one admitted execution through the phase state machine to a
/// terminal status. Implemented by `robox-phases`; kept as a trait here so
/// the pool does not depend on the phase-handler crate.
#[async_trait]
pub trait PhaseDriver: Send + Sync {
    /// Run `execution` to completion, returning its terminal status.
    async fn run(&self, execution: Execution) -> ExecutionStatus;
}

/// A bounded worker pool submitting admitted executions to a [`PhaseDriver`].
pub struct WorkerPool {
    cache: Arc<RobotCache>,
    controller: Arc<ExecutionController>,
    sender: mpsc::Sender<Execution>,
    workers: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl WorkerPool {
    /// Start a pool with `worker_count` concurrent workers and an internal
    /// queue bounded at `queue_capacity` admitted-but-not-yet-running
    /// executions.
    pub fn start(
        worker_count: usize,
        queue_capacity: usize,
        cache: Arc<RobotCache>,
        controller: Arc<ExecutionController>,
        driver: Arc<dyn PhaseDriver>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count.max(1) {
            let receiver = Arc::clone(&receiver);
            let cache = Arc::clone(&cache);
            let controller = Arc::clone(&controller);
            let driver = Arc::clone(&driver);
            workers.push(tokio::spawn(async move {
                worker_loop(worker_id, receiver, cache, controller, driver).await;
            }));
        }

        Self { cache, controller, sender, workers: Mutex::new(workers) }
    }

    /// Submit a newly triggered execution for admission and eventual run.
    ///
    /// Looks up the robot, attempts atomic quota acquisition, and enqueues
    /// on success. Returns a [`TriggerError::RobotNotFound`],
    /// [`TriggerError::RobotPaused`], [`TriggerError::RobotUnavailable`], or
    /// [`TriggerError::Other`] for a quota-exceeded or full-queue refusal.
    pub async fn submit(&self, execution: Execution) -> Result<(), TriggerError> {
        let robot = self
            .cache
            .get(&execution.member_id)
            .await
            .ok_or_else(|| TriggerError::RobotNotFound(execution.member_id.to_string()))?;

        match robot.status {
            robox_core::robot::RobotStatus::Paused => {
                return Err(TriggerError::RobotPaused(execution.member_id.to_string()));
            }
            robox_core::robot::RobotStatus::Error | robox_core::robot::RobotStatus::Maintenance => {
                return Err(TriggerError::RobotUnavailable {
                    member: execution.member_id.to_string(),
                    status: format!("{:?}", robot.status).to_lowercase(),
                });
            }
            robox_core::robot::RobotStatus::Idle | robox_core::robot::RobotStatus::Working => {}
        }

        let (outcome, _control) = self
            .controller
            .try_acquire_slot(&execution.member_id, &execution.id)
            .await;
        if matches!(outcome, AcquireOutcome::QuotaExceeded) {
            return Err(TriggerError::Other(format!(
                "robot busy: quota exceeded for {}",
                execution.member_id
            )));
        }

        self.cache.track_execution(&execution.member_id, execution.id.clone()).await;

        self.sender.send(execution).await.map_err(|_| {
            TriggerError::Other("worker pool queue closed".to_owned())
        })
    }

    /// Current depth of the admission queue (approximate).
    pub fn queue_capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Abort all worker tasks. Intended for test teardown and shutdown.
    pub async fn shutdown(&self) {
        let workers = self.workers.lock().await;
        for worker in workers.iter() {
            worker.abort();
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Execution>>>,
    cache: Arc<RobotCache>,
    controller: Arc<ExecutionController>,
    driver: Arc<dyn PhaseDriver>,
) {
    loop {
        let execution = {
            let mut receiver = receiver.lock().await;
            match receiver.recv().await {
                Some(execution) => execution,
                None => break,
            }
        };

        let member_id: MemberId = execution.member_id.clone();
        let execution_id = execution.id.clone();
        info!(worker_id, execution_id = %execution_id, "worker picked up execution");

        let status = driver.run(execution).await;

        controller.release(&member_id, &execution_id).await;
        cache.untrack_execution(&member_id, &execution_id).await;

        match status {
            ExecutionStatus::Completed => {
                info!(execution_id = %execution_id, "execution completed");
            }
            other => {
                warn!(execution_id = %execution_id, status = ?other, "execution ended non-successfully");
            }
        }
    }
}

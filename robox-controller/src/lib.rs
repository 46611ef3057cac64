#![deny(missing_docs)]
//! Execution controller (§4.3): atomic quota admission, pause/resume, and
//! cooperative cancellation.
//!
//! Owns the authoritative per-robot execution map and the per-execution
//! control primitives. The robot cache (`robox-cache`) owns identity and
//! configuration; this crate owns everything about an execution's live
//! control state, so the two can be locked independently.

use robox_core::id::{ExecutionId, MemberId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Error returned by [`ExecutionControl::wait_if_paused`] when the
/// execution's cancellation token has tripped while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "execution cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Pause state for one execution: the flag and the single-shot resume
/// signal, guarded together so a waiter and a concurrent resume always
/// agree on which channel is live (§4.3, §5).
struct PauseState {
    paused: bool,
    resume_tx: Option<oneshot::Sender<()>>,
}

/// Per-execution control primitives: cancellation and pause/resume.
///
/// Each pause cycle allocates a fresh single-shot channel rather than
/// reusing a persistent condition variable — a waiter captures the
/// receiver for the channel live *at the moment it starts waiting*, so a
/// pause/resume/pause sequence can never hand a waiter a stale, already-
/// fired channel.
pub struct ExecutionControl {
    token: CancellationToken,
    pause: Mutex<PauseState>,
}

impl ExecutionControl {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            pause: Mutex::new(PauseState { paused: false, resume_tx: None }),
        }
    }

    /// Trip the cancellation token. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the cancellation token has tripped.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Pause this execution. No-op if already paused.
    pub async fn pause(&self) {
        let mut state = self.pause.lock().await;
        if state.paused {
            return;
        }
        let (tx, _rx) = oneshot::channel();
        state.paused = true;
        state.resume_tx = Some(tx);
    }

    /// Resume this execution, firing the live resume signal if one exists.
    /// No-op if not paused.
    pub async fn resume(&self) {
        let mut state = self.pause.lock().await;
        if !state.paused {
            return;
        }
        state.paused = false;
        if let Some(tx) = state.resume_tx.take() {
            // A dropped receiver (no one waiting yet) is not an error —
            // the next wait_if_paused call will see `paused = false`.
            let _ = tx.send(());
        }
    }

    /// Whether this execution is currently paused.
    pub async fn is_paused(&self) -> bool {
        self.pause.lock().await.paused
    }

    /// Called by the phase state machine between phases (§4.6). Returns
    /// immediately if not paused. Otherwise blocks until either the
    /// cancellation token trips or a concurrent `resume` fires the signal
    /// captured at the start of this call.
    pub async fn wait_if_paused(&self) -> Result<(), Cancelled> {
        let rx = {
            let mut state = self.pause.lock().await;
            if !state.paused {
                return Ok(());
            }
            // Allocate the receiver side for this wait and re-arm the
            // sender slot so a subsequent resume still has something to
            // fire even though we've taken this wait's own receiver.
            let (tx, rx) = oneshot::channel();
            let old_tx = state.resume_tx.replace(tx);
            drop(old_tx);
            rx
        };

        tokio::select! {
            _ = self.token.cancelled() => Err(Cancelled),
            result = rx => match result {
                Ok(()) => Ok(()),
                // Sender dropped without firing: treat as an immediate
                // resume rather than hanging forever on a channel no one
                // will ever signal.
                Err(_) => Ok(()),
            },
        }
    }
}

/// Result of [`ExecutionController::try_acquire_slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The slot was acquired; the execution is now tracked.
    Acquired,
    /// The robot is at `quota.max`; the caller must not proceed.
    QuotaExceeded,
}

struct RobotSlots {
    max: usize,
    executions: HashMap<String, Arc<ExecutionControl>>,
}

/// Owns the per-robot execution maps and their control primitives (§4.3).
///
/// `try_acquire_slot` is the single atomic admission primitive: the
/// check-against-`quota.max` and the insert happen under one lock
/// acquisition, so no burst of concurrent callers can ever observe more
/// than `quota.max` slots granted (P1, §8 scenario 4).
pub struct ExecutionController {
    robots: RwLock<HashMap<String, RobotSlots>>,
}

impl ExecutionController {
    /// Create a new controller with no robots registered.
    pub fn new() -> Self {
        Self { robots: RwLock::new(HashMap::new()) }
    }

    /// Register (or re-register) a robot's quota ceiling. Existing
    /// in-flight executions for the robot are preserved if it was already
    /// registered.
    pub async fn set_quota(&self, member_id: &MemberId, max: usize) {
        let mut robots = self.robots.write().await;
        let slots = robots.entry(member_id.as_str().to_owned()).or_insert_with(|| RobotSlots {
            max,
            executions: HashMap::new(),
        });
        slots.max = max;
    }

    /// Atomically attempt to admit `execution_id` under `member_id`'s
    /// quota. Returns the fresh [`ExecutionControl`] on success.
    pub async fn try_acquire_slot(
        &self,
        member_id: &MemberId,
        execution_id: &ExecutionId,
    ) -> (AcquireOutcome, Option<Arc<ExecutionControl>>) {
        let mut robots = self.robots.write().await;
        let slots = robots
            .entry(member_id.as_str().to_owned())
            .or_insert_with(|| RobotSlots { max: usize::MAX, executions: HashMap::new() });

        if slots.executions.len() >= slots.max {
            debug!(robot_id = %member_id, "quota exceeded, refusing slot");
            return (AcquireOutcome::QuotaExceeded, None);
        }

        let control = Arc::new(ExecutionControl::new());
        slots.executions.insert(execution_id.as_str().to_owned(), Arc::clone(&control));
        (AcquireOutcome::Acquired, Some(control))
    }

    /// Number of currently tracked in-flight executions for a robot.
    pub async fn running_count(&self, member_id: &MemberId) -> usize {
        let robots = self.robots.read().await;
        robots.get(member_id.as_str()).map(|s| s.executions.len()).unwrap_or(0)
    }

    /// Ids of currently tracked in-flight executions for a robot.
    pub async fn running_ids(&self, member_id: &MemberId) -> Vec<String> {
        let robots = self.robots.read().await;
        robots
            .get(member_id.as_str())
            .map(|s| s.executions.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Fetch the control primitives for a tracked execution, if present.
    pub async fn get(&self, member_id: &MemberId, execution_id: &ExecutionId) -> Option<Arc<ExecutionControl>> {
        let robots = self.robots.read().await;
        robots
            .get(member_id.as_str())
            .and_then(|s| s.executions.get(execution_id.as_str()))
            .cloned()
    }

    /// Release a completed, failed, or cancelled execution's slot.
    pub async fn release(&self, member_id: &MemberId, execution_id: &ExecutionId) {
        let mut robots = self.robots.write().await;
        if let Some(slots) = robots.get_mut(member_id.as_str()) {
            slots.executions.remove(execution_id.as_str());
        }
    }

    /// Stop an execution: trips its cancellation token and evicts it from
    /// tracking immediately, so a `Get` miss is visible to callers before
    /// the execution's terminal log entry is written (§5).
    pub async fn stop(&self, member_id: &MemberId, execution_id: &ExecutionId) {
        let control = {
            let mut robots = self.robots.write().await;
            robots
                .get_mut(member_id.as_str())
                .and_then(|s| s.executions.remove(execution_id.as_str()))
        };
        match control {
            Some(control) => control.cancel(),
            None => warn!(execution_id = %execution_id, "stop called on untracked execution"),
        }
    }
}

impl Default for ExecutionController {
    fn default() -> Self {
        Self::new()
    }
}

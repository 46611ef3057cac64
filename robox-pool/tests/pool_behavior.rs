use async_trait::async_trait;
use robox_cache::RobotCache;
use robox_controller::ExecutionController;
use robox_core::execution::{Execution, ExecutionStatus, PhaseOutputs, TriggerInput};
use robox_core::id::{ExecutionId, MemberId, TeamId};
use robox_core::phase::Phase;
use robox_core::robot::{Config, Robot, RobotStatus};
use robox_pool::{PhaseDriver, WorkerPool};
use robox_store_memory::MemoryMemberStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct CountingDriver {
    runs: AtomicUsize,
}

#[async_trait]
impl PhaseDriver for CountingDriver {
    async fn run(&self, _execution: Execution) -> ExecutionStatus {
        self.runs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        ExecutionStatus::Completed
    }
}

fn sample_execution(member_id: &str, execution_id: &str) -> Execution {
    Execution {
        id: ExecutionId::new(execution_id),
        member_id: MemberId::new(member_id),
        session_id: None,
        trigger: TriggerInput::Human(robox_core::execution::HumanTriggerInput {
            action: robox_core::execution::InterventionAction::Instruct {
                message: "go".to_owned(),
            },
            messages: vec!["go".to_owned()],
            user_id: "user-1".to_owned(),
            locale: "en".to_owned(),
            execution_id: None,
        }),
        priority: 5,
        status: ExecutionStatus::Queued,
        current_phase: Phase::Goals,
        outputs: PhaseOutputs::default(),
        created_at: chrono::Utc::now(),
        finished_at: None,
        metadata: HashMap::new(),
    }
}

async fn cache_with_robot(member_id: &str, status: RobotStatus) -> Arc<RobotCache> {
    let store = Arc::new(MemoryMemberStore::new());
    store
        .put(MemberId::new(member_id), TeamId::new("t1"), "bot", Config::default())
        .await;
    let cache = Arc::new(RobotCache::new(store));
    cache.hydrate_one(&MemberId::new(member_id)).await.expect("hydrate");
    cache.set_status(&MemberId::new(member_id), status).await;
    cache
}

#[tokio::test]
async fn submit_runs_execution_through_driver() {
    let cache = cache_with_robot("m1", RobotStatus::Idle).await;
    let controller = Arc::new(ExecutionController::new());
    controller.set_quota(&MemberId::new("m1"), 2).await;
    let driver = Arc::new(CountingDriver { runs: AtomicUsize::new(0) });

    let pool = WorkerPool::start(2, 10, Arc::clone(&cache), Arc::clone(&controller), driver.clone());
    pool.submit(sample_execution("m1", "exec-1")).await.expect("submit");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(driver.runs.load(Ordering::SeqCst), 1);
    assert_eq!(controller.running_count(&MemberId::new("m1")).await, 0);
}

#[tokio::test]
async fn submit_to_paused_robot_is_rejected() {
    let cache = cache_with_robot("m1", RobotStatus::Paused).await;
    let controller = Arc::new(ExecutionController::new());
    let driver = Arc::new(CountingDriver { runs: AtomicUsize::new(0) });
    let pool = WorkerPool::start(1, 10, cache, controller, driver);

    let err = pool.submit(sample_execution("m1", "exec-1")).await.unwrap_err();
    assert!(matches!(err, robox_core::error::TriggerError::RobotPaused(_)));
}

#[tokio::test]
async fn submit_for_unknown_robot_is_rejected() {
    let store = Arc::new(MemoryMemberStore::new());
    let cache = Arc::new(RobotCache::new(store));
    let controller = Arc::new(ExecutionController::new());
    let driver = Arc::new(CountingDriver { runs: AtomicUsize::new(0) });
    let pool = WorkerPool::start(1, 10, cache, controller, driver);

    let err = pool.submit(sample_execution("ghost", "exec-1")).await.unwrap_err();
    assert!(matches!(err, robox_core::error::TriggerError::RobotNotFound(_)));
}

#[tokio::test]
async fn submit_beyond_quota_is_refused() {
    let cache = cache_with_robot("m1", RobotStatus::Idle).await;
    let controller = Arc::new(ExecutionController::new());
    controller.set_quota(&MemberId::new("m1"), 1).await;
    let driver = Arc::new(CountingDriver { runs: AtomicUsize::new(0) });
    let pool = WorkerPool::start(1, 10, cache, Arc::clone(&controller), driver);

    // Occupy the only slot directly via the controller before submitting.
    controller
        .try_acquire_slot(&MemberId::new("m1"), &ExecutionId::new("occupying"))
        .await;

    let err = pool.submit(sample_execution("m1", "exec-1")).await.unwrap_err();
    assert!(matches!(err, robox_core::error::TriggerError::Other(_)));
}

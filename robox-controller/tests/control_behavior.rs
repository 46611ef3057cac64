use robox_controller::{AcquireOutcome, ExecutionController};
use robox_core::id::{ExecutionId, MemberId};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn quota_burst_never_exceeds_max() {
    // P1 / §8 scenario 4: quota.max = 3, 50 concurrent acquires.
    let controller = Arc::new(ExecutionController::new());
    let member_id = MemberId::new("m1");
    controller.set_quota(&member_id, 3).await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let controller = Arc::clone(&controller);
        let member_id = member_id.clone();
        handles.push(tokio::spawn(async move {
            let execution_id = ExecutionId::new(format!("exec-{i}"));
            controller.try_acquire_slot(&member_id, &execution_id).await.0
        }));
    }

    let mut acquired = 0;
    for handle in handles {
        if matches!(handle.await.expect("join"), AcquireOutcome::Acquired) {
            acquired += 1;
        }
    }

    assert_eq!(acquired, 3);
    assert_eq!(controller.running_count(&member_id).await, 3);
}

#[tokio::test]
async fn release_frees_a_slot_for_reuse() {
    let controller = ExecutionController::new();
    let member_id = MemberId::new("m1");
    controller.set_quota(&member_id, 1).await;

    let e1 = ExecutionId::new("exec-1");
    let (outcome, _) = controller.try_acquire_slot(&member_id, &e1).await;
    assert_eq!(outcome, AcquireOutcome::Acquired);

    let e2 = ExecutionId::new("exec-2");
    let (outcome, _) = controller.try_acquire_slot(&member_id, &e2).await;
    assert_eq!(outcome, AcquireOutcome::QuotaExceeded);

    controller.release(&member_id, &e1).await;
    let (outcome, _) = controller.try_acquire_slot(&member_id, &e2).await;
    assert_eq!(outcome, AcquireOutcome::Acquired);
}

#[tokio::test]
async fn pause_then_resume_unblocks_waiter() {
    // P5: a WaitIfPaused started before resume returns without error.
    let controller = ExecutionController::new();
    let member_id = MemberId::new("m1");
    controller.set_quota(&member_id, 1).await;
    let execution_id = ExecutionId::new("exec-1");
    let (_, control) = controller.try_acquire_slot(&member_id, &execution_id).await;
    let control = control.expect("acquired");

    control.pause().await;
    assert!(control.is_paused().await);

    let waiter_control = Arc::clone(&control);
    let waiter = tokio::spawn(async move { waiter_control.wait_if_paused().await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    control.resume().await;

    let result = tokio::time::timeout(Duration::from_millis(500), waiter)
        .await
        .expect("waiter did not spin or wedge")
        .expect("join");
    assert!(result.is_ok());
    assert!(!control.is_paused().await);
}

#[tokio::test]
async fn wait_if_paused_returns_immediately_when_not_paused() {
    let controller = ExecutionController::new();
    let member_id = MemberId::new("m1");
    controller.set_quota(&member_id, 1).await;
    let execution_id = ExecutionId::new("exec-1");
    let (_, control) = controller.try_acquire_slot(&member_id, &execution_id).await;
    let control = control.expect("acquired");

    let result = tokio::time::timeout(Duration::from_millis(50), control.wait_if_paused())
        .await
        .expect("returns immediately");
    assert!(result.is_ok());
}

#[tokio::test]
async fn pause_then_cancel_unblocks_waiter_with_error() {
    // P6 / §8 scenario 5: Stop during a pause returns a cancellation error
    // to the waiter within a bounded delay, and the execution is untracked.
    let controller = Arc::new(ExecutionController::new());
    let member_id = MemberId::new("m1");
    controller.set_quota(&member_id, 1).await;
    let execution_id = ExecutionId::new("exec-1");
    let (_, control) = controller.try_acquire_slot(&member_id, &execution_id).await;
    let control = control.expect("acquired");
    control.pause().await;

    let waiter_control = Arc::clone(&control);
    let waiter = tokio::spawn(async move { waiter_control.wait_if_paused().await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.stop(&member_id, &execution_id).await;

    let result = tokio::time::timeout(Duration::from_millis(500), waiter)
        .await
        .expect("waiter resolved")
        .expect("join");
    assert!(result.is_err());
    assert!(controller.get(&member_id, &execution_id).await.is_none());
}

#[tokio::test]
async fn repeated_pause_resume_cycles_do_not_wedge() {
    let controller = ExecutionController::new();
    let member_id = MemberId::new("m1");
    controller.set_quota(&member_id, 1).await;
    let execution_id = ExecutionId::new("exec-1");
    let (_, control) = controller.try_acquire_slot(&member_id, &execution_id).await;
    let control = control.expect("acquired");

    for _ in 0..5 {
        control.pause().await;
        let waiter_control = Arc::clone(&control);
        let waiter = tokio::spawn(async move { waiter_control.wait_if_paused().await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        control.resume().await;
        let result = tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("no wedge")
            .expect("join");
        assert!(result.is_ok());
    }
}

use robox_cache::RobotCache;
use robox_controller::ExecutionController;
use robox_core::execution::{
    ClockContext, Execution, ExecutionStatus, HumanTriggerInput, InterventionAction, PhaseOutputs,
    TriggerInput,
};
use robox_core::id::{AgentId, ExecutionId, JobId, MemberId, SessionId};
use robox_core::phase::Phase;
use robox_core::robot::{ExecutorMode, PhaseAgents};
use robox_core::store::JobLogStore;
use robox_core::test_utils::{fixture_robot, StubBridge};
use robox_phases::{AssistantExecutor, LogOnlyChannelSender, StateMachine};
use robox_pool::PhaseDriver;
use robox_store_memory::MemoryJobLogStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn clock_execution(member_id: &str) -> Execution {
    Execution {
        id: ExecutionId::new(format!("{member_id}-exec")),
        member_id: MemberId::new(member_id),
        session_id: None::<SessionId>,
        trigger: TriggerInput::Clock {
            context: ClockContext {
                hour: 9,
                weekday: 2,
                day_of_month: 15,
                iso_week: 3,
                month: 1,
                year: 2026,
                is_weekend: false,
                is_month_start: false,
                is_month_end: false,
                is_quarter_end: false,
                is_year_end: false,
            },
        },
        priority: 5,
        status: ExecutionStatus::Queued,
        current_phase: Phase::Inspiration,
        outputs: PhaseOutputs::default(),
        created_at: chrono::Utc::now(),
        finished_at: None,
        metadata: HashMap::new(),
    }
}

fn human_execution(member_id: &str, messages: Vec<String>) -> Execution {
    Execution {
        id: ExecutionId::new(format!("{member_id}-exec")),
        member_id: MemberId::new(member_id),
        session_id: None,
        trigger: TriggerInput::Human(HumanTriggerInput {
            action: InterventionAction::Instruct { message: "status update please".to_owned() },
            messages,
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

async fn setup(member_id: &str, configure: impl FnOnce(&mut robox_core::robot::Robot)) -> (
    Arc<RobotCache>,
    Arc<ExecutionController>,
    Arc<MemoryJobLogStore>,
    Arc<StubBridge>,
    StateMachine,
) {
    let mut robot = fixture_robot(member_id);
    robot.config.resources.agents = PhaseAgents {
        inspiration: Some(AgentId::new("planner")),
        goals: Some(AgentId::new("planner")),
        tasks: Some(AgentId::new("planner")),
        run: Some(AgentId::new("executor")),
        learning: Some(AgentId::new("planner")),
    };
    configure(&mut robot);

    let store = Arc::new(robox_store_memory::MemoryMemberStore::new());
    let cache = Arc::new(RobotCache::new(store));
    cache.put(robot).await;

    let controller = Arc::new(ExecutionController::new());
    controller.set_quota(&MemberId::new(member_id), 2).await;

    let job_store = Arc::new(MemoryJobLogStore::new());
    let bridge = Arc::new(StubBridge::new());
    let state_machine = StateMachine::new(
        Arc::clone(&cache),
        Arc::clone(&controller),
        Arc::clone(&bridge),
        job_store.clone(),
        Arc::new(AssistantExecutor),
        Arc::new(LogOnlyChannelSender),
    );

    (cache, controller, job_store, bridge, state_machine)
}

#[tokio::test]
async fn clock_trigger_runs_the_full_phase_sequence() {
    let (_cache, controller, store, _bridge, state_machine) = setup("m-clock", |_| {}).await;
    let execution = clock_execution("m-clock");
    controller.try_acquire_slot(&execution.member_id, &execution.id).await;

    let status = state_machine.run(execution.clone()).await;
    assert_eq!(status, ExecutionStatus::Completed);

    let job = store.get_job(&JobId::for_execution(&execution.id)).await.expect("job row");
    assert_eq!(job.status, ExecutionStatus::Completed);
    assert_eq!(job.phase, Phase::Learning);
    assert_eq!(job.progress, Phase::Learning.progress());
    assert!(job.logs.iter().any(|l| l.message.contains("Inspiration")));
    assert!(job.logs.iter().any(|l| l.message.contains("execution completed")));
}

#[tokio::test]
async fn human_trigger_enters_at_goals_and_skips_inspiration() {
    let (_cache, controller, store, _bridge, state_machine) = setup("m-human", |_| {}).await;
    let execution = human_execution("m-human", vec!["please look into this".to_owned()]);
    controller.try_acquire_slot(&execution.member_id, &execution.id).await;

    let status = state_machine.run(execution.clone()).await;
    assert_eq!(status, ExecutionStatus::Completed);

    let job = store.get_job(&JobId::for_execution(&execution.id)).await.expect("job row");
    assert!(!job.logs.iter().any(|l| l.message.contains("Inspiration")));
    assert!(job.logs.iter().any(|l| l.message.contains("Goals")));
}

#[tokio::test]
async fn simulated_failure_trigger_fails_without_running_any_phase() {
    let (_cache, controller, store, _bridge, state_machine) = setup("m-fail", |_| {}).await;
    let execution = human_execution("m-fail", vec!["simulate_failure".to_owned()]);
    controller.try_acquire_slot(&execution.member_id, &execution.id).await;

    let status = state_machine.run(execution.clone()).await;
    assert_eq!(status, ExecutionStatus::Failed);

    let job = store.get_job(&JobId::for_execution(&execution.id)).await.expect("job row");
    assert_eq!(job.status, ExecutionStatus::Failed);
    assert!(job.logs.iter().any(|l| l.message.contains("simulated failure")));
    assert!(!job.logs.iter().any(|l| l.message.contains("completed in")));
}

#[tokio::test]
async fn dryrun_mode_completes_without_ever_calling_the_bridge() {
    let (_cache, controller, store, bridge, state_machine) = setup("m-dry", |robot| {
        robot.config.executor.mode = ExecutorMode::Dryrun;
    })
    .await;
    let execution = clock_execution("m-dry");
    controller.try_acquire_slot(&execution.member_id, &execution.id).await;

    let status = state_machine.run(execution.clone()).await;
    assert_eq!(status, ExecutionStatus::Completed);

    let job = store.get_job(&JobId::for_execution(&execution.id)).await.expect("job row");
    assert_eq!(job.status, ExecutionStatus::Completed);
    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn pausing_then_cancelling_stops_the_execution_at_the_next_phase_boundary() {
    let (_cache, controller, store, _bridge, state_machine) = setup("m-pause", |_| {}).await;
    let execution = clock_execution("m-pause");
    let (_outcome, control) =
        controller.try_acquire_slot(&execution.member_id, &execution.id).await;
    let control = control.expect("slot acquired");
    control.pause().await;

    let state_machine = Arc::new(state_machine);
    let sm = Arc::clone(&state_machine);
    let exec_clone = execution.clone();
    let handle = tokio::spawn(async move { sm.run(exec_clone).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    control.cancel();

    let status = handle.await.expect("join");
    assert_eq!(status, ExecutionStatus::Cancelled);

    let job = store.get_job(&JobId::for_execution(&execution.id)).await.expect("job row");
    assert_eq!(job.status, ExecutionStatus::Cancelled);
}

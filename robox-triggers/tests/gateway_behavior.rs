use async_trait::async_trait;
use robox_cache::RobotCache;
use robox_controller::ExecutionController;
use robox_core::error::TriggerError;
use robox_core::execution::{Execution, ExecutionStatus, EventTriggerInput, HumanTriggerInput, InterventionAction};
use robox_core::id::{MemberId, TeamId};
use robox_core::robot::{ClockConfig, ClockMode, Config, EventsConfig, RobotStatus, TriggerSwitches};
use robox_pool::{PhaseDriver, WorkerPool};
use robox_store_memory::MemoryMemberStore;
use robox_triggers::TriggerGateway;
use std::sync::Arc;
use std::time::Duration as StdDuration;

struct NoopDriver;

#[async_trait]
impl PhaseDriver for NoopDriver {
    async fn run(&self, _execution: Execution) -> ExecutionStatus {
        ExecutionStatus::Completed
    }
}

async fn gateway_with_robot(member_id: &str, config: Config) -> (Arc<TriggerGateway>, Arc<RobotCache>, Arc<ExecutionController>) {
    let store = Arc::new(MemoryMemberStore::new());
    store.put(MemberId::new(member_id), TeamId::new("t1"), "bot", config.clone()).await;
    let cache = Arc::new(RobotCache::new(store));
    cache.hydrate_one(&MemberId::new(member_id)).await.expect("hydrate");

    let controller = Arc::new(ExecutionController::new());
    controller.set_quota(&MemberId::new(member_id), config.quota.max).await;

    let driver = Arc::new(NoopDriver);
    let pool = Arc::new(WorkerPool::start(1, 10, Arc::clone(&cache), Arc::clone(&controller), driver));
    let gateway = Arc::new(TriggerGateway::new(Arc::clone(&cache), Arc::clone(&controller), pool));
    (gateway, cache, controller)
}

fn daemon_config() -> Config {
    let mut config = Config::default();
    config.clock.mode = ClockMode::Daemon;
    config
}

#[tokio::test]
async fn clock_tick_admits_a_daemon_robot_and_marks_last_run() {
    let (gateway, cache, _controller) = gateway_with_robot("m1", daemon_config()).await;
    let now = chrono::Utc::now();

    let outcomes = gateway.run_clock_tick(now).await;
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].result.is_ok());

    tokio::time::sleep(StdDuration::from_millis(50)).await;
    let robot = cache.get(&MemberId::new("m1")).await.expect("robot");
    assert_eq!(robot.last_run, Some(now));
}

#[tokio::test]
async fn clock_tick_skips_a_paused_robot() {
    let (gateway, cache, _controller) = gateway_with_robot("m1", daemon_config()).await;
    cache.set_status(&MemberId::new("m1"), RobotStatus::Paused).await;

    let outcomes = gateway.run_clock_tick(chrono::Utc::now()).await;
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn clock_tick_skips_a_robot_with_clock_trigger_disabled() {
    let mut config = daemon_config();
    config.triggers = TriggerSwitches { clock: false, human: true, event: true };
    let (gateway, _cache, _controller) = gateway_with_robot("m1", config).await;

    let outcomes = gateway.run_clock_tick(chrono::Utc::now()).await;
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn clock_tick_skips_a_robot_whose_schedule_has_not_matured() {
    let mut config = Config::default();
    config.clock = ClockConfig {
        timezone: "UTC".to_owned(),
        mode: ClockMode::Times { at: vec!["00:00".to_owned()], days: vec![] },
    };
    let (gateway, _cache, _controller) = gateway_with_robot("m1", config).await;

    // Noon UTC will not match a midnight-only schedule.
    let noon = chrono::Utc::now().date_naive().and_hms_opt(12, 0, 0).unwrap().and_utc();
    let outcomes = gateway.run_clock_tick(noon).await;
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn human_trigger_is_admitted_with_a_message() {
    let (gateway, _cache, _controller) = gateway_with_robot("m1", Config::default()).await;
    let input = HumanTriggerInput {
        action: InterventionAction::Instruct { message: "look into the backlog".to_owned() },
        messages: vec!["look into the backlog".to_owned()],
        user_id: "user-1".to_owned(),
        locale: "en".to_owned(),
        execution_id: None,
    };
    let result = gateway.submit_human(MemberId::new("m1"), input, chrono::Utc::now()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn human_trigger_without_a_message_is_rejected() {
    let (gateway, _cache, _controller) = gateway_with_robot("m1", Config::default()).await;
    let input = HumanTriggerInput {
        action: InterventionAction::Instruct { message: String::new() },
        messages: vec![],
        user_id: "user-1".to_owned(),
        locale: "en".to_owned(),
        execution_id: None,
    };
    let err = gateway.submit_human(MemberId::new("m1"), input, chrono::Utc::now()).await.unwrap_err();
    assert!(matches!(err, TriggerError::MessagesRequired(action) if action == "instruct"));
}

#[tokio::test]
async fn human_trigger_is_deduplicated_within_the_window() {
    let (gateway, _cache, _controller) = gateway_with_robot("m1", Config::default()).await;
    let input = || HumanTriggerInput {
        action: InterventionAction::Instruct { message: "same thing".to_owned() },
        messages: vec!["same thing".to_owned()],
        user_id: "user-1".to_owned(),
        locale: "en".to_owned(),
        execution_id: None,
    };
    let now = chrono::Utc::now();
    gateway.submit_human(MemberId::new("m1"), input(), now).await.expect("first admitted");
    let err = gateway
        .submit_human(MemberId::new("m1"), input(), now + chrono::Duration::milliseconds(100))
        .await
        .unwrap_err();
    assert!(matches!(err, TriggerError::Deduplicated(_)));
}

#[tokio::test]
async fn human_trigger_is_rejected_when_disabled_for_the_robot() {
    let mut config = Config::default();
    config.triggers = TriggerSwitches { clock: true, human: false, event: true };
    let (gateway, _cache, _controller) = gateway_with_robot("m1", config).await;

    let input = HumanTriggerInput {
        action: InterventionAction::Instruct { message: "hello".to_owned() },
        messages: vec!["hello".to_owned()],
        user_id: "user-1".to_owned(),
        locale: "en".to_owned(),
        execution_id: None,
    };
    let err = gateway.submit_human(MemberId::new("m1"), input, chrono::Utc::now()).await.unwrap_err();
    assert!(matches!(err, TriggerError::TriggerDisabled { kind, .. } if kind == "human"));
}

#[tokio::test]
async fn event_trigger_outside_subscriptions_is_rejected() {
    let mut config = Config::default();
    config.events = EventsConfig { subscriptions: vec!["deploy.completed".to_owned()] };
    let (gateway, _cache, _controller) = gateway_with_robot("m1", config).await;

    let input = EventTriggerInput {
        source: "ci".to_owned(),
        event_type: "deploy.started".to_owned(),
        payload: serde_json::Value::Null,
    };
    let err = gateway.submit_event(MemberId::new("m1"), input, chrono::Utc::now()).await.unwrap_err();
    assert!(matches!(err, TriggerError::NotSubscribed { event_type, .. } if event_type == "deploy.started"));
}

#[tokio::test]
async fn event_trigger_with_missing_event_type_is_rejected() {
    let (gateway, _cache, _controller) = gateway_with_robot("m1", Config::default()).await;
    let input = EventTriggerInput {
        source: "ci".to_owned(),
        event_type: String::new(),
        payload: serde_json::Value::Null,
    };
    let err = gateway.submit_event(MemberId::new("m1"), input, chrono::Utc::now()).await.unwrap_err();
    assert!(matches!(err, TriggerError::EventFieldMissing(field) if field == "event_type"));
}

#[tokio::test]
async fn event_trigger_matching_subscriptions_is_admitted() {
    let mut config = Config::default();
    config.events = EventsConfig { subscriptions: vec!["deploy.completed".to_owned()] };
    let (gateway, _cache, _controller) = gateway_with_robot("m1", config).await;

    let input = EventTriggerInput {
        source: "ci".to_owned(),
        event_type: "deploy.completed".to_owned(),
        payload: serde_json::json!({"build": 42}),
    };
    let result = gateway.submit_event(MemberId::new("m1"), input, chrono::Utc::now()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn trigger_for_unknown_robot_is_rejected() {
    let (gateway, _cache, _controller) = gateway_with_robot("m1", Config::default()).await;
    let input = HumanTriggerInput {
        action: InterventionAction::Instruct { message: "hi".to_owned() },
        messages: vec!["hi".to_owned()],
        user_id: "user-1".to_owned(),
        locale: "en".to_owned(),
        execution_id: None,
    };
    let err = gateway.submit_human(MemberId::new("ghost"), input, chrono::Utc::now()).await.unwrap_err();
    assert!(matches!(err, TriggerError::RobotNotFound(_)));
}

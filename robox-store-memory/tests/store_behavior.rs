use robox_core::prelude::*;
use robox_store_memory::{MemoryJobLogStore, MemoryMemberStore};

fn sample_row(execution_id: &str, member_id: &str) -> JobRow {
    let execution_id = ExecutionId::new(execution_id);
    let job_id = JobId::for_execution(&execution_id);
    JobRow {
        job_id,
        execution_id,
        member_id: MemberId::new(member_id),
        trigger: TriggerCategory::Clock,
        status: ExecutionStatus::Queued,
        phase: Phase::Inspiration,
        progress: Phase::Inspiration.progress(),
        logs: Vec::new(),
        created_at: chrono::Utc::now(),
        finished_at: None,
    }
}

#[tokio::test]
async fn create_and_get_job_round_trips() {
    let store = MemoryJobLogStore::new();
    let row = sample_row("exec-1", "member-1");
    let job_id = row.job_id.clone();
    store.create_job(row).await.expect("create");

    let fetched = store.get_job(&job_id).await.expect("get");
    assert_eq!(fetched.status, ExecutionStatus::Queued);
}

#[tokio::test]
async fn get_job_missing_returns_not_found() {
    let store = MemoryJobLogStore::new();
    let job_id = JobId::for_execution(&ExecutionId::new("missing"));
    let err = store.get_job(&job_id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn update_status_sets_finished_at_on_terminal_status() {
    let store = MemoryJobLogStore::new();
    let row = sample_row("exec-2", "member-1");
    let job_id = row.job_id.clone();
    store.create_job(row).await.expect("create");

    store
        .update_status(&job_id, ExecutionStatus::Completed, Phase::Learning)
        .await
        .expect("update");

    let fetched = store.get_job(&job_id).await.expect("get");
    assert_eq!(fetched.status, ExecutionStatus::Completed);
    assert_eq!(fetched.progress, 95);
    assert!(fetched.finished_at.is_some());
}

#[tokio::test]
async fn append_log_accumulates_entries_in_order() {
    let store = MemoryJobLogStore::new();
    let row = sample_row("exec-3", "member-1");
    let job_id = row.job_id.clone();
    store.create_job(row).await.expect("create");

    for (sequence, message) in ["first", "second"].into_iter().enumerate() {
        store
            .append_log(
                &job_id,
                LogEntry {
                    at: chrono::Utc::now(),
                    execution_id: ExecutionId::new("exec-3"),
                    job_id: job_id.clone(),
                    level: LogLevel::Info,
                    phase: Some(Phase::Tasks),
                    step: None,
                    context: None,
                    sequence: sequence as u64,
                    message: message.to_owned(),
                },
            )
            .await
            .expect("append");
    }

    let fetched = store.get_job(&job_id).await.expect("get");
    assert_eq!(fetched.logs.len(), 2);
    assert_eq!(fetched.logs[0].message, "first");
    assert_eq!(fetched.logs[1].message, "second");
}

#[tokio::test]
async fn list_executions_filters_by_member_and_sorts_recent_first() {
    let store = MemoryJobLogStore::new();
    store.create_job(sample_row("exec-a", "member-1")).await.expect("create");
    store.create_job(sample_row("exec-b", "member-1")).await.expect("create");
    store.create_job(sample_row("exec-c", "member-2")).await.expect("create");

    let rows = store.list_executions(&MemberId::new("member-1")).await.expect("list");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.member_id == MemberId::new("member-1")));
}

#[tokio::test]
async fn member_store_round_trips_config() {
    let store = MemoryMemberStore::new();
    let mut config = Config::default();
    config.quota.max = 7;
    store
        .put(MemberId::new("m1"), TeamId::new("t1"), "bot-one", config)
        .await;

    let record = store.get_member(&MemberId::new("m1")).await.expect("get");
    let decoded = record.config.decode().expect("decode");
    assert_eq!(decoded.quota.max, 7);
    assert_eq!(record.name, "bot-one");
}

#[tokio::test]
async fn member_store_lists_only_team_members() {
    let store = MemoryMemberStore::new();
    store.put(MemberId::new("m1"), TeamId::new("t1"), "a", Config::default()).await;
    store.put(MemberId::new("m2"), TeamId::new("t2"), "b", Config::default()).await;

    let members = store.list_members(&TeamId::new("t1")).await.expect("list");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "a");
}

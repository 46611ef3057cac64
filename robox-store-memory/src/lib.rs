#![deny(missing_docs)]
//! In-memory implementations of robox-core's `JobLogStore` and `MemberStore`.
//!
//! Each store uses a `HashMap` behind a `tokio::sync::RwLock` for concurrent
//! access, suitable for testing, prototyping, and single-process deployments
//! where persistence across restarts is not required.

use async_trait::async_trait;
use robox_core::prelude::*;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory job/log store backed by a `HashMap` keyed on [`JobId`].
pub struct MemoryJobLogStore {
    jobs: RwLock<HashMap<String, JobRow>>,
}

impl MemoryJobLogStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self { jobs: RwLock::new(HashMap::new()) }
    }
}

impl Default for MemoryJobLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobLogStore for MemoryJobLogStore {
    async fn create_job(&self, row: JobRow) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(row.job_id.as_str().to_owned(), row);
        Ok(())
    }

    async fn get_job(&self, job_id: &JobId) -> Result<JobRow, StoreError> {
        let jobs = self.jobs.read().await;
        jobs.get(job_id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))
    }

    async fn update_status(
        &self,
        job_id: &JobId,
        status: ExecutionStatus,
        phase: Phase,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let row = jobs
            .get_mut(job_id.as_str())
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;
        row.status = status;
        row.phase = phase;
        row.progress = phase.progress();
        if matches!(
            status,
            ExecutionStatus::Completed
                | ExecutionStatus::Failed
                | ExecutionStatus::Cancelled
                | ExecutionStatus::TimedOut
        ) {
            row.finished_at = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn append_log(&self, job_id: &JobId, entry: LogEntry) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let row = jobs
            .get_mut(job_id.as_str())
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;
        row.logs.push(entry);
        Ok(())
    }

    async fn list_executions(&self, member_id: &MemberId) -> Result<Vec<ExecutionRow>, StoreError> {
        let jobs = self.jobs.read().await;
        let mut rows: Vec<ExecutionRow> = jobs
            .values()
            .filter(|row| &row.member_id == member_id)
            .map(|row| ExecutionRow {
                job_id: row.job_id.clone(),
                execution_id: row.execution_id.clone(),
                member_id: row.member_id.clone(),
                status: row.status,
                created_at: row.created_at,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

/// In-memory member store backed by a `HashMap` keyed on [`MemberId`].
pub struct MemoryMemberStore {
    members: RwLock<HashMap<String, MemberRecordOwned>>,
}

/// An owned, cloneable variant of `MemberRecord` for storage, since
/// `ConfigPayload::Decoded` holds a `Config` that is itself `Clone`.
struct MemberRecordOwned {
    id: MemberId,
    team_id: TeamId,
    name: String,
    status: RobotStatus,
    config: Config,
}

impl MemoryMemberStore {
    /// Create a new empty member store.
    pub fn new() -> Self {
        Self { members: RwLock::new(HashMap::new()) }
    }

    /// Insert or replace a member record, defaulting its persisted status
    /// to [`RobotStatus::default`]. Use [`Self::put_with_status`] to persist
    /// a specific status.
    pub async fn put(&self, id: MemberId, team_id: TeamId, name: impl Into<String>, config: Config) {
        self.put_with_status(id, team_id, name, config, RobotStatus::default()).await;
    }

    /// Insert or replace a member record with an explicit persisted status.
    pub async fn put_with_status(
        &self,
        id: MemberId,
        team_id: TeamId,
        name: impl Into<String>,
        config: Config,
        status: RobotStatus,
    ) {
        let mut members = self.members.write().await;
        members.insert(
            id.as_str().to_owned(),
            MemberRecordOwned { id, team_id, name: name.into(), status, config },
        );
    }
}

impl Default for MemoryMemberStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn list_members(&self, team_id: &TeamId) -> Result<Vec<MemberRecord>, StoreError> {
        let members = self.members.read().await;
        Ok(members
            .values()
            .filter(|record| &record.team_id == team_id)
            .map(|record| MemberRecord {
                id: record.id.clone(),
                team_id: record.team_id.clone(),
                name: record.name.clone(),
                status: record.status,
                config: ConfigPayload::Decoded(record.config.clone()),
            })
            .collect())
    }

    async fn get_member(&self, id: &MemberId) -> Result<MemberRecord, StoreError> {
        let members = self.members.read().await;
        let record = members.get(id.as_str()).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(MemberRecord {
            id: record.id.clone(),
            team_id: record.team_id.clone(),
            name: record.name.clone(),
            status: record.status,
            config: ConfigPayload::Decoded(record.config.clone()),
        })
    }
}

#![deny(missing_docs)]
//! In-memory robot cache (§3, §4.2).
//!
//! Uses a `HashMap` behind a `tokio::sync::RwLock`, the same shape the
//! teacher's in-memory state store uses for concurrent access. The cache
//! holds [`Robot`] records — identity, status, and configuration — hydrated
//! from a [`MemberStore`]. It does not own executions: the controller owns
//! those, keyed by the same [`MemberId`] this cache uses, so the two can be
//! read and written independently without locking against each other.

use robox_core::id::{MemberId, TeamId};
use robox_core::robot::{Robot, RobotStatus};
use robox_core::store::{robot_from_record, MemberStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// An in-memory cache of [`Robot`] records, hydrated from and kept loosely
/// in sync with a backing [`MemberStore`].
pub struct RobotCache {
    store: Arc<dyn MemberStore>,
    robots: RwLock<HashMap<String, Robot>>,
}

impl RobotCache {
    /// Create a new empty cache backed by `store`.
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self { store, robots: RwLock::new(HashMap::new()) }
    }

    /// Load every member of `team_id` from the backing store into the cache,
    /// overwriting any existing entries for the same ids.
    pub async fn hydrate_team(&self, team_id: &TeamId) -> Result<usize, StoreError> {
        let records = self.store.list_members(team_id).await?;
        let count = records.len();
        let mut robots = self.robots.write().await;
        for record in records {
            let id = record.id.as_str().to_owned();
            let robot = robot_from_record(record)?;
            debug!(robot_id = %id, "hydrated robot into cache");
            robots.insert(id, robot);
        }
        info!(team_id = %team_id, count, "hydrated team into robot cache");
        Ok(count)
    }

    /// Load a single robot from the backing store into the cache, whether
    /// or not it was already present.
    pub async fn hydrate_one(&self, id: &MemberId) -> Result<(), StoreError> {
        let record = self.store.get_member(id).await?;
        let robot = robot_from_record(record)?;
        let mut robots = self.robots.write().await;
        robots.insert(id.as_str().to_owned(), robot);
        Ok(())
    }

    /// Fetch a clone of a cached robot, if present.
    pub async fn get(&self, id: &MemberId) -> Option<Robot> {
        let robots = self.robots.read().await;
        robots.get(id.as_str()).cloned()
    }

    /// Whether `id` is present in the cache.
    pub async fn contains(&self, id: &MemberId) -> bool {
        let robots = self.robots.read().await;
        robots.contains_key(id.as_str())
    }

    /// Insert or replace a robot record directly, bypassing the store.
    pub async fn put(&self, robot: Robot) {
        let mut robots = self.robots.write().await;
        robots.insert(robot.id.as_str().to_owned(), robot);
    }

    /// Remove a robot from the cache. Does not affect the backing store.
    pub async fn evict(&self, id: &MemberId) {
        let mut robots = self.robots.write().await;
        robots.remove(id.as_str());
    }

    /// Set a robot's status, returning `false` if the robot was not cached.
    pub async fn set_status(&self, id: &MemberId, status: RobotStatus) -> bool {
        let mut robots = self.robots.write().await;
        match robots.get_mut(id.as_str()) {
            Some(robot) => {
                robot.status = status;
                true
            }
            None => false,
        }
    }

    /// Record that an execution id now belongs to a robot's lightweight
    /// introspection set. Returns `false` if the robot was not cached.
    pub async fn track_execution(&self, id: &MemberId, execution_id: robox_core::id::ExecutionId) -> bool {
        let mut robots = self.robots.write().await;
        match robots.get_mut(id.as_str()) {
            Some(robot) => {
                robot.executions.insert(execution_id);
                true
            }
            None => false,
        }
    }

    /// Record that the clock matcher just admitted an execution for a robot,
    /// updating `last_run` so the next matcher call sees it. Returns `false`
    /// if the robot was not cached.
    pub async fn mark_run(&self, id: &MemberId, at: chrono::DateTime<chrono::Utc>) -> bool {
        let mut robots = self.robots.write().await;
        match robots.get_mut(id.as_str()) {
            Some(robot) => {
                robot.last_run = Some(at);
                true
            }
            None => false,
        }
    }

    /// Remove an execution id from a robot's lightweight introspection set.
    pub async fn untrack_execution(&self, id: &MemberId, execution_id: &robox_core::id::ExecutionId) {
        let mut robots = self.robots.write().await;
        if let Some(robot) = robots.get_mut(id.as_str()) {
            robot.executions.remove(execution_id);
        }
    }

    /// Snapshot every cached robot, for the clock tick sweep (§4.4) which
    /// must consider all robots rather than one looked up by id.
    pub async fn all(&self) -> Vec<Robot> {
        self.robots.read().await.values().cloned().collect()
    }

    /// Snapshot every cached robot belonging to `team_id` (§4.1).
    pub async fn list(&self, team_id: &TeamId) -> Vec<Robot> {
        self.robots.read().await.values().filter(|robot| &robot.team_id == team_id).cloned().collect()
    }

    /// Number of robots currently cached.
    pub async fn len(&self) -> usize {
        self.robots.read().await.len()
    }

    /// Whether the cache currently holds no robots.
    pub async fn is_empty(&self) -> bool {
        self.robots.read().await.is_empty()
    }
}

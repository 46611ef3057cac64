//! Shared test fixtures, gated behind the `test-utils` feature so downstream
//! crates can depend on them without pulling tokio into normal builds.

use crate::bridge::{AgentBridge, BridgeContext};
use crate::error::BridgeError;
use crate::id::{AgentId, MemberId, TeamId};
use crate::robot::Robot;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// An `AgentBridge` backed by a fixed map of `(agent_id, method) -> response`,
/// for exercising phase handlers without a real agent backend.
pub struct StubBridge {
    responses: HashMap<(String, String), Value>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubBridge {
    /// Create a stub with no configured responses; every call resolves `None`.
    pub fn new() -> Self {
        Self { responses: HashMap::new(), calls: Mutex::new(Vec::new()) }
    }

    /// Register a canned response for `agent_id` invoking `method`.
    pub fn with_response(mut self, agent_id: &str, method: &str, response: Value) -> Self {
        self.responses.insert((agent_id.to_owned(), method.to_owned()), response);
        self
    }

    /// Invocations observed so far, as `(agent_id, method)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("stub bridge mutex poisoned").clone()
    }
}

impl Default for StubBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentBridge for StubBridge {
    async fn execute(
        &self,
        context: &BridgeContext,
        method: &str,
        _args: Value,
    ) -> Result<Option<Value>, BridgeError> {
        let key = (context.agent_id.to_string(), method.to_owned());
        self.calls.lock().expect("stub bridge mutex poisoned").push(key.clone());
        Ok(self.responses.get(&key).cloned())
    }
}

/// Build a robot with default config for use in tests, with the given id.
pub fn fixture_robot(id: &str) -> Robot {
    Robot::new(MemberId::new(id), TeamId::new("team-fixture"), format!("robot-{id}"))
}

/// Build a bridge context for a fixture execution and agent.
pub fn fixture_context(execution_id: &str, agent_id: &str) -> BridgeContext {
    BridgeContext {
        execution_id: crate::id::ExecutionId::new(execution_id),
        session_id: None,
        agent_id: AgentId::new(agent_id),
    }
}

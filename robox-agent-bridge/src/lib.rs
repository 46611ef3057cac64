#![deny(missing_docs)]
//! Agent-invocation bridge: a [`Delegate`] registry dispatched through a
//! uniform [`AgentBridge`](robox_core::bridge::AgentBridge) surface.
//!
//! Modeled on the teacher's `LocalOrchestrator` (a `HashMap<String, Arc<dyn
//! Operator>>` dispatcher) and its `HookRegistry` (an ordered, short-circuit
//! dispatch pipeline): [`LocalAgentBridge`] is the production in-process
//! dispatcher, registering one [`Delegate`] per agent id and routing
//! `execute()` calls to whichever delegate the bridge context names. A
//! delegate that does not recognize a method name returns `Ok(None)` rather
//! than an error, matching the create/next-hook absence semantics described
//! on [`AgentBridge`](robox_core::bridge::AgentBridge).

use async_trait::async_trait;
use robox_core::bridge::{AgentBridge, BridgeContext};
use robox_core::error::BridgeError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One delegate backing an agent id: an LLM client, an MCP tool server
/// adapter, or a process-invocation wrapper. Delegates are method-routed —
/// a single delegate may answer to several method names (one per phase it
/// participates in).
#[async_trait]
pub trait Delegate: Send + Sync {
    /// Invoke `method` with `args`. Returns `Ok(None)` if this delegate does
    /// not implement `method` — the bridge surfaces that as a routine
    /// absence, not an error.
    async fn invoke(&self, method: &str, args: Value) -> Result<Option<Value>, BridgeError>;
}

/// In-process bridge that dispatches to a registry of [`Delegate`]s keyed by
/// agent id.
///
/// Uses `Arc<dyn Delegate>` so registered delegates may be shared across
/// concurrent executions without cloning their (possibly expensive) setup.
pub struct LocalAgentBridge {
    delegates: HashMap<String, Arc<dyn Delegate>>,
}

impl LocalAgentBridge {
    /// Create a new empty bridge.
    pub fn new() -> Self {
        Self { delegates: HashMap::new() }
    }

    /// Register a delegate under an agent id, replacing any prior
    /// registration for that id.
    pub fn register(&mut self, agent_id: impl Into<String>, delegate: Arc<dyn Delegate>) {
        self.delegates.insert(agent_id.into(), delegate);
    }
}

impl Default for LocalAgentBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentBridge for LocalAgentBridge {
    async fn execute(
        &self,
        context: &BridgeContext,
        method: &str,
        args: Value,
    ) -> Result<Option<Value>, BridgeError> {
        let delegate = self
            .delegates
            .get(context.agent_id.as_str())
            .ok_or_else(|| BridgeError::ContextFailed(format!(
                "no delegate registered for agent {}",
                context.agent_id
            )))?;
        delegate.invoke(method, args).await
    }
}

/// A [`Delegate`] backed by a plain async closure, for wiring simple or
/// in-test delegates without a dedicated type.
pub struct ClosureDelegate<F> {
    f: F,
}

impl<F, Fut> ClosureDelegate<F>
where
    F: Fn(String, Value) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Option<Value>, BridgeError>> + Send,
{
    /// Wrap an async closure as a delegate.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Delegate for ClosureDelegate<F>
where
    F: Fn(String, Value) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Option<Value>, BridgeError>> + Send,
{
    async fn invoke(&self, method: &str, args: Value) -> Result<Option<Value>, BridgeError> {
        (self.f)(method.to_owned(), args).await
    }
}

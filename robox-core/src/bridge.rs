//! The agent-invocation bridge protocol (§4.8).
//!
//! Mirrors the teacher's `Operator` trait: a single generic invocation
//! method that phase handlers layer typed helpers on top of, rather than one
//! trait method per phase. A method that a given agent does not implement is
//! not an error — it resolves to `Ok(None)` ("create hook" / "next hook"
//! absence semantics) so phase handlers can treat an unconfigured agent the
//! same way they treat one that deliberately declines to act.

use crate::error::BridgeError;
use crate::id::{AgentId, ExecutionId, SessionId};
use async_trait::async_trait;
use serde_json::Value;

/// Context passed to every bridge invocation, scoping it to one execution.
#[derive(Debug, Clone)]
pub struct BridgeContext {
    /// The execution this invocation is part of.
    pub execution_id: ExecutionId,
    /// The bridge session, assigned on the first invocation of an execution.
    pub session_id: Option<SessionId>,
    /// Which delegated agent to invoke.
    pub agent_id: AgentId,
}

/// Outcome of opening a fresh bridge session for an execution's first invocation.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    /// The session id assigned to this execution.
    pub session_id: SessionId,
    /// The agent's response payload, if it implements this method.
    pub response: Option<Value>,
}

/// Outcome of a subsequent invocation within an existing bridge session.
#[derive(Debug, Clone)]
pub struct NextOutcome {
    /// The agent's response payload, if it implements this method.
    pub response: Option<Value>,
}

/// A delegated LLM agent, tool server, or process reachable through a
/// uniform generic invocation surface (§4.8).
///
/// Implementations bridge to whatever is actually running the agent —
/// an in-process model client, an MCP tool server, a subprocess. The
/// orchestrator never depends on a specific backend.
#[async_trait]
pub trait AgentBridge: Send + Sync {
    /// Invoke `method` on the agent identified by `context.agent_id`, with
    /// arbitrary JSON `args`. Returns `Ok(None)` if `method` is not defined
    /// for this agent — a routine case, not an error. Any other failure
    /// (agent unreachable, malformed response, timeout) is an `Err`.
    async fn execute(
        &self,
        context: &BridgeContext,
        method: &str,
        args: Value,
    ) -> Result<Option<Value>, BridgeError>;

    /// Open a new session and invoke the phase's create-hook method.
    ///
    /// Default implementation layers session assignment on top of
    /// [`execute`](Self::execute): sessions are a detail of addressing, not
    /// of the invocation contract itself.
    async fn execute_create(
        &self,
        context: &BridgeContext,
        session_id: SessionId,
        method: &str,
        args: Value,
    ) -> Result<CreateOutcome, BridgeError> {
        let mut ctx = context.clone();
        ctx.session_id = Some(session_id.clone());
        let response = self.execute(&ctx, method, args).await?;
        Ok(CreateOutcome { session_id, response })
    }

    /// Invoke a phase's next-hook method within an already-open session.
    async fn execute_next(
        &self,
        context: &BridgeContext,
        method: &str,
        args: Value,
    ) -> Result<NextOutcome, BridgeError> {
        let response = self.execute(context, method, args).await?;
        Ok(NextOutcome { response })
    }
}

use robox_agent_bridge::{ClosureDelegate, Delegate, LocalAgentBridge};
use robox_core::bridge::{AgentBridge, BridgeContext};
use robox_core::error::BridgeError;
use robox_core::id::{AgentId, ExecutionId};
use std::sync::Arc;

fn context(agent_id: &str) -> BridgeContext {
    BridgeContext {
        execution_id: ExecutionId::new("exec-1"),
        session_id: None,
        agent_id: AgentId::new(agent_id),
    }
}

#[tokio::test]
async fn dispatches_to_registered_delegate() {
    let mut bridge = LocalAgentBridge::new();
    bridge.register(
        "planner",
        Arc::new(ClosureDelegate::new(|method, _args| async move {
            if method == "plan" {
                Ok(Some(serde_json::json!({"ok": true})))
            } else {
                Ok(None)
            }
        })),
    );

    let response = bridge
        .execute(&context("planner"), "plan", serde_json::json!({}))
        .await
        .expect("ok");
    assert_eq!(response, Some(serde_json::json!({"ok": true})));
}

#[tokio::test]
async fn unknown_method_resolves_none_not_error() {
    let mut bridge = LocalAgentBridge::new();
    bridge.register(
        "planner",
        Arc::new(ClosureDelegate::new(|_method, _args| async move { Ok(None) })),
    );

    let response = bridge
        .execute(&context("planner"), "unimplemented_method", serde_json::json!({}))
        .await
        .expect("ok");
    assert!(response.is_none());
}

#[tokio::test]
async fn unregistered_agent_is_an_error() {
    let bridge = LocalAgentBridge::new();
    let err = bridge
        .execute(&context("ghost"), "plan", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::ContextFailed(_)));
}

struct RecordingDelegate;

#[async_trait::async_trait]
impl Delegate for RecordingDelegate {
    async fn invoke(&self, method: &str, args: serde_json::Value) -> Result<Option<serde_json::Value>, BridgeError> {
        Ok(Some(serde_json::json!({"method": method, "echo": args})))
    }
}

#[tokio::test]
async fn struct_delegate_echoes_args() {
    let mut bridge = LocalAgentBridge::new();
    bridge.register("echo", Arc::new(RecordingDelegate));

    let response = bridge
        .execute(&context("echo"), "inspire", serde_json::json!({"x": 1}))
        .await
        .expect("ok")
        .expect("some");
    assert_eq!(response["method"], "inspire");
    assert_eq!(response["echo"]["x"], 1);
}

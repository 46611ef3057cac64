//! Task executors for the run phase (§4.5).

use async_trait::async_trait;
use robox_core::bridge::{AgentBridge, BridgeContext};
use robox_core::duration::RobotDuration;
use robox_core::execution::Execution;
use robox_core::phase::Phase;
use robox_core::robot::Robot;
use robox_core::task::{ExecutorKind, Task, TaskResult, TaskStatus, ValidationResult};
use serde_json::json;
use std::time::Instant;

/// Upper bound on follow-up turns an assistant task may take when its
/// validation reports `need_reply` without `complete` (§4.5, §9).
const MAX_CONTINUATION_TURNS: u8 = 3;

/// Dispatches one planned [`Task`] to whichever backend its
/// [`ExecutorKind`] names and reports the outcome.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run `task` to completion (or failure) and return its result.
    /// Never returns `Err` — a dispatch failure is reported as a `Failed`
    /// [`TaskResult`] so the run phase can finish the whole task list.
    async fn execute(
        &self,
        robot: &Robot,
        execution: &Execution,
        bridge: &dyn AgentBridge,
        task: &Task,
    ) -> TaskResult;
}

/// Dispatches `assistant`-kind tasks through the robot's execution agent via
/// the [`AgentBridge`]; mcp and process tasks fall back to
/// [`PassthroughExecutor`] behaviour since this orchestrator does not itself
/// speak MCP or spawn subprocesses.
pub struct AssistantExecutor;

#[async_trait]
impl TaskExecutor for AssistantExecutor {
    async fn execute(
        &self,
        robot: &Robot,
        execution: &Execution,
        bridge: &dyn AgentBridge,
        task: &Task,
    ) -> TaskResult {
        match &task.executor {
            ExecutorKind::Assistant => {
                let Some(agent_id) = robot.config.resources.agents.for_phase(Phase::Run).cloned() else {
                    return TaskResult {
                        task_id: task.id.clone(),
                        status: TaskStatus::Failed,
                        output: None,
                        error: Some("no execution agent configured".to_owned()),
                        duration: RobotDuration::ZERO,
                        validation: None,
                    };
                };
                let context = BridgeContext {
                    execution_id: execution.id.clone(),
                    session_id: execution.session_id.clone(),
                    agent_id,
                };
                let started = Instant::now();
                let mut output = match bridge.execute(&context, "run_task", json!({"task": task})).await {
                    Ok(output) => output,
                    Err(err) => {
                        return TaskResult {
                            task_id: task.id.clone(),
                            status: TaskStatus::Failed,
                            output: None,
                            error: Some(err.to_string()),
                            duration: RobotDuration::from_millis(started.elapsed().as_millis() as u64),
                            validation: None,
                        };
                    }
                };
                let mut validation = parse_validation(output.as_ref());

                let mut turn = 0;
                while turn < MAX_CONTINUATION_TURNS {
                    let Some(current) = &validation else { break };
                    if !current.need_reply || current.complete {
                        break;
                    }
                    let reply = current.reply_content.clone().unwrap_or_default();
                    match bridge
                        .execute(&context, "continue_task", json!({"task": task, "reply": reply}))
                        .await
                    {
                        Ok(next_output) => {
                            validation = parse_validation(next_output.as_ref());
                            output = next_output;
                        }
                        Err(err) => {
                            return TaskResult {
                                task_id: task.id.clone(),
                                status: TaskStatus::Failed,
                                output,
                                error: Some(err.to_string()),
                                duration: RobotDuration::from_millis(started.elapsed().as_millis() as u64),
                                validation,
                            };
                        }
                    }
                    turn += 1;
                }

                let passed = validation.as_ref().map(|v| v.passed).unwrap_or(true);
                TaskResult {
                    task_id: task.id.clone(),
                    status: if passed { TaskStatus::Succeeded } else { TaskStatus::Failed },
                    output,
                    error: None,
                    duration: RobotDuration::from_millis(started.elapsed().as_millis() as u64),
                    validation,
                }
            }
            ExecutorKind::Mcp { .. } | ExecutorKind::Process { .. } => {
                PassthroughExecutor.execute(robot, execution, bridge, task).await
            }
        }
    }
}

fn parse_validation(output: Option<&serde_json::Value>) -> Option<ValidationResult> {
    output?.get("validation").cloned().and_then(|v| serde_json::from_value(v).ok())
}

/// A stand-in executor for executor kinds this orchestrator does not
/// dispatch natively (`mcp`, `process`): it marks the task succeeded with a
/// note rather than failing the whole run phase. A real deployment would
/// swap this for a bridge to an actual MCP client or subprocess runner.
pub struct PassthroughExecutor;

#[async_trait]
impl TaskExecutor for PassthroughExecutor {
    async fn execute(
        &self,
        _robot: &Robot,
        _execution: &Execution,
        _bridge: &dyn AgentBridge,
        task: &Task,
    ) -> TaskResult {
        TaskResult {
            task_id: task.id.clone(),
            status: TaskStatus::Succeeded,
            output: Some(json!({"passthrough": true, "executor": &task.executor})),
            error: None,
            duration: RobotDuration::ZERO,
            validation: None,
        }
    }
}

//! Phase handler implementations (§4.6).

use crate::delivery::ChannelSender;
use crate::tasks::TaskExecutor;
use robox_core::bridge::{AgentBridge, BridgeContext};
use robox_core::delivery::{ChannelResult, ChannelTarget, DeliveryContent, DeliveryResult};
use robox_core::error::PhaseError;
use robox_core::execution::{Execution, TriggerInput};
use robox_core::duration::RobotDuration;
use robox_core::id::SessionId;
use robox_core::phase::Phase;
use robox_core::robot::{ExecutorMode, LearningType, Robot};
use robox_core::task::{Task, TaskResult, TaskStatus};
use serde_json::{json, Value};

/// Whether this trigger carries the literal `"simulate_failure"` payload
/// that forces a failed terminal state, for dry-run exercising of the
/// failure path (§4.6).
pub(crate) fn is_simulated_failure(trigger: &TriggerInput) -> bool {
    match trigger {
        TriggerInput::Human(human) => human.messages.iter().any(|m| m == "simulate_failure"),
        TriggerInput::Event(event) => {
            event.payload == json!("simulate_failure")
                || event.payload.get("simulate_failure").map(|v| v == &json!(true)).unwrap_or(false)
        }
        TriggerInput::Clock { .. } => false,
    }
}

/// Store a phase's output into the execution's accumulated outputs.
pub(crate) fn write_output(execution: &mut Execution, phase: Phase, output: Value) {
    match phase {
        Phase::Inspiration => execution.outputs.inspiration = Some(output),
        Phase::Goals => execution.outputs.goals = Some(output),
        Phase::Tasks => execution.outputs.tasks = Some(output),
        Phase::Run => execution.outputs.run = Some(output),
        Phase::Delivery => execution.outputs.delivery = Some(output),
        Phase::Learning => execution.outputs.learning = Some(output),
    }
}

/// Dispatch to the handler for `phase`.
pub(crate) async fn run_phase(
    phase: Phase,
    robot: &Robot,
    execution: &Execution,
    bridge: &dyn AgentBridge,
    task_executor: &dyn TaskExecutor,
    channel_sender: &dyn ChannelSender,
) -> Result<Value, PhaseError> {
    match phase {
        Phase::Inspiration => inspiration(robot, execution, bridge).await,
        Phase::Goals => goals(robot, execution, bridge).await,
        Phase::Tasks => tasks_phase(robot, execution, bridge).await,
        Phase::Run => run_tasks(robot, execution, bridge, task_executor).await,
        Phase::Delivery => delivery(robot, execution, channel_sender).await,
        Phase::Learning => learning(robot, execution, bridge).await,
    }
}

fn is_dryrun(robot: &Robot) -> bool {
    matches!(robot.config.executor.mode, ExecutorMode::Dryrun)
}

fn planning_agent_context(execution: &Execution, robot: &Robot, phase: Phase) -> Option<BridgeContext> {
    robot.config.resources.agents.for_phase(phase).cloned().map(|agent_id| BridgeContext {
        execution_id: execution.id.clone(),
        session_id: execution.session_id.clone(),
        agent_id,
    })
}

/// Call the phase's delegated agent, treating both "no agent configured" and
/// "method not defined" as an absent override (§4.8) that falls back to
/// `fallback`.
#[allow(clippy::too_many_arguments)]
async fn call_planning_agent(
    robot: &Robot,
    execution: &Execution,
    bridge: &dyn AgentBridge,
    phase: Phase,
    method: &str,
    args: Value,
    fallback: Value,
) -> Result<Value, PhaseError> {
    if is_dryrun(robot) {
        return Ok(fallback);
    }
    let Some(context) = planning_agent_context(execution, robot, phase) else {
        return Ok(fallback);
    };
    let response = if execution.session_id.is_none() {
        bridge
            .execute_create(&context, SessionId::new(uuid::Uuid::new_v4().to_string()), method, args)
            .await
            .map_err(PhaseError::Bridge)?
            .response
    } else {
        bridge.execute_next(&context, method, args).await.map_err(PhaseError::Bridge)?.response
    };
    Ok(response.unwrap_or(fallback))
}

async fn inspiration(robot: &Robot, execution: &Execution, bridge: &dyn AgentBridge) -> Result<Value, PhaseError> {
    let clock_context = match &execution.trigger {
        TriggerInput::Clock { context } => *context,
        _ => return Ok(Value::Null),
    };

    let fallback = json!({
        "report": format!(
            "# Inspiration Report\n\n## Summary\nRoutine scheduled check-in at {:02}:00.\n\n## Highlights\n(none)\n\n## Opportunities\n(none)\n\n## Risks\n(none)\n\n## World News\n(none)\n\n## Pending\n(none)\n",
            clock_context.hour
        ),
        "clock_context": clock_context,
    });

    call_planning_agent(
        robot,
        execution,
        bridge,
        Phase::Inspiration,
        "inspire",
        json!({"clock_context": clock_context}),
        fallback,
    )
    .await
}

async fn goals(robot: &Robot, execution: &Execution, bridge: &dyn AgentBridge) -> Result<Value, PhaseError> {
    let fallback = json!({
        "goals": [{
            "description": "Address the incoming trigger",
            "priority": "Normal",
            "delivery_target": {"channel": "log_only", "recipients": [], "format": "markdown", "options": {}},
        }]
    });

    call_planning_agent(
        robot,
        execution,
        bridge,
        Phase::Goals,
        "plan_goals",
        json!({"trigger": &execution.trigger, "inspiration": execution.outputs.inspiration}),
        fallback,
    )
    .await
}

async fn tasks_phase(robot: &Robot, execution: &Execution, bridge: &dyn AgentBridge) -> Result<Value, PhaseError> {
    let fallback_task = Task {
        id: "task-1".to_owned(),
        description: "Respond to the triggering request".to_owned(),
        message: "Respond to the triggering request".to_owned(),
        executor: robox_core::task::ExecutorKind::Assistant,
        expected_output: None,
        validation_rules: Vec::new(),
        status: TaskStatus::Pending,
        order: 0,
        attempts: 0,
        max_attempts: 1,
        started_at: None,
        finished_at: None,
    };
    let fallback = json!({"tasks": [fallback_task]});

    call_planning_agent(
        robot,
        execution,
        bridge,
        Phase::Tasks,
        "plan_tasks",
        json!({"goals": execution.outputs.goals}),
        fallback,
    )
    .await
}

async fn run_tasks(
    robot: &Robot,
    execution: &Execution,
    bridge: &dyn AgentBridge,
    task_executor: &dyn TaskExecutor,
) -> Result<Value, PhaseError> {
    let mut tasks: Vec<Task> = execution
        .outputs
        .tasks
        .as_ref()
        .and_then(|v| v.get("tasks").cloned())
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    tasks.sort_by_key(|t| t.order);

    let mut results = Vec::with_capacity(tasks.len());
    for task in &mut tasks {
        task.started_at = Some(chrono::Utc::now());
        let result = if is_dryrun(robot) {
            TaskResult {
                task_id: task.id.clone(),
                status: TaskStatus::Succeeded,
                output: Some(json!({"dryrun": true})),
                error: None,
                duration: RobotDuration::ZERO,
                validation: None,
            }
        } else {
            task_executor.execute(robot, execution, bridge, task).await
        };
        task.finished_at = Some(chrono::Utc::now());
        results.push(result);
    }

    Ok(json!({"results": results}))
}

async fn delivery(
    robot: &Robot,
    execution: &Execution,
    channel_sender: &dyn ChannelSender,
) -> Result<Value, PhaseError> {
    let run_summary = execution
        .outputs
        .run
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "no run output".to_owned());

    let content = DeliveryContent {
        summary: format!("Execution {} finished its run phase", execution.id),
        body: run_summary,
        attachments: Vec::new(),
    };

    let mut channel_results = Vec::new();
    let dryrun = is_dryrun(robot);
    for preference in &robot.config.delivery.channels {
        let target = ChannelTarget { kind: preference.kind.clone(), destination: preference.destination.clone() };
        let result = if dryrun {
            ChannelResult {
                recipients: vec![target.destination.clone()],
                details: Some("dryrun: delivery skipped".to_owned()),
                error: None,
                sent_at: Some(chrono::Utc::now()),
                target,
                success: true,
            }
        } else {
            channel_sender.send(&target, &content).await
        };
        let succeeded = result.success;
        channel_results.push(result);
        if succeeded && robot.config.delivery.first_success_only {
            break;
        }
    }

    let any_succeeded = channel_results.iter().any(|r| r.success);
    let result = DeliveryResult { content, channels: channel_results, any_succeeded };
    serde_json::to_value(result).map_err(|e| PhaseError::DeliveryFailed(e.to_string()))
}

async fn learning(robot: &Robot, execution: &Execution, bridge: &dyn AgentBridge) -> Result<Value, PhaseError> {
    match robot.config.learning.kind {
        LearningType::None => Ok(Value::Null),
        LearningType::Summary => Ok(json!({
            "type": "summary",
            "execution_id": execution.id.to_string(),
            "status": format!("{:?}", execution.status),
        })),
        LearningType::Reflective => {
            let fallback = json!({
                "type": "execution",
                "execution_id": execution.id.to_string(),
                "outcome": execution.outputs.delivery,
            });
            call_planning_agent(
                robot,
                execution,
                bridge,
                Phase::Learning,
                "learn",
                json!({"outputs": &execution.outputs}),
                fallback,
            )
            .await
        }
    }
}

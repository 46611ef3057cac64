//! Per-entrypoint input validation (§4.4).

use robox_core::error::TriggerError;
use robox_core::execution::{EventTriggerInput, HumanTriggerInput, InterventionAction};

fn action_label(action: &InterventionAction) -> &'static str {
    match action {
        InterventionAction::TaskAdd { .. } => "task.add",
        InterventionAction::TaskCancel { .. } => "task.cancel",
        InterventionAction::TaskUpdate { .. } => "task.update",
        InterventionAction::GoalAdd { .. } => "goal.add",
        InterventionAction::GoalAdjust { .. } => "goal.adjust",
        InterventionAction::GoalComplete { .. } => "goal.complete",
        InterventionAction::GoalCancel { .. } => "goal.cancel",
        InterventionAction::PlanAdd { .. } => "plan.add",
        InterventionAction::PlanRemove { .. } => "plan.remove",
        InterventionAction::PlanUpdate { .. } => "plan.update",
        InterventionAction::Instruct { .. } => "instruct",
    }
}

/// Validate a human intervention before admission (§4.4):
/// `task.add`, `goal.add`, and `instruct` all require a non-empty message
/// list. `plan.add`'s plan time requirement is enforced structurally by
/// [`InterventionAction::PlanAdd`] always carrying one.
pub fn validate_human(input: &HumanTriggerInput) -> Result<(), TriggerError> {
    let requires_messages = matches!(
        input.action,
        InterventionAction::TaskAdd { .. }
            | InterventionAction::GoalAdd { .. }
            | InterventionAction::Instruct { .. }
    );
    if requires_messages && input.messages.is_empty() {
        return Err(TriggerError::MessagesRequired(action_label(&input.action).to_owned()));
    }
    Ok(())
}

/// Validate an event delivery before admission (§4.4): non-empty source and
/// event type.
pub fn validate_event(input: &EventTriggerInput) -> Result<(), TriggerError> {
    if input.source.trim().is_empty() {
        return Err(TriggerError::EventFieldMissing("source".to_owned()));
    }
    if input.event_type.trim().is_empty() {
        return Err(TriggerError::EventFieldMissing("event_type".to_owned()));
    }
    Ok(())
}

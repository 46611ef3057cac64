//! The fixed six-phase execution state machine (§4.6).

use crate::execution::TriggerKind;
use serde::{Deserialize, Serialize};

/// One of the six fixed phases an execution passes through.
///
/// The sequence is fixed: phases are never reordered or skipped once
/// entered, though an execution may *enter* at `Inspiration` (clock
/// triggers, which need a fresh situational read) or at `Goals` (human and
/// event triggers, which already carry their own intent) per §4.4/§4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Assess the current situation; produces a free-form inspiration note.
    Inspiration,
    /// Derive or update goals from the inspiration (or trigger input).
    Goals,
    /// Break goals into a concrete task plan.
    Tasks,
    /// Execute the task plan against delegated executors.
    Run,
    /// Deliver results to configured channels.
    Delivery,
    /// Record a learning outcome.
    Learning,
}

impl Phase {
    /// Fixed progress percentage reported while this phase is active (§4.6).
    pub fn progress(self) -> u8 {
        match self {
            Self::Inspiration => 10,
            Self::Goals => 25,
            Self::Tasks => 40,
            Self::Run => 60,
            Self::Delivery => 80,
            Self::Learning => 95,
        }
    }

    /// This phase's position in the fixed sequence, 0-indexed.
    pub fn sequence(self) -> u8 {
        match self {
            Self::Inspiration => 0,
            Self::Goals => 1,
            Self::Tasks => 2,
            Self::Run => 3,
            Self::Delivery => 4,
            Self::Learning => 5,
        }
    }

    /// The phase immediately following this one, or `None` after `Learning`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Inspiration => Some(Self::Goals),
            Self::Goals => Some(Self::Tasks),
            Self::Tasks => Some(Self::Run),
            Self::Run => Some(Self::Delivery),
            Self::Delivery => Some(Self::Learning),
            Self::Learning => None,
        }
    }

    /// Which phase a trigger of the given kind enters the state machine at.
    ///
    /// Clock triggers always start at `Inspiration` since they carry only
    /// calendar context and need a fresh situational read. Human and event
    /// triggers already carry intent (an intervention action, or an event
    /// payload) and enter directly at `Goals` (§4.4, §4.6).
    pub fn entry_phase(trigger_kind: TriggerKind) -> Self {
        match trigger_kind {
            TriggerKind::Clock => Self::Inspiration,
            TriggerKind::Human | TriggerKind::Event => Self::Goals,
        }
    }
}

//! Sliding-window dedup oracle (§4.4).

use robox_core::execution::TriggerKind;
use robox_core::id::MemberId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// What the dedup oracle decided for one trigger attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupDecision {
    /// Drop this trigger; an equivalent one was admitted too recently.
    Skip,
    /// Combine this trigger's payload with the one already inside the window.
    Merge,
    /// Admit this trigger.
    Proceed,
}

fn kind_label(kind: TriggerKind) -> &'static str {
    match kind {
        TriggerKind::Clock => "clock",
        TriggerKind::Human => "human",
        TriggerKind::Event => "event",
    }
}

/// Sliding-window dedup oracle keyed by `(member id, trigger kind)` (§4.4).
///
/// Clock triggers are exempted — the clock matcher's own same-minute dedup
/// (§4.2) already governs clock admission, so this oracle always answers
/// `Proceed` for them and only tracks human and event triggers.
///
/// Human triggers cannot be merged: free-form instructions arriving within
/// the window are simply skipped as a repeat. Event triggers of the same
/// type arriving within the window are merged, since two deliveries of the
/// same event type plausibly describe the same underlying change.
pub struct DedupOracle {
    window: chrono::Duration,
    seen: RwLock<HashMap<(String, &'static str), chrono::DateTime<chrono::Utc>>>,
}

impl DedupOracle {
    /// Create an oracle with the given sliding-window width.
    pub fn new(window: chrono::Duration) -> Self {
        Self { window, seen: RwLock::new(HashMap::new()) }
    }

    /// Evaluate and record one trigger attempt at `now`.
    pub async fn check(
        &self,
        member_id: &MemberId,
        trigger_kind: TriggerKind,
        now: chrono::DateTime<chrono::Utc>,
    ) -> DedupDecision {
        if matches!(trigger_kind, TriggerKind::Clock) {
            return DedupDecision::Proceed;
        }

        let key = (member_id.as_str().to_owned(), kind_label(trigger_kind));
        let mut seen = self.seen.write().await;
        let decision = match seen.get(&key) {
            Some(last) if now.signed_duration_since(*last) < self.window => {
                if matches!(trigger_kind, TriggerKind::Event) {
                    DedupDecision::Merge
                } else {
                    DedupDecision::Skip
                }
            }
            _ => DedupDecision::Proceed,
        };
        seen.insert(key, now);
        decision
    }
}

impl Default for DedupOracle {
    /// A five-second window, wide enough to absorb a burst of near-duplicate
    /// deliveries without meaningfully delaying a distinct one.
    fn default() -> Self {
        Self::new(chrono::Duration::seconds(5))
    }
}

use robox_core::prelude::*;

#[test]
fn phase_progress_matches_fixed_percentages() {
    assert_eq!(Phase::Inspiration.progress(), 10);
    assert_eq!(Phase::Goals.progress(), 25);
    assert_eq!(Phase::Tasks.progress(), 40);
    assert_eq!(Phase::Run.progress(), 60);
    assert_eq!(Phase::Delivery.progress(), 80);
    assert_eq!(Phase::Learning.progress(), 95);
}

#[test]
fn phase_sequence_is_strictly_ordered() {
    let phases = [
        Phase::Inspiration,
        Phase::Goals,
        Phase::Tasks,
        Phase::Run,
        Phase::Delivery,
        Phase::Learning,
    ];
    for pair in phases.windows(2) {
        assert!(pair[0].sequence() < pair[1].sequence());
        assert_eq!(pair[0].next(), Some(pair[1]));
    }
    assert_eq!(Phase::Learning.next(), None);
}

#[test]
fn clock_triggers_enter_at_inspiration() {
    assert_eq!(Phase::entry_phase(TriggerKind::Clock), Phase::Inspiration);
}

#[test]
fn human_and_event_triggers_enter_at_goals() {
    assert_eq!(Phase::entry_phase(TriggerKind::Human), Phase::Goals);
    assert_eq!(Phase::entry_phase(TriggerKind::Event), Phase::Goals);
}

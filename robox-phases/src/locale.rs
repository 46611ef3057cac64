//! Message localization for durable log entries (§4.7).
//!
//! Only English and Chinese are built in. A locale whose prefix is neither
//! is treated as English; the fallback is only observable in the resulting
//! message text, never as an error.

use robox_core::phase::Phase;

fn is_chinese(locale: &str) -> bool {
    locale.to_ascii_lowercase().starts_with("zh")
}

pub fn phase_started(locale: &str, phase: Phase) -> String {
    if is_chinese(locale) {
        format!("阶段 {phase:?} 已开始")
    } else {
        format!("phase {phase:?} started")
    }
}

pub fn phase_completed(locale: &str, phase: Phase, elapsed_ms: u128) -> String {
    if is_chinese(locale) {
        format!("阶段 {phase:?} 已完成，用时 {elapsed_ms}ms")
    } else {
        format!("phase {phase:?} completed in {elapsed_ms}ms")
    }
}

pub fn phase_failed(locale: &str, phase: Phase, err: impl std::fmt::Display) -> String {
    if is_chinese(locale) {
        format!("阶段 {phase:?} 失败：{err}")
    } else {
        format!("phase {phase:?} failed: {err}")
    }
}

pub fn phase_panicked(locale: &str, phase: Phase, message: &str) -> String {
    if is_chinese(locale) {
        format!("阶段 {phase:?} 崩溃：{message}")
    } else {
        format!("phase {phase:?} panicked: {message}")
    }
}

pub fn cancelled_while_paused(locale: &str) -> String {
    if is_chinese(locale) {
        "执行在暂停时被取消".to_owned()
    } else {
        "execution cancelled while paused".to_owned()
    }
}

pub fn execution_completed(locale: &str, total_elapsed_ms: u128) -> String {
    if is_chinese(locale) {
        format!("执行已完成，用时 {total_elapsed_ms}ms")
    } else {
        format!("execution completed in {total_elapsed_ms}ms")
    }
}

pub fn execution_cancelled(locale: &str) -> String {
    if is_chinese(locale) { "执行已取消".to_owned() } else { "execution cancelled".to_owned() }
}

pub fn execution_failed(locale: &str) -> String {
    if is_chinese(locale) { "执行失败".to_owned() } else { "execution failed".to_owned() }
}

pub fn simulated_failure(locale: &str) -> String {
    if is_chinese(locale) { "模拟失败请求".to_owned() } else { "simulated failure requested".to_owned() }
}

/// Short machine-readable tag identifying `phase` for the [`LogEntry::step`]
/// column, independent of locale.
///
/// [`LogEntry::step`]: robox_core::store::LogEntry::step
pub fn phase_slug(phase: Phase) -> &'static str {
    match phase {
        Phase::Inspiration => "inspiration",
        Phase::Goals => "goals",
        Phase::Tasks => "tasks",
        Phase::Run => "run",
        Phase::Delivery => "delivery",
        Phase::Learning => "learning",
    }
}

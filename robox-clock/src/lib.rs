#![deny(missing_docs)]
//! The clock matcher (§4.2): a pure function of `(Robot, Instant) -> bool`.
//!
//! No I/O, no locking — callers (the trigger entrypoints, §4.4) own reading
//! the robot from the cache and writing `last_run` back after a match. This
//! mirrors the teacher's separation of pure decision logic from the
//! stateful stores that decision logic consults.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use robox_core::execution::ClockContext;
use robox_core::robot::{ClockMode, Robot};

/// Evaluate whether `robot` should wake at `now` (§4.2).
///
/// Returns `false` if the robot has no clock config that can fire — a
/// `daemon`-mode robot only wakes when it has free quota, which this
/// function cannot determine on its own, so callers pass `has_free_quota`
/// for that one case (§4.3).
pub fn should_wake(robot: &Robot, now: DateTime<Utc>, has_free_quota: bool) -> bool {
    let tz = resolve_timezone(&robot.config.clock.timezone);
    let local = now.with_timezone(&tz);

    match &robot.config.clock.mode {
        ClockMode::Daemon => has_free_quota,
        ClockMode::Interval { every } => match robot.last_run {
            None => true,
            Some(last_run) => {
                let elapsed = now.signed_duration_since(last_run);
                if elapsed < chrono::Duration::zero() {
                    // last_run is later than now: clock skew or a very recent
                    // run. Force a skip until a later instant is reached.
                    false
                } else {
                    elapsed >= chrono::Duration::milliseconds(every.as_millis() as i64)
                }
            }
        },
        ClockMode::Times { at, days } => times_mode_matches(robot, &local, at, days),
    }
}

fn times_mode_matches(
    robot: &Robot,
    local: &DateTime<Tz>,
    at: &[String],
    days: &[String],
) -> bool {
    if !weekday_allowed(local, days) {
        return false;
    }

    let current_hhmm = format!("{:02}:{:02}", local.hour(), local.minute());
    if !at.iter().any(|t| t == &current_hhmm) {
        return false;
    }

    if let Some(last_run) = robot.last_run {
        let tz = local.timezone();
        let last_local = last_run.with_timezone(&tz);
        let same_minute = last_local.hour() == local.hour() && last_local.minute() == local.minute();
        let same_day = last_local.day() == local.day()
            && last_local.month() == local.month()
            && last_local.year() == local.year();
        if same_minute && same_day {
            return false;
        }
    }

    true
}

fn weekday_allowed(local: &DateTime<Tz>, days: &[String]) -> bool {
    if days.is_empty() || days.iter().any(|d| d == "*") {
        return true;
    }
    let name = weekday_name(local.weekday());
    days.iter().any(|d| d.eq_ignore_ascii_case(name))
}

fn weekday_name(weekday: chrono::Weekday) -> &'static str {
    match weekday {
        chrono::Weekday::Mon => "mon",
        chrono::Weekday::Tue => "tue",
        chrono::Weekday::Wed => "wed",
        chrono::Weekday::Thu => "thu",
        chrono::Weekday::Fri => "fri",
        chrono::Weekday::Sat => "sat",
        chrono::Weekday::Sun => "sun",
    }
}

/// Resolve a configured timezone name, falling back to the host's local IANA
/// zone if the name is unrecognized (§4.2), and further to UTC if even the
/// host zone can't be determined or parsed.
fn resolve_timezone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| host_timezone())
}

fn host_timezone() -> Tz {
    iana_time_zone::get_timezone().ok().and_then(|name| name.parse().ok()).unwrap_or(Tz::UTC)
}

/// Build the [`ClockContext`] passed to the inspiration phase for a
/// clock-triggered execution, from the instant the matcher admitted (§4.4).
pub fn build_clock_context(robot: &Robot, now: DateTime<Utc>) -> ClockContext {
    let tz = resolve_timezone(&robot.config.clock.timezone);
    let local = now.with_timezone(&tz);

    let last_calendar_day = is_last_calendar_day_of_month(&local);
    let is_quarter_end = last_calendar_day && matches!(local.month(), 3 | 6 | 9 | 12);
    let is_year_end = last_calendar_day && local.month() == 12;

    ClockContext {
        hour: local.hour(),
        weekday: local.weekday().num_days_from_monday(),
        day_of_month: local.day(),
        iso_week: local.iso_week().week(),
        month: local.month(),
        year: local.year(),
        is_weekend: matches!(local.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun),
        is_month_start: local.day() <= 3,
        is_month_end: days_remaining_in_month(&local) < 3,
        is_quarter_end,
        is_year_end,
    }
}

fn is_last_calendar_day_of_month(local: &DateTime<Tz>) -> bool {
    let next_day = *local + chrono::Duration::days(1);
    next_day.month() != local.month()
}

/// Number of days after `local`'s day still remaining in its month (0 on the
/// last day, 1 on the second-to-last, ...).
fn days_remaining_in_month(local: &DateTime<Tz>) -> i64 {
    let (next_year, next_month) =
        if local.month() == 12 { (local.year() + 1, 1) } else { (local.year(), local.month() + 1) };
    let first_of_next = local
        .timezone()
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .expect("first of month is unambiguous");
    let first_of_this = local
        .timezone()
        .with_ymd_and_hms(local.year(), local.month(), 1, 0, 0, 0)
        .single()
        .expect("first of month is unambiguous");
    let days_in_month = (first_of_next - first_of_this).num_days();
    days_in_month - local.day() as i64
}

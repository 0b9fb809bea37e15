//! Recurrence Evaluator

use chrono::{Datelike, Duration, NaiveDate};

use crate::calendar::weeks_between;
use crate::models::FrequencyRule;

/// Whether `rule` delivers on `candidate` for a subscription started on `start`.
///
/// Bi-weekly parity counts Monday-aligned weeks from the week containing
/// `start`; candidates before that week never deliver. Monthly rules are not
/// clamped: day 31 skips 30-day months and February.
pub fn is_delivery_day(rule: &FrequencyRule, start: NaiveDate, candidate: NaiveDate) -> bool {
    match rule {
        FrequencyRule::Weekly { days } => days.contains(&candidate.weekday()),
        FrequencyRule::Biweekly { day } => {
            if candidate.weekday() != *day {
                return false;
            }
            let weeks = weeks_between(start, candidate);
            weeks >= 0 && weeks % 2 == 0
        }
        FrequencyRule::Monthly { day_of_month } => candidate.day() == *day_of_month,
        FrequencyRule::Unscheduled { .. } => false,
    }
}

/// First delivery on or after `from`, looking at most `horizon_days` ahead
pub fn next_delivery_on_or_after(
    rule: &FrequencyRule,
    start: NaiveDate,
    from: NaiveDate,
    horizon_days: u32,
) -> Option<NaiveDate> {
    if !rule.is_scheduled() {
        return None;
    }
    (0..=horizon_days as i64)
        .map(|offset| from + Duration::days(offset))
        .find(|date| is_delivery_day(rule, start, *date))
}

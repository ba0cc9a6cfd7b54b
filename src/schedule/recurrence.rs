use chrono::{Duration, Months, NaiveDateTime};

use super::types::{RecurrencePattern, RecurrenceType, ScheduleItem, ScheduleStatus};
use crate::store::new_item_id;

/// Safety cap when a pattern has no usable occurrence count
pub const DEFAULT_MAX_OCCURRENCES: usize = 100;

/// Advances a start time by one period of the pattern.
/// Month/year arithmetic clamps to the last valid day (Jan 31 + 1 month -> Feb 29/28).
fn advance(current: NaiveDateTime, pattern: &RecurrencePattern) -> Option<NaiveDateTime> {
    match pattern.recurrence_type {
        RecurrenceType::Daily => current.checked_add_signed(Duration::days(pattern.interval as i64)),
        RecurrenceType::Weekly => {
            current.checked_add_signed(Duration::weeks(pattern.interval as i64))
        }
        RecurrenceType::Monthly => current.checked_add_months(Months::new(pattern.interval)),
        RecurrenceType::Yearly => pattern
            .interval
            .checked_mul(12)
            .and_then(|months| current.checked_add_months(Months::new(months))),
    }
}

/// Effective instance cap: min(occurrences, default), with non-positive
/// occurrence counts falling back to the default cap.
fn effective_cap(pattern: &RecurrencePattern) -> usize {
    match pattern.occurrences {
        Some(n) if n > 0 => (n as usize).min(DEFAULT_MAX_OCCURRENCES),
        _ => DEFAULT_MAX_OCCURRENCES,
    }
}

/// Expands a recurring parent into concrete instances.
///
/// Each occurrence starts one period after the previous one and keeps the
/// parent's duration. Generation stops at the occurrence cap, or when a
/// computed start date falls after the pattern's end date (that occurrence
/// is discarded). The parent itself is not included in the output.
pub fn generate_instances(parent: &ScheduleItem, pattern: &RecurrencePattern) -> Vec<ScheduleItem> {
    let duration = parent.end - parent.start;
    let cap = effective_cap(pattern);

    let mut instances = Vec::new();
    let mut current = parent.start;

    while instances.len() < cap {
        let next = match advance(current, pattern) {
            Some(next) => next,
            None => break,
        };
        if let Some(end_date) = pattern.end_date {
            if next.date() > end_date {
                break;
            }
        }
        instances.push(instance_from_parent(parent, next, next + duration));
        current = next;
    }

    instances
}

/// Copies the parent's descriptive fields into a generated instance
fn instance_from_parent(
    parent: &ScheduleItem,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> ScheduleItem {
    let mut instance = parent.clone();
    instance.id = new_item_id();
    instance.start = start;
    instance.end = end;
    instance.status = ScheduleStatus::Scheduled;
    instance.is_recurring = false;
    instance.recurrence_pattern = None;
    instance.parent_recurrence_id = Some(parent.id.clone());
    instance.recurrence_instance_date = Some(start.date());
    instance
}

use chrono::NaiveDateTime;

use super::types::ScheduleItem;

/// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
/// Back-to-back intervals (one ends exactly when the other starts) do not.
pub fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Returns every item overlapping the candidate interval, sorted by start.
///
/// Callers pass items already scoped to one technician and organization.
/// `exclude_id` keeps an item from flagging itself during an update check.
pub fn find_conflicts<'a>(
    items: &'a [ScheduleItem],
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude_id: Option<&str>,
) -> Vec<&'a ScheduleItem> {
    let mut hits: Vec<&ScheduleItem> = items
        .iter()
        .filter(|item| exclude_id.map_or(true, |ex| item.id != ex))
        .filter(|item| intervals_overlap(item.start, item.end, start, end))
        .collect();
    hits.sort_by_key(|item| item.start);
    hits
}

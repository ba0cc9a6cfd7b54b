use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::types::{FoundSlot, ScheduleItem, TimePreference};

/// How many calendar days the slot search scans, starting at the preferred date
pub const SEARCH_WINDOW_DAYS: i64 = 7;

/// Working hours, local time
pub const WORK_DAY_START_HOUR: u32 = 9;
pub const WORK_DAY_END_HOUR: u32 = 17;
pub const MORNING_END_HOUR: u32 = 12;
pub const AFTERNOON_START_HOUR: u32 = 13;

/// The working-hour window searched on one day for a given time preference
pub fn preference_window(date: NaiveDate, preference: TimePreference) -> (NaiveDateTime, NaiveDateTime) {
    let (start_hour, end_hour) = match preference {
        TimePreference::Morning => (WORK_DAY_START_HOUR, MORNING_END_HOUR),
        TimePreference::Afternoon => (AFTERNOON_START_HOUR, WORK_DAY_END_HOUR),
        TimePreference::Any => (WORK_DAY_START_HOUR, WORK_DAY_END_HOUR),
    };
    (
        date.and_hms_opt(start_hour, 0, 0).unwrap(),
        date.and_hms_opt(end_hour, 0, 0).unwrap(),
    )
}

/// Walks the gaps of one day's bookings and returns the first gap that fits
/// `duration_minutes`, clipped to exactly that length.
///
/// The cursor tracks the latest busy end seen, so overlapping bookings and
/// bookings spilling past the window edges are handled without merging first.
pub fn first_fit_in_day(
    items: &[ScheduleItem],
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    duration_minutes: i64,
) -> Option<FoundSlot> {
    let mut sorted: Vec<&ScheduleItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.start);

    let mut cursor = window_start;
    for item in sorted {
        if item.end <= cursor {
            continue;
        }
        if item.start >= window_end {
            break;
        }
        if (item.start - cursor).num_minutes() >= duration_minutes {
            return Some(FoundSlot {
                start: cursor,
                end: cursor + Duration::minutes(duration_minutes),
            });
        }
        cursor = cursor.max(item.end);
        if cursor >= window_end {
            return None;
        }
    }

    if (window_end - cursor).num_minutes() >= duration_minutes {
        return Some(FoundSlot {
            start: cursor,
            end: cursor + Duration::minutes(duration_minutes),
        });
    }
    None
}

/// Greedy first-fit search across the 7-day window starting at the preferred
/// date. `fetch_day` supplies one technician's bookings for a given day.
/// Returns `None` when no day has a sufficient gap.
pub fn find_optimal_slot<F>(
    fetch_day: F,
    duration_minutes: i64,
    preferred_date: NaiveDate,
    preference: TimePreference,
) -> Option<FoundSlot>
where
    F: Fn(NaiveDate) -> Vec<ScheduleItem>,
{
    for offset in 0..SEARCH_WINDOW_DAYS {
        let date = preferred_date + Duration::days(offset);
        let (window_start, window_end) = preference_window(date, preference);
        let items = fetch_day(date);
        if let Some(slot) = first_fit_in_day(&items, window_start, window_end, duration_minutes) {
            return Some(slot);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::time_utils::{format_timestamp, parse_timestamp};
    use crate::schedule::types::{ScheduleStatus, ScheduleType};

    fn booking(start: &str, end: &str) -> ScheduleItem {
        ScheduleItem {
            id: format!("itm-{}", start),
            org_id: "org-1".to_string(),
            technician_id: "tech-1".to_string(),
            title: "Booked".to_string(),
            schedule_type: ScheduleType::Appointment,
            start: parse_timestamp(start).unwrap(),
            end: parse_timestamp(end).unwrap(),
            status: ScheduleStatus::Scheduled,
            client_id: None,
            ticket_id: None,
            location: None,
            notes: None,
            priority: None,
            estimated_minutes: None,
            travel_minutes: None,
            required_skills: vec![],
            equipment: vec![],
            participants: vec![],
            reminder_minutes: vec![],
            is_recurring: false,
            recurrence_pattern: None,
            parent_recurrence_id: None,
            recurrence_instance_date: None,
        }
    }

    fn date(value: &str) -> NaiveDate {
        crate::schedule::time_utils::parse_date(value).unwrap()
    }

    #[test]
    fn empty_day_yields_slot_at_window_start() {
        let slot = find_optimal_slot(|_| vec![], 30, date("2024-01-15"), TimePreference::Any)
            .expect("open day should have a slot");
        assert_eq!(format_timestamp(slot.start), "2024-01-15 09:00");
        assert_eq!(format_timestamp(slot.end), "2024-01-15 09:30");
    }

    #[test]
    fn first_gap_large_enough_wins() {
        // 09:00-09:30 booked, 10:00-12:00 booked. Gap 09:30-10:00 is 30 min;
        // first 60-min gap starts at 12:00.
        let items = vec![
            booking("2024-01-15 09:00", "2024-01-15 09:30"),
            booking("2024-01-15 10:00", "2024-01-15 12:00"),
        ];
        let (ws, we) = preference_window(date("2024-01-15"), TimePreference::Any);
        let slot = first_fit_in_day(&items, ws, we, 60).unwrap();
        assert_eq!(format_timestamp(slot.start), "2024-01-15 12:00");
        assert_eq!(format_timestamp(slot.end), "2024-01-15 13:00");

        // A 30-minute request fits the earlier gap instead.
        let slot = first_fit_in_day(&items, ws, we, 30).unwrap();
        assert_eq!(format_timestamp(slot.start), "2024-01-15 09:30");
    }

    #[test]
    fn overlapping_bookings_do_not_fake_a_gap() {
        let items = vec![
            booking("2024-01-15 09:00", "2024-01-15 11:30"),
            booking("2024-01-15 11:00", "2024-01-15 12:00"),
        ];
        let (ws, we) = preference_window(date("2024-01-15"), TimePreference::Any);
        let slot = first_fit_in_day(&items, ws, we, 60).unwrap();
        assert_eq!(format_timestamp(slot.start), "2024-01-15 12:00");
    }

    #[test]
    fn booking_spanning_window_edges_is_clamped_by_cursor() {
        // Booking starts before working hours and ends mid-morning.
        let items = vec![booking("2024-01-15 07:00", "2024-01-15 10:00")];
        let (ws, we) = preference_window(date("2024-01-15"), TimePreference::Any);
        let slot = first_fit_in_day(&items, ws, we, 60).unwrap();
        assert_eq!(format_timestamp(slot.start), "2024-01-15 10:00");
    }

    #[test]
    fn morning_and_afternoon_preferences_narrow_the_window() {
        let slot = find_optimal_slot(
            |_| vec![],
            60,
            date("2024-01-15"),
            TimePreference::Morning,
        )
        .unwrap();
        assert_eq!(format_timestamp(slot.start), "2024-01-15 09:00");

        let slot = find_optimal_slot(
            |_| vec![],
            60,
            date("2024-01-15"),
            TimePreference::Afternoon,
        )
        .unwrap();
        assert_eq!(format_timestamp(slot.start), "2024-01-15 13:00");

        // Morning window is 3 hours; a 4-hour request can never fit it.
        assert!(find_optimal_slot(
            |_| vec![],
            240,
            date("2024-01-15"),
            TimePreference::Morning,
        )
        .is_none());
    }

    #[test]
    fn search_rolls_to_the_first_open_day() {
        let busy_day = date("2024-01-15");
        let slot = find_optimal_slot(
            move |day| {
                if day == busy_day {
                    // Entire working window booked on the preferred day
                    vec![booking("2024-01-15 09:00", "2024-01-15 17:00")]
                } else {
                    vec![]
                }
            },
            30,
            busy_day,
            TimePreference::Any,
        )
        .unwrap();
        assert_eq!(format_timestamp(slot.start), "2024-01-16 09:00");
    }

    #[test]
    fn fully_booked_week_returns_none() {
        let slot = find_optimal_slot(
            |day| {
                let day_str = crate::schedule::time_utils::format_date(day);
                vec![booking(
                    &format!("{} 09:00", day_str),
                    &format!("{} 17:00", day_str),
                )]
            },
            30,
            date("2024-01-15"),
            TimePreference::Any,
        );
        assert!(slot.is_none());
    }
}

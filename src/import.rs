use std::path::Path;

use csv::Reader;

use crate::schedule::time_utils::parse_timestamp;
use crate::schedule::types::{Priority, ScheduleItem, ScheduleStatus, ScheduleType};
use crate::store::new_item_id;

fn parse_schedule_type(value: &str) -> ScheduleType {
    match value.trim().to_lowercase().as_str() {
        "ticket-visit" | "ticket visit" | "visit" => ScheduleType::TicketVisit,
        "meeting" => ScheduleType::Meeting,
        "time-off" | "time off" => ScheduleType::TimeOff,
        _ => ScheduleType::Appointment,
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value.trim().to_lowercase().as_str() {
        "low" => Some(Priority::Low),
        "normal" => Some(Priority::Normal),
        "high" => Some(Priority::High),
        "critical" => Some(Priority::Critical),
        _ => None,
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Loads schedule items from a CSV export.
///
/// Column positions are discovered from the header by keyword, so the file
/// can carry extra columns in any order. Rows with a missing technician,
/// title, or unparsable timestamps are skipped.
pub fn load_schedule_items<P: AsRef<Path>>(
    csv_path: P,
) -> Result<Vec<ScheduleItem>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(csv_path)?;
    let headers = reader.headers()?;

    let org_col = headers.iter().position(|h| h.contains("org")).unwrap_or(0);
    let technician_col = headers
        .iter()
        .position(|h| h.contains("technician"))
        .unwrap_or(1);
    let title_col = headers.iter().position(|h| h.contains("title")).unwrap_or(2);
    let type_col = headers.iter().position(|h| h.contains("type")).unwrap_or(3);
    let start_col = headers.iter().position(|h| h.contains("start")).unwrap_or(4);
    let end_col = headers.iter().position(|h| h.contains("end")).unwrap_or(5);
    let client_col = headers.iter().position(|h| h.contains("client")).unwrap_or(6);
    let location_col = headers
        .iter()
        .position(|h| h.contains("location"))
        .unwrap_or(7);
    let priority_col = headers
        .iter()
        .position(|h| h.contains("priority"))
        .unwrap_or(8);
    let notes_col = headers.iter().position(|h| h.contains("notes")).unwrap_or(9);

    let mut items = Vec::new();

    for result in reader.records() {
        let record = result?;

        let org_id = record.get(org_col).unwrap_or("").trim().to_string();
        let technician_id = record.get(technician_col).unwrap_or("").trim().to_string();
        let title = record.get(title_col).unwrap_or("").trim().to_string();

        if org_id.is_empty() || technician_id.is_empty() || title.is_empty() {
            continue;
        }

        let start = match parse_timestamp(record.get(start_col).unwrap_or("")) {
            Ok(ts) => ts,
            Err(_) => continue,
        };
        let end = match parse_timestamp(record.get(end_col).unwrap_or("")) {
            Ok(ts) => ts,
            Err(_) => continue,
        };
        if end <= start {
            continue;
        }

        items.push(ScheduleItem {
            id: new_item_id(),
            org_id,
            technician_id,
            title,
            schedule_type: parse_schedule_type(record.get(type_col).unwrap_or("")),
            start,
            end,
            status: ScheduleStatus::Scheduled,
            client_id: optional(record.get(client_col).unwrap_or("")),
            ticket_id: None,
            location: optional(record.get(location_col).unwrap_or("")),
            notes: optional(record.get(notes_col).unwrap_or("")),
            priority: parse_priority(record.get(priority_col).unwrap_or("")),
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
        });
    }

    Ok(items)
}

use std::fs::File;
use std::io::Write;

use chrono::NaiveDate;

use crate::schedule::time_utils::format_date;
use crate::schedule::types::{ScheduleItem, ScheduleStatus, ScheduleType};

pub fn type_label(schedule_type: ScheduleType) -> &'static str {
    match schedule_type {
        ScheduleType::TicketVisit => "ticket-visit",
        ScheduleType::Meeting => "meeting",
        ScheduleType::Appointment => "appointment",
        ScheduleType::TimeOff => "time-off",
    }
}

pub fn status_label(status: ScheduleStatus) -> &'static str {
    match status {
        ScheduleStatus::Scheduled => "scheduled",
        ScheduleStatus::InProgress => "in-progress",
        ScheduleStatus::Completed => "completed",
        ScheduleStatus::Cancelled => "cancelled",
    }
}

/// Formats one item as `HH:MM-HH:MM [type] title (client)` for reports
pub fn format_item_line(item: &ScheduleItem) -> String {
    let range = format!(
        "{}-{}",
        item.start.format("%H:%M"),
        item.end.format("%H:%M")
    );
    match &item.client_id {
        Some(client) => format!(
            "{} [{}] {} ({})",
            range,
            type_label(item.schedule_type),
            item.title,
            client
        ),
        None => format!("{} [{}] {}", range, type_label(item.schedule_type), item.title),
    }
}

/// Prints a technician's day schedule in a readable format
pub fn print_day_schedule(technician_id: &str, date: NaiveDate, items: &[ScheduleItem]) {
    println!("\n=== {} / {} ===", technician_id, format_date(date));
    if items.is_empty() {
        println!("  (no appointments)");
        return;
    }
    println!("Total appointments: {}", items.len());
    for item in items {
        println!("  {}", format_item_line(item));
    }
}

/// Writes a technician's day schedule to a text file, one item per line
pub fn write_schedule_to_file(
    technician_id: &str,
    date: NaiveDate,
    items: &[ScheduleItem],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} / {} **", technician_id, format_date(date))?;
    if items.is_empty() {
        writeln!(file, "(no appointments)")?;
    }
    for item in items {
        writeln!(file, "{}", format_item_line(item))?;
    }

    Ok(())
}

use csv::WriterBuilder;

use crate::display::{status_label, type_label};
use crate::schedule::time_utils::{format_date, format_timestamp};
use crate::schedule::types::ScheduleItem;

/// Renders a set of schedule items as CSV, one row per item.
/// Used by the day-export endpoint and usable against any item listing.
pub fn items_to_csv(items: &[ScheduleItem]) -> Result<String, Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_writer(vec![]);

    wtr.write_record([
        "id",
        "org_id",
        "technician_id",
        "title",
        "type",
        "start",
        "end",
        "status",
        "client_id",
        "ticket_id",
        "location",
        "recurring",
        "parent_recurrence_id",
        "instance_date",
    ])?;

    for item in items {
        wtr.write_record([
            item.id.as_str(),
            item.org_id.as_str(),
            item.technician_id.as_str(),
            item.title.as_str(),
            type_label(item.schedule_type),
            format_timestamp(item.start).as_str(),
            format_timestamp(item.end).as_str(),
            status_label(item.status),
            item.client_id.as_deref().unwrap_or(""),
            item.ticket_id.as_deref().unwrap_or(""),
            item.location.as_deref().unwrap_or(""),
            if item.is_recurring { "yes" } else { "no" },
            item.parent_recurrence_id.as_deref().unwrap_or(""),
            item.recurrence_instance_date
                .map(format_date)
                .unwrap_or_default()
                .as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

mod display;
mod error;
mod export;
mod import;
mod requests;
mod schedule;
mod store;
mod web;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use display::{print_day_schedule, write_schedule_to_file};
use import::load_schedule_items;
use schedule::time_utils::format_date;
use schedule::types::ScheduleItem;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        println!("Starting web server on port {}...", port);
        println!("Access the API at http://localhost:{}", port);

        web::start_server(port).await?;
        return Ok(());
    }

    // CLI mode: offline day-schedule report from a CSV export
    let csv_path = args.get(1).map(String::as_str).unwrap_or("data/schedule.csv");

    println!("Loading schedule items from {}...", csv_path);
    let items = load_schedule_items(csv_path)?;
    println!("Loaded {} schedule items", items.len());

    // Group into per-technician day schedules
    let mut days: BTreeMap<(String, NaiveDate), Vec<ScheduleItem>> = BTreeMap::new();
    for item in items {
        days.entry((item.technician_id.clone(), item.start.date()))
            .or_default()
            .push(item);
    }

    for day_items in days.values_mut() {
        day_items.sort_by_key(|i| i.start);
    }

    println!("\n=== Day Schedules ===");
    for ((technician_id, date), day_items) in &days {
        print_day_schedule(technician_id, *date, day_items);
    }

    println!("\n=== Writing Schedules to Files ===");
    for ((technician_id, date), day_items) in &days {
        let filename = format!("schedule_{}_{}.txt", technician_id, format_date(*date));
        write_schedule_to_file(technician_id, *date, day_items, &filename)?;
        println!("  - {}", filename);
    }

    Ok(())
}

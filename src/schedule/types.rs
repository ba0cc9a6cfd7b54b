use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::time_utils::datetime_format;

/// What kind of calendar entry this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleType {
    TicketVisit,
    Meeting,
    Appointment,
    TimeOff,
}

/// Lifecycle status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        ScheduleStatus::Scheduled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

/// How often a recurring parent repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Recurrence rule embedded in a recurring parent item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub recurrence_type: RecurrenceType,
    /// Every N periods (e.g. every 2 weeks)
    pub interval: u32,
    /// Stop generating once a computed start date falls after this
    pub end_date: Option<NaiveDate>,
    /// Hard cap on generated instances; non-positive means "use the default cap"
    pub occurrences: Option<i32>,
}

/// Time-of-day window for slot searching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimePreference {
    Morning,
    Afternoon,
    Any,
}

/// Which records a series update/delete touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateScope {
    ThisOnly,
    ThisAndFuture,
    AllInstances,
}

impl UpdateScope {
    /// Parses the scope selector strings used by the API (`this-only`, ...)
    pub fn from_param(value: &str) -> Option<UpdateScope> {
        match value {
            "this-only" => Some(UpdateScope::ThisOnly),
            "this-and-future" => Some(UpdateScope::ThisAndFuture),
            "all-instances" => Some(UpdateScope::AllInstances),
            _ => None,
        }
    }
}

/// A single calendar entry for a technician, scoped to an organization.
///
/// An item is exactly one of: a plain leaf, a recurring parent
/// (`is_recurring` with a pattern), or a generated instance
/// (`parent_recurrence_id` set, no pattern of its own).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    pub org_id: String,
    pub technician_id: String,
    pub title: String,
    pub schedule_type: ScheduleType,
    #[serde(with = "datetime_format")]
    pub start: NaiveDateTime,
    #[serde(with = "datetime_format")]
    pub end: NaiveDateTime,
    #[serde(default)]
    pub status: ScheduleStatus,
    pub client_id: Option<String>,
    pub ticket_id: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub estimated_minutes: Option<u32>,
    pub travel_minutes: Option<u32>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    /// Reminder lead times in minutes before start
    #[serde(default)]
    pub reminder_minutes: Vec<u32>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub parent_recurrence_id: Option<String>,
    pub recurrence_instance_date: Option<NaiveDate>,
}

impl ScheduleItem {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Partial field set applied by an update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleItemUpdate {
    pub title: Option<String>,
    pub technician_id: Option<String>,
    pub schedule_type: Option<ScheduleType>,
    #[serde(default, with = "datetime_format::option")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, with = "datetime_format::option")]
    pub end: Option<NaiveDateTime>,
    pub status: Option<ScheduleStatus>,
    pub client_id: Option<String>,
    pub ticket_id: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub estimated_minutes: Option<u32>,
    pub travel_minutes: Option<u32>,
    pub required_skills: Option<Vec<String>>,
    pub equipment: Option<Vec<String>>,
    pub participants: Option<Vec<String>>,
    pub reminder_minutes: Option<Vec<u32>>,
}

impl ScheduleItemUpdate {
    /// Applies the populated fields onto an existing item
    pub fn apply_to(&self, item: &mut ScheduleItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(technician_id) = &self.technician_id {
            item.technician_id = technician_id.clone();
        }
        if let Some(schedule_type) = self.schedule_type {
            item.schedule_type = schedule_type;
        }
        if let Some(start) = self.start {
            item.start = start;
        }
        if let Some(end) = self.end {
            item.end = end;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(client_id) = &self.client_id {
            item.client_id = Some(client_id.clone());
        }
        if let Some(ticket_id) = &self.ticket_id {
            item.ticket_id = Some(ticket_id.clone());
        }
        if let Some(location) = &self.location {
            item.location = Some(location.clone());
        }
        if let Some(notes) = &self.notes {
            item.notes = Some(notes.clone());
        }
        if let Some(priority) = self.priority {
            item.priority = Some(priority);
        }
        if let Some(estimated_minutes) = self.estimated_minutes {
            item.estimated_minutes = Some(estimated_minutes);
        }
        if let Some(travel_minutes) = self.travel_minutes {
            item.travel_minutes = Some(travel_minutes);
        }
        if let Some(required_skills) = &self.required_skills {
            item.required_skills = required_skills.clone();
        }
        if let Some(equipment) = &self.equipment {
            item.equipment = equipment.clone();
        }
        if let Some(participants) = &self.participants {
            item.participants = participants.clone();
        }
        if let Some(reminder_minutes) = &self.reminder_minutes {
            item.reminder_minutes = reminder_minutes.clone();
        }
    }
}

/// A free interval produced by the optimal-slot search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundSlot {
    #[serde(with = "datetime_format")]
    pub start: NaiveDateTime,
    #[serde(with = "datetime_format")]
    pub end: NaiveDateTime,
}

use serde::Deserialize;

use crate::schedule::time_utils::{parse_date, parse_timestamp};
use crate::schedule::types::{
    Priority, RecurrencePattern, RecurrenceType, ScheduleItem, ScheduleStatus, ScheduleType,
    TimePreference,
};
use crate::store::new_item_id;

/// Inbound payload for creating a schedule item. Timestamps arrive as
/// `yyyy-MM-dd HH:mm` strings and are parsed at this boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub org_id: String,
    pub technician_id: String,
    pub title: String,
    pub schedule_type: ScheduleType,
    pub start: String,
    pub end: String,
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
    #[serde(default)]
    pub reminder_minutes: Vec<u32>,
}

/// Recurrence rule as submitted alongside a recurring creation
#[derive(Debug, Clone, Deserialize)]
pub struct RecurrencePatternRequest {
    pub recurrence_type: RecurrenceType,
    pub interval: u32,
    pub end_date: Option<String>,
    pub occurrences: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecurringRequest {
    #[serde(flatten)]
    pub item: CreateItemRequest,
    pub pattern: RecurrencePatternRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConflictCheckRequest {
    pub org_id: String,
    pub technician_id: String,
    pub start: String,
    pub end: String,
    pub exclude_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotSearchRequest {
    pub org_id: String,
    pub technician_id: String,
    pub duration_minutes: i64,
    pub preferred_date: String,
    #[serde(default = "default_preference")]
    pub time_preference: TimePreference,
}

fn default_preference() -> TimePreference {
    TimePreference::Any
}

/// Validates and materializes a create request into a storable item.
/// The `end > start` invariant is enforced here so the engine itself
/// never sees a degenerate interval.
pub fn build_item(req: &CreateItemRequest) -> Result<ScheduleItem, String> {
    if req.org_id.trim().is_empty() {
        return Err("Organization id is required".to_string());
    }
    if req.technician_id.trim().is_empty() {
        return Err("Technician id is required".to_string());
    }
    if req.title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    let start = parse_timestamp(&req.start).map_err(|e| e.to_string())?;
    let end = parse_timestamp(&req.end).map_err(|e| e.to_string())?;
    if end <= start {
        return Err("End time must be after start time".to_string());
    }

    Ok(ScheduleItem {
        id: new_item_id(),
        org_id: req.org_id.trim().to_string(),
        technician_id: req.technician_id.trim().to_string(),
        title: req.title.trim().to_string(),
        schedule_type: req.schedule_type,
        start,
        end,
        status: ScheduleStatus::Scheduled,
        client_id: req.client_id.clone(),
        ticket_id: req.ticket_id.clone(),
        location: req.location.clone(),
        notes: req.notes.clone(),
        priority: req.priority,
        estimated_minutes: req.estimated_minutes,
        travel_minutes: req.travel_minutes,
        required_skills: req.required_skills.clone(),
        equipment: req.equipment.clone(),
        participants: req.participants.clone(),
        reminder_minutes: req.reminder_minutes.clone(),
        is_recurring: false,
        recurrence_pattern: None,
        parent_recurrence_id: None,
        recurrence_instance_date: None,
    })
}

/// Validates and materializes a recurrence pattern request
pub fn build_pattern(req: &RecurrencePatternRequest) -> Result<RecurrencePattern, String> {
    if req.interval == 0 {
        return Err("Recurrence interval must be at least 1".to_string());
    }
    let end_date = match &req.end_date {
        Some(raw) => Some(parse_date(raw).map_err(|e| e.to_string())?),
        None => None,
    };
    Ok(RecurrencePattern {
        recurrence_type: req.recurrence_type,
        interval: req.interval,
        end_date,
        occurrences: req.occurrences,
    })
}

/// Validates a slot-search request; duration must be positive
pub fn validate_slot_search(req: &SlotSearchRequest) -> Result<(), String> {
    if req.technician_id.trim().is_empty() {
        return Err("Technician id is required".to_string());
    }
    if req.duration_minutes <= 0 {
        return Err("Duration must be a positive number of minutes".to_string());
    }
    parse_date(&req.preferred_date).map_err(|e| e.to_string())?;
    Ok(())
}

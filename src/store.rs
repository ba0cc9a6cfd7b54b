use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::{distributions::Alphanumeric, Rng};

use crate::error::ScheduleError;
use crate::schedule::types::{ScheduleItem, ScheduleItemUpdate};

/// Generates a record id: `itm-` plus 12 random alphanumerics
pub fn new_item_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("itm-{}", suffix)
}

// In-memory document store for schedule items (in production, use a database).
// Every read and write is scoped by organization id.
pub struct ScheduleStore {
    items: Mutex<HashMap<String, ScheduleItem>>,
}

impl ScheduleStore {
    pub fn new() -> ScheduleStore {
        ScheduleStore {
            items: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, item: ScheduleItem) {
        let mut items = self.items.lock().unwrap();
        items.insert(item.id.clone(), item);
    }

    /// Inserts a recurring parent and its generated instances under a single
    /// lock acquisition, so no reader sees the parent without its series.
    pub fn insert_series(&self, parent: ScheduleItem, instances: Vec<ScheduleItem>) {
        let mut items = self.items.lock().unwrap();
        items.insert(parent.id.clone(), parent);
        for instance in instances {
            items.insert(instance.id.clone(), instance);
        }
    }

    pub fn get(&self, org_id: &str, id: &str) -> Option<ScheduleItem> {
        let items = self.items.lock().unwrap();
        items.get(id).filter(|i| i.org_id == org_id).cloned()
    }

    /// Applies the same partial update to every listed id; returns how many
    /// records were actually touched. Every resulting interval is checked
    /// before anything is written, so an update that would leave any target
    /// ending at or before its start is rejected whole.
    pub fn update_many(
        &self,
        org_id: &str,
        ids: &[String],
        update: &ScheduleItemUpdate,
    ) -> Result<usize, ScheduleError> {
        let mut items = self.items.lock().unwrap();
        for id in ids {
            if let Some(item) = items.get(id) {
                if item.org_id == org_id {
                    let start = update.start.unwrap_or(item.start);
                    let end = update.end.unwrap_or(item.end);
                    if end <= start {
                        return Err(ScheduleError::InvalidInput(format!(
                            "Update would leave {} ending at or before its start",
                            id
                        )));
                    }
                }
            }
        }
        let mut affected = 0;
        for id in ids {
            if let Some(item) = items.get_mut(id) {
                if item.org_id == org_id {
                    update.apply_to(item);
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    pub fn delete_many(&self, org_id: &str, ids: &[String]) -> usize {
        let mut items = self.items.lock().unwrap();
        let mut affected = 0;
        for id in ids {
            let matches = items
                .get(id)
                .map(|i| i.org_id == org_id)
                .unwrap_or(false);
            if matches {
                items.remove(id);
                affected += 1;
            }
        }
        affected
    }

    /// All instances pointing back at a recurring parent, sorted by start
    pub fn instances_of(&self, org_id: &str, parent_id: &str) -> Vec<ScheduleItem> {
        let items = self.items.lock().unwrap();
        let mut found: Vec<ScheduleItem> = items
            .values()
            .filter(|i| i.org_id == org_id && i.parent_recurrence_id.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        found.sort_by_key(|i| i.start);
        found
    }

    /// One technician's items, sorted by start
    pub fn for_technician(&self, org_id: &str, technician_id: &str) -> Vec<ScheduleItem> {
        let items = self.items.lock().unwrap();
        let mut found: Vec<ScheduleItem> = items
            .values()
            .filter(|i| i.org_id == org_id && i.technician_id == technician_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.start);
        found
    }

    /// One technician's items touching the given calendar date, sorted by
    /// start. A booking that runs past midnight shows up on both days it
    /// covers.
    pub fn for_technician_on(
        &self,
        org_id: &str,
        technician_id: &str,
        date: NaiveDate,
    ) -> Vec<ScheduleItem> {
        let day_start = NaiveDateTime::new(date, chrono::NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);
        let items = self.items.lock().unwrap();
        let mut found: Vec<ScheduleItem> = items
            .values()
            .filter(|i| {
                i.org_id == org_id
                    && i.technician_id == technician_id
                    && i.start < day_end
                    && i.end > day_start
            })
            .cloned()
            .collect();
        found.sort_by_key(|i| i.start);
        found
    }

    /// Items in a half-open range, optionally narrowed to one technician
    pub fn in_range(
        &self,
        org_id: &str,
        technician_id: Option<&str>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Vec<ScheduleItem> {
        let items = self.items.lock().unwrap();
        let mut found: Vec<ScheduleItem> = items
            .values()
            .filter(|i| i.org_id == org_id)
            .filter(|i| technician_id.map_or(true, |t| i.technician_id == t))
            .filter(|i| i.start >= from && i.start < to)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.start);
        found
    }

    /// Everything belonging to one organization, sorted by start
    pub fn all_for_org(&self, org_id: &str) -> Vec<ScheduleItem> {
        let items = self.items.lock().unwrap();
        let mut found: Vec<ScheduleItem> = items
            .values()
            .filter(|i| i.org_id == org_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.start);
        found
    }
}

impl Default for ScheduleStore {
    fn default() -> Self {
        ScheduleStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::time_utils::{parse_date, parse_timestamp};
    use crate::schedule::types::{ScheduleStatus, ScheduleType};

    fn item(id: &str, org: &str, tech: &str, start: &str, end: &str) -> ScheduleItem {
        ScheduleItem {
            id: id.to_string(),
            org_id: org.to_string(),
            technician_id: tech.to_string(),
            title: "Visit".to_string(),
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

    #[test]
    fn reads_are_scoped_by_organization() {
        let store = ScheduleStore::new();
        store.insert(item("a", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));

        assert!(store.get("org-1", "a").is_some());
        assert!(store.get("org-2", "a").is_none());
        assert!(store.for_technician("org-2", "tech-1").is_empty());
    }

    #[test]
    fn series_insert_stores_parent_and_instances_together() {
        let store = ScheduleStore::new();
        let mut parent = item("p", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00");
        parent.is_recurring = true;
        let mut inst = item("i1", "org-1", "tech-1", "2024-01-08 09:00", "2024-01-08 10:00");
        inst.parent_recurrence_id = Some("p".to_string());

        store.insert_series(parent, vec![inst]);

        assert!(store.get("org-1", "p").is_some());
        let instances = store.instances_of("org-1", "p");
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].id, "i1");
    }

    #[test]
    fn delete_many_reports_affected_count_and_ignores_other_orgs() {
        let store = ScheduleStore::new();
        store.insert(item("a", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));
        store.insert(item("b", "org-2", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));

        let ids = vec!["a".to_string(), "b".to_string(), "missing".to_string()];
        assert_eq!(store.delete_many("org-1", &ids), 1);
        assert!(store.get("org-1", "a").is_none());
        assert!(store.get("org-2", "b").is_some());
    }

    #[test]
    fn update_many_applies_partial_fields() {
        let store = ScheduleStore::new();
        store.insert(item("a", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));

        let update = ScheduleItemUpdate {
            title: Some("Renamed".to_string()),
            notes: Some("bring spare disks".to_string()),
            ..Default::default()
        };
        assert_eq!(
            store.update_many("org-1", &["a".to_string()], &update).unwrap(),
            1
        );

        let stored = store.get("org-1", "a").unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.notes.as_deref(), Some("bring spare disks"));
        // Unspecified fields untouched
        assert_eq!(stored.technician_id, "tech-1");
    }

    #[test]
    fn update_rejects_interval_that_ends_at_or_before_its_start() {
        let store = ScheduleStore::new();
        store.insert(item("a", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));

        let update = ScheduleItemUpdate {
            end: Some(parse_timestamp("2024-01-01 08:00").unwrap()),
            ..Default::default()
        };
        assert!(store.update_many("org-1", &["a".to_string()], &update).is_err());

        // The stored record keeps its valid interval
        let stored = store.get("org-1", "a").unwrap();
        assert_eq!(stored.start, parse_timestamp("2024-01-01 09:00").unwrap());
        assert_eq!(stored.end, parse_timestamp("2024-01-01 10:00").unwrap());
    }

    #[test]
    fn rejected_update_touches_no_target_in_the_batch() {
        let store = ScheduleStore::new();
        store.insert(item("a", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));
        store.insert(item("b", "org-1", "tech-1", "2024-01-08 09:00", "2024-01-08 10:00"));

        // Valid for "a" alone, but it would invert "b" a week later
        let update = ScheduleItemUpdate {
            title: Some("Renamed".to_string()),
            end: Some(parse_timestamp("2024-01-01 11:00").unwrap()),
            ..Default::default()
        };
        let ids = vec!["a".to_string(), "b".to_string()];
        assert!(store.update_many("org-1", &ids, &update).is_err());

        assert_eq!(store.get("org-1", "a").unwrap().title, "Visit");
        assert_eq!(store.get("org-1", "b").unwrap().title, "Visit");
    }

    #[test]
    fn day_query_filters_by_date_and_sorts() {
        let store = ScheduleStore::new();
        store.insert(item("late", "org-1", "tech-1", "2024-01-01 14:00", "2024-01-01 15:00"));
        store.insert(item("early", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));
        store.insert(item("other-day", "org-1", "tech-1", "2024-01-02 09:00", "2024-01-02 10:00"));
        store.insert(item("other-tech", "org-1", "tech-2", "2024-01-01 09:00", "2024-01-01 10:00"));

        let day = store.for_technician_on("org-1", "tech-1", parse_date("2024-01-01").unwrap());
        let ids: Vec<&str> = day.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["early", "late"]);
    }

    #[test]
    fn day_query_includes_bookings_spanning_midnight() {
        let store = ScheduleStore::new();
        store.insert(item("overnight", "org-1", "tech-1", "2024-01-01 22:00", "2024-01-02 10:00"));

        let first = store.for_technician_on("org-1", "tech-1", parse_date("2024-01-01").unwrap());
        let second = store.for_technician_on("org-1", "tech-1", parse_date("2024-01-02").unwrap());
        let third = store.for_technician_on("org-1", "tech-1", parse_date("2024-01-03").unwrap());
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert!(third.is_empty());
    }

    #[test]
    fn range_query_is_half_open() {
        let store = ScheduleStore::new();
        store.insert(item("a", "org-1", "tech-1", "2024-01-01 09:00", "2024-01-01 10:00"));
        store.insert(item("b", "org-1", "tech-1", "2024-01-02 09:00", "2024-01-02 10:00"));

        let found = store.in_range(
            "org-1",
            None,
            parse_timestamp("2024-01-01 00:00").unwrap(),
            parse_timestamp("2024-01-02 09:00").unwrap(),
        );
        let ids: Vec<&str> = found.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a"]);
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = new_item_id();
        let b = new_item_id();
        assert!(a.starts_with("itm-"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }
}

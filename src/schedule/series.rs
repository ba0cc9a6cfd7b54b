use chrono::NaiveDateTime;

use super::types::{ScheduleItem, UpdateScope};

/// Resolves which record ids a series-scoped update/delete touches.
///
/// `addressed` is the record named in the request (normally the recurring
/// parent) and `instances` are the members of its series. The addressed
/// record is always included. For `this-and-future` an instance is included
/// when its own start is at or after `now`, so repeat calls at different
/// wall-clock times affect different sets.
pub fn resolve_targets(
    addressed: &ScheduleItem,
    instances: &[ScheduleItem],
    scope: UpdateScope,
    now: NaiveDateTime,
) -> Vec<String> {
    let mut targets = vec![addressed.id.clone()];
    match scope {
        UpdateScope::ThisOnly => {}
        UpdateScope::AllInstances => {
            targets.extend(instances.iter().map(|i| i.id.clone()));
        }
        UpdateScope::ThisAndFuture => {
            targets.extend(
                instances
                    .iter()
                    .filter(|i| i.start >= now)
                    .map(|i| i.id.clone()),
            );
        }
    }
    targets
}

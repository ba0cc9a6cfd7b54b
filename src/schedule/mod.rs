pub mod conflicts;
pub mod recurrence;
pub mod series;
pub mod slots;
pub mod time_utils;
pub mod types;

pub use conflicts::find_conflicts;
pub use recurrence::generate_instances;
pub use series::resolve_targets;
pub use slots::find_optimal_slot;
pub use types::{RecurrencePattern, ScheduleItem, UpdateScope};

pub mod assignment;
pub mod subject;
pub mod time;

use chrono::Utc;
use uuid::Uuid;

pub use assignment::{Assignment, NewAssignmentRequest, Priority};
pub use subject::{NewSubjectRequest, Subject};
pub use time::{ClockTime, Day};

/// Millisecond timestamp followed by a 9 character lowercase alphanumeric
/// suffix, e.g. `1735689600000k3j9x0q2b`.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &suffix[..9])
}

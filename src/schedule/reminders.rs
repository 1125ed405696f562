use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{subjects_for_day, today_weekday, upcoming_assignments, DEFAULT_UPCOMING_LIMIT};
use crate::models::{Assignment, Subject};

const CLASS_LEAD_MINUTES: i64 = 15;
const ASSIGNMENT_LEAD_DAYS: i64 = 1;
const MAX_CLASS_REMINDERS: usize = 3;
const MAX_ASSIGNMENT_REMINDERS: usize = 2;

/// Which reminders the student wants. Nothing is delivered; these only shape
/// the reminder list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub class_reminders: bool,
    pub assignment_reminders: bool,
    pub daily_schedule: bool,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            class_reminders: true,
            assignment_reminders: true,
            daily_schedule: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Lecture,
    Assignment,
    Digest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub kind: ReminderKind,
    pub title: String,
    /// Human readable detail, e.g. `Starts at 09:00`.
    pub detail: String,
    pub notify_at: NaiveDateTime,
}

/// Today's first classes and the next assignments due, in display order.
pub fn upcoming_reminders(
    subjects: &[Subject],
    assignments: &[Assignment],
    settings: &ReminderSettings,
    today: NaiveDate,
) -> Vec<Reminder> {
    let mut reminders = Vec::new();
    let todays = subjects_for_day(subjects, today_weekday(today));

    if settings.daily_schedule {
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN);
        reminders.push(Reminder {
            kind: ReminderKind::Digest,
            title: "Daily schedule".to_string(),
            detail: format!("{} classes today", todays.len()),
            notify_at: today.and_time(eight),
        });
    }

    if settings.class_reminders {
        reminders.extend(todays.iter().take(MAX_CLASS_REMINDERS).map(|s| Reminder {
            kind: ReminderKind::Lecture,
            title: s.name.clone(),
            detail: format!("Starts at {}", s.start_time),
            notify_at: today.and_time(s.start_time.to_naive()) - Duration::minutes(CLASS_LEAD_MINUTES),
        }));
    }

    if settings.assignment_reminders {
        reminders.extend(
            upcoming_assignments(assignments, today, DEFAULT_UPCOMING_LIMIT)
                .into_iter()
                .take(MAX_ASSIGNMENT_REMINDERS)
                .map(|a| Reminder {
                    kind: ReminderKind::Assignment,
                    detail: format!("Due {}", a.due_date.format("%b %-d, %Y")),
                    notify_at: (a.due_date - Duration::days(ASSIGNMENT_LEAD_DAYS))
                        .and_time(NaiveTime::MIN),
                    title: a.title,
                }),
        );
    }

    reminders
}

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::{assignments_for_date, subjects_for_day, today_weekday};
use crate::error::AppError;
use crate::models::{Assignment, ClockTime, Day, Subject};

/// First hour shown on the daily grid.
pub const FIRST_SLOT_HOUR: u8 = 8;
pub const SLOT_COUNT: u8 = 14;

/// 12-hour display form, e.g. `9:05 AM`.
pub fn format_time(time: ClockTime) -> String {
    let hour = time.hour();
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display, time.minute(), suffix)
}

/// `date` moved by `days`, or a bad request when that leaves chrono's range.
fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate, AppError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| AppError::BadRequest(format!("date {} is out of range", date)))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> Result<NaiveDate, AppError> {
    shift(date, -i64::from(date.weekday().num_days_from_monday()))
}

pub fn week_days(date: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
    let start = week_start(date)?;
    (0..7).map(|i| shift(start, i)).collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSubject {
    #[serde(flatten)]
    pub subject: Subject,
    pub display_time: String,
    /// Hours from the top of the grid.
    pub offset_hours: f64,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time: ClockTime,
    pub label: String,
    pub subjects: Vec<PlacedSubject>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyView {
    pub date: NaiveDate,
    pub day: Day,
    pub previous: NaiveDate,
    pub next: NaiveDate,
    pub slots: Vec<TimeSlot>,
    /// Subjects starting outside the hourly grid.
    pub unslotted: Vec<Subject>,
    pub assignments: Vec<Assignment>,
}

fn place(subject: &Subject) -> PlacedSubject {
    let grid_start = i64::from(FIRST_SLOT_HOUR) * 60;
    let start = i64::from(subject.start_time.minutes_since_midnight());
    let end = i64::from(subject.end_time.minutes_since_midnight());
    PlacedSubject {
        display_time: format!(
            "{} - {}",
            format_time(subject.start_time),
            format_time(subject.end_time)
        ),
        offset_hours: (start - grid_start) as f64 / 60.0,
        duration_hours: (end - start) as f64 / 60.0,
        subject: subject.clone(),
    }
}

pub fn daily_view(
    subjects: &[Subject],
    assignments: &[Assignment],
    date: NaiveDate,
) -> Result<DailyView, AppError> {
    let previous = shift(date, -1)?;
    let next = shift(date, 1)?;
    let day = today_weekday(date);
    let day_subjects = subjects_for_day(subjects, day);
    let last_slot_hour = FIRST_SLOT_HOUR + SLOT_COUNT - 1;

    let slots = (FIRST_SLOT_HOUR..=last_slot_hour)
        .filter_map(|hour| ClockTime::new(hour, 0))
        .map(|time| TimeSlot {
            time,
            label: format_time(time),
            subjects: day_subjects
                .iter()
                .filter(|s| s.start_time.hour() == time.hour())
                .map(place)
                .collect(),
        })
        .collect();

    let unslotted = day_subjects
        .iter()
        .filter(|s| !(FIRST_SLOT_HOUR..=last_slot_hour).contains(&s.start_time.hour()))
        .cloned()
        .collect();

    let assignments = assignments_for_date(assignments, date)
        .into_iter()
        .filter(|a| !a.completed)
        .collect();

    Ok(DailyView {
        date,
        day,
        previous,
        next,
        slots,
        unslotted,
        assignments,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayColumn {
    pub date: NaiveDate,
    pub day: Day,
    pub is_today: bool,
    pub subjects: Vec<Subject>,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekStatistics {
    pub total_classes: usize,
    pub total_assignments: usize,
    pub completed_assignments: usize,
    pub pending_assignments: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyView {
    pub week_of: NaiveDate,
    pub previous_week: NaiveDate,
    pub next_week: NaiveDate,
    pub days: Vec<DayColumn>,
    pub stats: WeekStatistics,
}

/// Monday-first week containing `date`. Completed assignments stay visible.
pub fn weekly_view(
    subjects: &[Subject],
    assignments: &[Assignment],
    date: NaiveDate,
    today: NaiveDate,
) -> Result<WeeklyView, AppError> {
    let start = week_start(date)?;
    let previous_week = shift(start, -7)?;
    let next_week = shift(start, 7)?;

    let days = week_days(date)?
        .into_iter()
        .map(|d| DayColumn {
            date: d,
            day: today_weekday(d),
            is_today: d == today,
            subjects: subjects_for_day(subjects, today_weekday(d)),
            assignments: assignments_for_date(assignments, d),
        })
        .collect();

    let completed = assignments.iter().filter(|a| a.completed).count();

    Ok(WeeklyView {
        week_of: start,
        previous_week,
        next_week,
        days,
        stats: WeekStatistics {
            total_classes: subjects.len(),
            total_assignments: assignments.len(),
            completed_assignments: completed,
            pending_assignments: assignments.len() - completed,
        },
    })
}

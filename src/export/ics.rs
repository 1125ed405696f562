use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::models::{Day, Subject};

const PRODID: &str = "-//Student Schedule Manager//EN";

/// First date on or after `from` that falls on `day`.
pub fn next_occurrence(day: Day, from: NaiveDate) -> NaiveDate {
    let target = i64::from(day.to_weekday().num_days_from_monday());
    let current = i64::from(from.weekday().num_days_from_monday());
    from + Duration::days((target - current + 7) % 7)
}

fn format_local(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// A VCALENDAR with one weekly recurring VEVENT per subject, anchored on the
/// subject's next meeting. Times are floating local time.
pub fn to_ics(subjects: &[Subject], today: NaiveDate) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
    ];

    for s in subjects {
        let date = next_occurrence(s.day, today);
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@student-schedule", s.id));
        lines.push(format!("DTSTART:{}", format_local(date.and_time(s.start_time.to_naive()))));
        lines.push(format!("DTEND:{}", format_local(date.and_time(s.end_time.to_naive()))));
        lines.push(format!("SUMMARY:{}", escape_text(&s.name)));
        lines.push(format!("DESCRIPTION:Instructor: {}", escape_text(&s.instructor)));
        lines.push(format!("LOCATION:{}", escape_text(&s.room)));
        lines.push(format!("RRULE:FREQ=WEEKLY;BYDAY={}", s.day.ics_code()));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

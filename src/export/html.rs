use chrono::NaiveDate;

use crate::models::{Assignment, Subject};

const STYLE: &str = r#"body { font-family: Arial, sans-serif; margin: 20px; }
        .header { text-align: center; margin-bottom: 30px; }
        .schedule-table { width: 100%; border-collapse: collapse; margin-bottom: 30px; }
        .schedule-table th, .schedule-table td { border: 1px solid #ddd; padding: 12px; text-align: left; }
        .schedule-table th { background-color: #f2f2f2; }
        .assignment-item { margin-bottom: 15px; padding: 10px; border-left: 4px solid #007bff; }
        .priority-high { border-left-color: #dc3545; }
        .priority-medium { border-left-color: #ffc107; }
        .priority-low { border-left-color: #28a745; }"#;

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Printable schedule document: weekly table plus open assignments.
pub fn to_html(subjects: &[Subject], assignments: &[Assignment], today: NaiveDate) -> String {
    let mut rows = String::new();
    for s in subjects {
        rows.push_str(&format!(
            "        <tr><td>{}</td><td>{}</td><td>{} - {}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&s.name),
            s.day,
            s.start_time,
            s.end_time,
            html_escape(&s.room),
            html_escape(&s.instructor),
        ));
    }

    let mut items = String::new();
    for a in assignments.iter().filter(|a| !a.completed) {
        items.push_str(&format!(
            r#"    <div class="assignment-item priority-{priority}">
        <h3>{title}</h3>
        <p><strong>Subject:</strong> {subject}</p>
        <p><strong>Due Date:</strong> {due}</p>
        <p><strong>Priority:</strong> {priority}</p>
        <p>{description}</p>
    </div>
"#,
            priority = a.priority.as_str(),
            title = html_escape(&a.title),
            subject = html_escape(&a.subject),
            due = a.due_date.format("%B %-d, %Y"),
            description = html_escape(&a.description),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>My Schedule</title>
    <style>
        {style}
    </style>
</head>
<body>
    <div class="header">
        <h1>My Class Schedule</h1>
        <p>Generated on {generated}</p>
    </div>
    <h2>Weekly Schedule</h2>
    <table class="schedule-table">
        <thead>
            <tr><th>Subject</th><th>Day</th><th>Time</th><th>Room</th><th>Instructor</th></tr>
        </thead>
        <tbody>
{rows}        </tbody>
    </table>
    <div class="assignments">
    <h2>Upcoming Assignments</h2>
{items}    </div>
</body>
</html>
"#,
        style = STYLE,
        generated = today.format("%B %-d, %Y"),
        rows = rows,
        items = items,
    )
}

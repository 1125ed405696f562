use crate::models::Subject;

const HEADERS: [&str; 6] = ["Subject", "Day", "Start Time", "End Time", "Room", "Instructor"];

/// One row per subject under a fixed header. Rows are `\n` separated.
pub fn subjects_to_csv(subjects: &[Subject]) -> String {
    let mut lines = vec![HEADERS.join(",")];
    for s in subjects {
        let row = [
            s.name.clone(),
            s.day.to_string(),
            s.start_time.to_string(),
            s.end_time.to_string(),
            s.room.clone(),
            s.instructor.clone(),
        ];
        lines.push(row.iter().map(|f| escape_field(f)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;
    use crate::schedule::fixtures::subject;

    #[test]
    fn writes_header_and_rows() {
        let subjects = vec![subject("1", "Calculus", Day::Monday, "09:00", "10:00")];
        let csv = subjects_to_csv(&subjects);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Subject,Day,Start Time,End Time,Room,Instructor");
        assert_eq!(lines[1], "Calculus,Monday,09:00,10:00,Room 1,Prof. Smith");
    }

    #[test]
    fn quotes_fields_with_separators() {
        let mut s = subject("1", "Art, History", Day::Friday, "09:00", "10:00");
        s.instructor = "Dr. \"Doc\" Brown".to_string();
        let csv = subjects_to_csv(&[s]);
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "\"Art, History\",Friday,09:00,10:00,Room 1,\"Dr. \"\"Doc\"\" Brown\""
        );
    }

    #[test]
    fn empty_schedule_is_header_only() {
        assert_eq!(subjects_to_csv(&[]).lines().count(), 1);
    }
}

use serde::{Deserialize, Serialize};

use super::time::{ClockTime, Day};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub day: Day,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub color: String,
}

impl Subject {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_fields(&self.name, self.start_time, self.end_time)
    }

    /// Organised document path kept alongside the stored document.
    pub fn doc_path(&self) -> String {
        format!(
            "form/{}/{}/{}/{}/{}",
            self.id, self.name, self.day, self.start_time, self.instructor
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubjectRequest {
    pub name: String,
    pub day: Day,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub color: String,
}

impl NewSubjectRequest {
    pub fn into_subject(self, id: String) -> Subject {
        Subject {
            id,
            name: self.name,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            room: self.room,
            instructor: self.instructor,
            color: self.color,
        }
    }
}

fn validate_fields(name: &str, start: ClockTime, end: ClockTime) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("subject name must not be empty".to_string()));
    }
    if start >= end {
        return Err(AppError::BadRequest(format!(
            "start time {} must be before end time {}",
            start, end
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculus() -> Subject {
        NewSubjectRequest {
            name: "Calculus".to_string(),
            day: Day::Monday,
            start_time: "09:00".parse().unwrap(),
            end_time: "10:00".parse().unwrap(),
            room: "B12".to_string(),
            instructor: "Dr. Lee".to_string(),
            color: "blue".to_string(),
        }
        .into_subject("s1".to_string())
    }

    #[test]
    fn validate_rejects_inverted_times() {
        let mut subject = calculus();
        assert!(subject.validate().is_ok());

        subject.end_time = "09:00".parse().unwrap();
        assert!(matches!(subject.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn validate_rejects_blank_name() {
        let mut subject = calculus();
        subject.name = "  ".to_string();
        assert!(subject.validate().is_err());
    }

    #[test]
    fn serializes_camel_case_fields() {
        let json = serde_json::to_value(calculus()).unwrap();
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "10:00");
        assert_eq!(json["day"], "Monday");
    }

    #[test]
    fn doc_path_contains_identifying_fields() {
        assert_eq!(calculus().doc_path(), "form/s1/Calculus/Monday/09:00/Dr. Lee");
    }
}

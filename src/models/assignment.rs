use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    /// Free text. Not checked against any stored subject.
    #[serde(default)]
    pub subject: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
}

impl Assignment {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::BadRequest(
                "assignment title must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn doc_path(&self) -> String {
        format!(
            "form/{}/{}/{}/{}",
            self.id, self.title, self.subject, self.due_date
        )
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date < today
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub subject: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
}

impl NewAssignmentRequest {
    pub fn into_assignment(self, id: String) -> Assignment {
        Assignment {
            id,
            title: self.title,
            subject: self.subject,
            due_date: self.due_date,
            description: self.description,
            completed: self.completed,
            priority: self.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let assignment: Assignment = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "title": "Essay",
            "dueDate": "2025-01-03"
        }))
        .unwrap();

        assert_eq!(assignment.due_date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
        assert_eq!(assignment.priority, Priority::Medium);
        assert!(!assignment.completed);
        assert!(assignment.subject.is_empty());
    }

    #[test]
    fn overdue_requires_incomplete_and_past_due() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let mut assignment = NewAssignmentRequest {
            title: "Lab".to_string(),
            subject: "Chem".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: String::new(),
            completed: false,
            priority: Priority::High,
        }
        .into_assignment("a1".to_string());

        assert!(assignment.is_overdue(today));
        assignment.completed = true;
        assert!(!assignment.is_overdue(today));
        assignment.completed = false;
        assignment.due_date = today;
        assert!(!assignment.is_overdue(today));
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), "high");
    }
}

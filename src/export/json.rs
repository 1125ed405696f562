use std::collections::HashSet;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Assignment, Subject};

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBackup {
    pub subjects: Vec<Subject>,
    pub assignments: Vec<Assignment>,
    pub export_date: String,
    pub version: String,
}

pub fn to_json(subjects: &[Subject], assignments: &[Assignment], now: DateTime<Local>) -> Result<String, AppError> {
    let backup = ScheduleBackup {
        subjects: subjects.to_vec(),
        assignments: assignments.to_vec(),
        export_date: now
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        version: EXPORT_VERSION.to_string(),
    };
    Ok(serde_json::to_string_pretty(&backup)?)
}

/// Parses a backup produced by [`to_json`].
pub fn from_json(input: &str) -> Result<ScheduleBackup, AppError> {
    let backup: ScheduleBackup = serde_json::from_str(input)
        .map_err(|e| AppError::BadRequest(format!("invalid schedule backup: {}", e)))?;
    backup.validate()?;
    Ok(backup)
}

impl ScheduleBackup {
    /// Every entity must be valid and ids must be unique per collection.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut subject_ids = HashSet::new();
        for s in &self.subjects {
            s.validate()?;
            if !subject_ids.insert(s.id.as_str()) {
                return Err(AppError::BadRequest(format!("duplicate subject id {}", s.id)));
            }
        }
        let mut assignment_ids = HashSet::new();
        for a in &self.assignments {
            a.validate()?;
            if !assignment_ids.insert(a.id.as_str()) {
                return Err(AppError::BadRequest(format!("duplicate assignment id {}", a.id)));
            }
        }
        Ok(())
    }
}

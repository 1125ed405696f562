//! Text exports of the schedule. Every format is hand assembled.

pub mod csv;
pub mod html;
pub mod ics;
pub mod json;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::error::AppError;
use crate::models::{Assignment, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Ics,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Ics => "ics",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Ics => "text/calendar",
            ExportFormat::Html => "text/html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "ics" | "ical" => Ok(ExportFormat::Ics),
            "html" | "pdf" => Ok(ExportFormat::Html),
            other => Err(AppError::BadRequest(format!("unknown export format: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

pub fn export(
    format: ExportFormat,
    subjects: &[Subject],
    assignments: &[Assignment],
    now: DateTime<Local>,
) -> Result<ExportFile, AppError> {
    let today = now.date_naive();
    let content = match format {
        ExportFormat::Csv => csv::subjects_to_csv(subjects),
        ExportFormat::Json => json::to_json(subjects, assignments, now)?,
        ExportFormat::Ics => ics::to_ics(subjects, today),
        ExportFormat::Html => html::to_html(subjects, assignments, today),
    };

    Ok(ExportFile {
        filename: format!("schedule-{}.{}", today.format("%Y-%m-%d"), format.extension()),
        mime_type: format.mime_type(),
        content,
    })
}

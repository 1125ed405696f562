//! Pure derivations over the subject and assignment lists.
//!
//! Nothing here is cached: callers hand in the full lists and the current date
//! on every request.

pub mod calendar;
pub mod reminders;

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Assignment, Day, Subject};

pub const DEFAULT_UPCOMING_LIMIT: usize = 5;
const SUGGESTION_LIMIT: usize = 5;

/// Subjects meeting on `day`, earliest start first. Ties keep list order.
pub fn subjects_for_day(subjects: &[Subject], day: Day) -> Vec<Subject> {
    let mut matching: Vec<Subject> = subjects.iter().filter(|s| s.day == day).cloned().collect();
    matching.sort_by_key(|s| s.start_time);
    matching
}

/// Incomplete assignments due today or later, soonest first.
pub fn upcoming_assignments(assignments: &[Assignment], today: NaiveDate, limit: usize) -> Vec<Assignment> {
    let mut upcoming: Vec<Assignment> = assignments
        .iter()
        .filter(|a| !a.completed && a.due_date >= today)
        .cloned()
        .collect();
    upcoming.sort_by_key(|a| a.due_date);
    upcoming.truncate(limit);
    upcoming
}

pub fn assignments_for_date(assignments: &[Assignment], date: NaiveDate) -> Vec<Assignment> {
    let key = date_key(date);
    assignments
        .iter()
        .filter(|a| date_key(a.due_date) == key)
        .cloned()
        .collect()
}

/// `YYYY-MM-DD`
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today_weekday(today: NaiveDate) -> Day {
    Day::from(today.weekday())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Completed,
    Overdue,
}

pub fn assignment_status(assignment: &Assignment, today: NaiveDate) -> AssignmentStatus {
    if assignment.completed {
        AssignmentStatus::Completed
    } else if assignment.due_date < today {
        AssignmentStatus::Overdue
    } else {
        AssignmentStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

pub fn filter_assignments(assignments: &[Assignment], filter: AssignmentFilter, today: NaiveDate) -> Vec<Assignment> {
    assignments
        .iter()
        .filter(|a| match filter {
            AssignmentFilter::All => true,
            AssignmentFilter::Pending => assignment_status(a, today) == AssignmentStatus::Pending,
            AssignmentFilter::Completed => a.completed,
            AssignmentFilter::Overdue => assignment_status(a, today) == AssignmentStatus::Overdue,
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatistics {
    pub total: usize,
    pub completed: usize,
    /// Incomplete and due today or later.
    pub pending: usize,
    pub overdue: usize,
    /// Percentage of completed assignments, 0 when there are none.
    pub completion_rate: f64,
}

impl CompletionStatistics {
    pub fn incomplete(&self) -> usize {
        self.pending + self.overdue
    }
}

pub fn completion_statistics(assignments: &[Assignment], today: NaiveDate) -> CompletionStatistics {
    let mut stats = CompletionStatistics {
        total: assignments.len(),
        ..Default::default()
    };
    for a in assignments {
        match assignment_status(a, today) {
            AssignmentStatus::Completed => stats.completed += 1,
            AssignmentStatus::Pending => stats.pending += 1,
            AssignmentStatus::Overdue => stats.overdue += 1,
        }
    }
    if stats.total > 0 {
        stats.completion_rate = stats.completed as f64 / stats.total as f64 * 100.0;
    }
    stats
}

/// Subject names containing `query`, case-insensitively, for assignment form
/// autocomplete.
pub fn subject_suggestions(subjects: &[Subject], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    subjects
        .iter()
        .filter(|s| seen.insert(s.name.clone()))
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .map(|s| s.name.clone())
        .take(SUGGESTION_LIMIT)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn subjects_for_day_filters_and_sorts_by_start() {
        let subjects = vec![
            subject("1", "Physics", Day::Monday, "13:00", "14:00"),
            subject("2", "History", Day::Tuesday, "08:00", "09:00"),
            subject("3", "Calculus", Day::Monday, "09:00", "10:00"),
            subject("4", "Art", Day::Monday, "09:00", "11:00"),
        ];

        let monday = subjects_for_day(&subjects, Day::Monday);
        let ids: Vec<&str> = monday.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4", "1"]);
        assert!(monday.iter().all(|s| s.day == Day::Monday));
        assert!(monday.windows(2).all(|w| w[0].start_time <= w[1].start_time));

        assert!(subjects_for_day(&subjects, Day::Sunday).is_empty());
    }

    #[test]
    fn single_calculus_subject_is_returned_for_monday() {
        let subjects = vec![subject("c", "Calculus", Day::Monday, "09:00", "10:00")];
        let monday = subjects_for_day(&subjects, Day::Monday);
        assert_eq!(monday, subjects);
    }

    #[test]
    fn upcoming_excludes_past_and_completed() {
        let assignments = vec![
            assignment("a", "Old", "2025-01-01", false),
            assignment("b", "Next", "2025-01-03", false),
        ];
        let today = date("2025-01-02");

        let upcoming = upcoming_assignments(&assignments, today, 5);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, "b");

        let stats = completion_statistics(&assignments, today);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn upcoming_sorts_and_truncates() {
        let assignments = vec![
            assignment("c", "C", "2025-03-01", false),
            assignment("a", "A", "2025-01-10", false),
            assignment("done", "Done", "2025-01-05", true),
            assignment("b", "B", "2025-02-01", false),
        ];
        let upcoming = upcoming_assignments(&assignments, date("2025-01-01"), 2);
        let ids: Vec<&str> = upcoming.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn due_today_is_upcoming_not_overdue() {
        let today = date("2025-01-02");
        let assignments = vec![assignment("t", "Today", "2025-01-02", false)];

        assert_eq!(upcoming_assignments(&assignments, today, 5).len(), 1);
        let stats = completion_statistics(&assignments, today);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.pending, 1);

        let tomorrow = date("2025-01-03");
        assert!(upcoming_assignments(&assignments, tomorrow, 5).is_empty());
        assert_eq!(completion_statistics(&assignments, tomorrow).overdue, 1);
    }

    #[test]
    fn statistics_buckets_sum_to_total() {
        let assignments = vec![
            assignment("1", "A", "2024-12-01", false),
            assignment("2", "B", "2024-12-01", true),
            assignment("3", "C", "2025-06-01", false),
            assignment("4", "D", "2025-06-01", true),
        ];
        let stats = completion_statistics(&assignments, date("2025-01-02"));

        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completed + stats.incomplete(), stats.total);
        assert!((stats.completion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn statistics_for_empty_list() {
        let stats = completion_statistics(&[], date("2025-01-02"));
        assert_eq!(stats, CompletionStatistics::default());
    }

    #[test]
    fn toggling_completion_moves_bucket_only() {
        let today = date("2025-01-02");
        let mut assignments = vec![assignment("1", "A", "2024-12-01", false)];
        let before = assignments[0].clone();
        assert_eq!(completion_statistics(&assignments, today).overdue, 1);

        assignments[0].completed = !assignments[0].completed;
        let stats = completion_statistics(&assignments, today);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.completed, 1);

        let after = &assignments[0];
        assert_eq!(after.title, before.title);
        assert_eq!(after.due_date, before.due_date);
        assert_eq!(after.priority, before.priority);
        assert_eq!(after.subject, before.subject);
    }

    #[test]
    fn assignments_for_date_matches_exact_day() {
        let assignments = vec![
            assignment("1", "A", "2025-01-02", false),
            assignment("2", "B", "2025-01-03", true),
        ];
        let found = assignments_for_date(&assignments, date("2025-01-03"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
    }

    #[test]
    fn filter_by_status() {
        let today = date("2025-01-02");
        let assignments = vec![
            assignment("over", "A", "2025-01-01", false),
            assignment("done", "B", "2025-01-01", true),
            assignment("pend", "C", "2025-01-05", false),
        ];
        let ids = |f| -> Vec<String> {
            filter_assignments(&assignments, f, today)
                .into_iter()
                .map(|a| a.id)
                .collect()
        };
        assert_eq!(ids(AssignmentFilter::All).len(), 3);
        assert_eq!(ids(AssignmentFilter::Pending), vec!["pend"]);
        assert_eq!(ids(AssignmentFilter::Completed), vec!["done"]);
        assert_eq!(ids(AssignmentFilter::Overdue), vec!["over"]);
    }

    #[test]
    fn suggestions_are_unique_case_insensitive_matches() {
        let subjects = vec![
            subject("1", "Calculus I", Day::Monday, "09:00", "10:00"),
            subject("2", "Calculus I", Day::Wednesday, "09:00", "10:00"),
            subject("3", "Physics", Day::Tuesday, "09:00", "10:00"),
            subject("4", "Precalculus", Day::Friday, "09:00", "10:00"),
        ];
        assert_eq!(subject_suggestions(&subjects, "CALC"), vec!["Calculus I", "Precalculus"]);
        assert!(subject_suggestions(&subjects, "  ").is_empty());
        assert!(subject_suggestions(&subjects, "bio").is_empty());
    }

    #[test]
    fn weekday_of_date() {
        assert_eq!(today_weekday(date("2025-01-06")), Day::Monday);
        assert_eq!(today_weekday(date("2025-01-05")), Day::Sunday);
    }
}

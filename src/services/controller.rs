use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::AppError;
use crate::export::json::ScheduleBackup;
use crate::models::{
    generate_id, Assignment, NewAssignmentRequest, NewSubjectRequest, Subject,
};
use crate::schedule::reminders::ReminderSettings;
use crate::store::{self, Document, DocumentStore};

/// Everything the views are derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    pub subjects: Vec<Subject>,
    pub assignments: Vec<Assignment>,
    pub reminder_settings: ReminderSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    pub subjects: usize,
    pub assignments: usize,
    pub skipped: usize,
}

/// Owns the schedule state and keeps it in step with the document store.
///
/// Each mutation holds the state lock while it writes to the store and only
/// touches local state once the write succeeded, so a failed write leaves the
/// local lists exactly as the store has them.
pub struct ScheduleController {
    store: Arc<dyn DocumentStore>,
    state: Mutex<ScheduleState>,
}

impl ScheduleController {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            state: Mutex::new(ScheduleState::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn snapshot(&self) -> ScheduleState {
        self.state.lock().await.clone()
    }

    pub async fn check_connection(&self) -> Result<(), AppError> {
        store::check_connection(self.store.as_ref()).await
    }

    /// Replaces local lists with what the store holds.
    pub async fn load(&self) -> Result<LoadStats, AppError> {
        let mut state = self.state.lock().await;
        self.load_locked(&mut state).await
    }

    async fn load_locked(&self, state: &mut ScheduleState) -> Result<LoadStats, AppError> {
        let subject_docs = self.store.list(store::SUBJECTS).await.map_err(AppError::read)?;
        let assignment_docs = self.store.list(store::ASSIGNMENTS).await.map_err(AppError::read)?;

        let (subjects, skipped_subjects) = decode_all::<Subject>(subject_docs);
        let (assignments, skipped_assignments) = decode_all::<Assignment>(assignment_docs);

        let stats = LoadStats {
            subjects: subjects.len(),
            assignments: assignments.len(),
            skipped: skipped_subjects + skipped_assignments,
        };
        state.subjects = subjects;
        state.assignments = assignments;

        info!(
            "loaded {} subjects, {} assignments ({} skipped)",
            stats.subjects, stats.assignments, stats.skipped
        );
        Ok(stats)
    }

    pub async fn add_subject(&self, req: NewSubjectRequest) -> Result<Subject, AppError> {
        let subject = req.into_subject(generate_id());
        subject.validate()?;

        let mut state = self.state.lock().await;
        let doc = subject_document(&subject, Stamp::Created)?;
        self.store
            .put(store::SUBJECTS, &subject.id, &doc)
            .await
            .map_err(|e| AppError::write("subject", e))?;

        info!("added subject {} ({})", subject.name, subject.id);
        state.subjects.push(subject.clone());
        Ok(subject)
    }

    /// Full overwrite of an existing subject.
    pub async fn update_subject(&self, id: &str, req: NewSubjectRequest) -> Result<Subject, AppError> {
        let subject = req.into_subject(id.to_string());
        subject.validate()?;

        let mut state = self.state.lock().await;
        let index = state
            .subjects
            .iter()
            .position(|s| s.id == id)
            .ok_or(AppError::NotFound)?;

        let doc = subject_document(&subject, Stamp::Updated)?;
        self.store
            .put(store::SUBJECTS, id, &doc)
            .await
            .map_err(|e| AppError::write("subject", e))?;

        state.subjects[index] = subject.clone();
        Ok(subject)
    }

    pub async fn delete_subject(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if !state.subjects.iter().any(|s| s.id == id) {
            return Err(AppError::NotFound);
        }

        self.store
            .delete(store::SUBJECTS, id)
            .await
            .map_err(|e| AppError::write("subject", e))?;

        state.subjects.retain(|s| s.id != id);
        info!("deleted subject {}", id);
        Ok(())
    }

    pub async fn add_assignment(&self, req: NewAssignmentRequest) -> Result<Assignment, AppError> {
        let assignment = req.into_assignment(generate_id());
        assignment.validate()?;

        let mut state = self.state.lock().await;
        let doc = assignment_document(&assignment, Stamp::Created)?;
        self.store
            .put(store::ASSIGNMENTS, &assignment.id, &doc)
            .await
            .map_err(|e| AppError::write("assignment", e))?;

        info!("added assignment {} ({})", assignment.title, assignment.id);
        state.assignments.push(assignment.clone());
        Ok(assignment)
    }

    pub async fn update_assignment(&self, id: &str, req: NewAssignmentRequest) -> Result<Assignment, AppError> {
        let assignment = req.into_assignment(id.to_string());
        assignment.validate()?;

        let mut state = self.state.lock().await;
        self.replace_assignment_locked(&mut state, assignment).await
    }

    /// Flips `completed`; every other field is written back unchanged.
    pub async fn toggle_assignment(&self, id: &str) -> Result<Assignment, AppError> {
        let mut state = self.state.lock().await;
        let mut toggled = state
            .assignments
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(AppError::NotFound)?;
        toggled.completed = !toggled.completed;
        self.replace_assignment_locked(&mut state, toggled).await
    }

    async fn replace_assignment_locked(
        &self,
        state: &mut ScheduleState,
        assignment: Assignment,
    ) -> Result<Assignment, AppError> {
        let index = state
            .assignments
            .iter()
            .position(|a| a.id == assignment.id)
            .ok_or(AppError::NotFound)?;

        let doc = assignment_document(&assignment, Stamp::Updated)?;
        self.store
            .put(store::ASSIGNMENTS, &assignment.id, &doc)
            .await
            .map_err(|e| AppError::write("assignment", e))?;

        state.assignments[index] = assignment.clone();
        Ok(assignment)
    }

    pub async fn delete_assignment(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if !state.assignments.iter().any(|a| a.id == id) {
            return Err(AppError::NotFound);
        }

        self.store
            .delete(store::ASSIGNMENTS, id)
            .await
            .map_err(|e| AppError::write("assignment", e))?;

        state.assignments.retain(|a| a.id != id);
        info!("deleted assignment {}", id);
        Ok(())
    }

    /// Makes the store hold exactly the backup's entities. If any write fails
    /// part way, local state is re-read from the store.
    pub async fn import(&self, backup: ScheduleBackup) -> Result<LoadStats, AppError> {
        backup.validate()?;
        let mut state = self.state.lock().await;

        match self.write_backup(&state, &backup).await {
            Ok(()) => {
                state.subjects = backup.subjects;
                state.assignments = backup.assignments;
                info!(
                    "imported {} subjects, {} assignments",
                    state.subjects.len(),
                    state.assignments.len()
                );
                Ok(LoadStats {
                    subjects: state.subjects.len(),
                    assignments: state.assignments.len(),
                    skipped: 0,
                })
            }
            Err(e) => {
                warn!("import failed, reloading from store: {}", e);
                if let Err(reload) = self.load_locked(&mut state).await {
                    warn!("reload after failed import also failed: {}", reload);
                }
                Err(AppError::write("schedule", e))
            }
        }
    }

    async fn write_backup(&self, state: &ScheduleState, backup: &ScheduleBackup) -> Result<(), AppError> {
        for old in &state.subjects {
            if !backup.subjects.iter().any(|s| s.id == old.id) {
                self.store.delete(store::SUBJECTS, &old.id).await?;
            }
        }
        for old in &state.assignments {
            if !backup.assignments.iter().any(|a| a.id == old.id) {
                self.store.delete(store::ASSIGNMENTS, &old.id).await?;
            }
        }
        for s in &backup.subjects {
            self.store
                .put(store::SUBJECTS, &s.id, &subject_document(s, Stamp::Created)?)
                .await?;
        }
        for a in &backup.assignments {
            self.store
                .put(store::ASSIGNMENTS, &a.id, &assignment_document(a, Stamp::Created)?)
                .await?;
        }
        Ok(())
    }

    pub async fn reminder_settings(&self) -> ReminderSettings {
        self.state.lock().await.reminder_settings
    }

    pub async fn set_reminder_settings(&self, settings: ReminderSettings) -> ReminderSettings {
        let mut state = self.state.lock().await;
        state.reminder_settings = settings;
        settings
    }
}

#[derive(Clone, Copy)]
enum Stamp {
    Created,
    Updated,
}

fn document_body<T: Serialize>(
    entity: &T,
    id: &str,
    doc_path: String,
    stamp: Stamp,
) -> Result<Map<String, Value>, AppError> {
    let mut fields = match serde_json::to_value(entity)? {
        Value::Object(map) => map,
        _ => return Err(AppError::InternalServerError),
    };
    fields.insert("uniqueId".to_string(), Value::String(id.to_string()));
    fields.insert("docPath".to_string(), Value::String(doc_path));
    let key = match stamp {
        Stamp::Created => "createdAt",
        Stamp::Updated => "updatedAt",
    };
    fields.insert(key.to_string(), Value::String(Utc::now().to_rfc3339()));
    Ok(fields)
}

fn subject_document(subject: &Subject, stamp: Stamp) -> Result<Map<String, Value>, AppError> {
    document_body(subject, &subject.id, subject.doc_path(), stamp)
}

fn assignment_document(assignment: &Assignment, stamp: Stamp) -> Result<Map<String, Value>, AppError> {
    document_body(assignment, &assignment.id, assignment.doc_path(), stamp)
}

/// The document key wins over any `id` stored in the body.
fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> (Vec<T>, usize) {
    let mut items = Vec::with_capacity(docs.len());
    let mut skipped = 0;
    for doc in docs {
        let mut fields = doc.fields;
        fields.insert("id".to_string(), Value::String(doc.id.clone()));
        match serde_json::from_value::<T>(Value::Object(fields)) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!("skipping malformed document {}: {}", doc.id, e);
                skipped += 1;
            }
        }
    }
    (items, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Priority};
    use crate::schedule::fixtures::{assignment, date, subject};
    use crate::store::MemoryStore;
    use axum::response::IntoResponse;

    fn calculus_request() -> NewSubjectRequest {
        NewSubjectRequest {
            name: "Calculus".to_string(),
            day: Day::Monday,
            start_time: "09:00".parse().unwrap(),
            end_time: "10:00".parse().unwrap(),
            room: "B12".to_string(),
            instructor: "Dr. Lee".to_string(),
            color: "blue".to_string(),
        }
    }

    fn essay_request() -> NewAssignmentRequest {
        NewAssignmentRequest {
            title: "Essay".to_string(),
            subject: "History".to_string(),
            due_date: date("2025-01-03"),
            description: "2000 words".to_string(),
            completed: false,
            priority: Priority::High,
        }
    }

    fn controller() -> (Arc<MemoryStore>, ScheduleController) {
        let store = Arc::new(MemoryStore::new());
        let controller = ScheduleController::new(store.clone());
        (store, controller)
    }

    #[tokio::test]
    async fn added_subject_is_persisted_with_metadata() {
        let (store, controller) = controller();
        let subject = controller.add_subject(calculus_request()).await.unwrap();

        let docs = store.list(store::SUBJECTS).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, subject.id);
        assert_eq!(docs[0].fields["name"], "Calculus");
        assert_eq!(docs[0].fields["uniqueId"], subject.id.as_str());
        assert!(docs[0].fields.contains_key("createdAt"));
        assert_eq!(
            docs[0].fields["docPath"],
            format!("form/{}/Calculus/Monday/09:00/Dr. Lee", subject.id)
        );

        assert_eq!(controller.snapshot().await.subjects, vec![subject]);
    }

    #[tokio::test]
    async fn failed_write_leaves_local_state_untouched() {
        let (store, controller) = controller();
        let existing = controller.add_subject(calculus_request()).await.unwrap();

        store.fail_writes(true);
        let err = controller.add_subject(calculus_request()).await.unwrap_err();
        assert!(matches!(err, AppError::WriteFailed { entity: "subject", .. }));

        let mut renamed = calculus_request();
        renamed.name = "Renamed".to_string();
        assert!(controller.update_subject(&existing.id, renamed).await.is_err());
        assert!(controller.delete_subject(&existing.id).await.is_err());

        let state = controller.snapshot().await;
        assert_eq!(state.subjects, vec![existing]);
    }

    #[tokio::test]
    async fn invalid_subject_is_rejected_before_writing() {
        let (store, controller) = controller();
        let mut req = calculus_request();
        req.end_time = "08:00".parse().unwrap();

        assert!(matches!(controller.add_subject(req).await, Err(AppError::BadRequest(_))));
        assert!(store.list(store::SUBJECTS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_are_not_found() {
        let (_store, controller) = controller();
        assert!(matches!(
            controller.update_subject("missing", calculus_request()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(controller.delete_assignment("missing").await, Err(AppError::NotFound)));
        assert!(matches!(controller.toggle_assignment("missing").await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn toggle_only_flips_completed() {
        let (store, controller) = controller();
        let original = controller.add_assignment(essay_request()).await.unwrap();

        let toggled = controller.toggle_assignment(&original.id).await.unwrap();
        assert!(toggled.completed);
        assert_eq!(Assignment { completed: false, ..toggled.clone() }, original);

        let docs = store.list(store::ASSIGNMENTS).await.unwrap();
        assert_eq!(docs[0].fields["completed"], true);
        assert_eq!(docs[0].fields["priority"], "high");
        assert!(docs[0].fields.contains_key("updatedAt"));

        let back = controller.toggle_assignment(&original.id).await.unwrap();
        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn load_repopulates_from_store_and_skips_malformed() {
        let (store, controller) = controller();
        let subject = controller.add_subject(calculus_request()).await.unwrap();
        let assignment = controller.add_assignment(essay_request()).await.unwrap();

        let mut junk = Map::new();
        junk.insert("title".to_string(), Value::from("no due date"));
        store.put(store::ASSIGNMENTS, "junk", &junk).await.unwrap();

        let fresh = ScheduleController::new(store.clone());
        let stats = fresh.load().await.unwrap();
        assert_eq!(stats, LoadStats { subjects: 1, assignments: 1, skipped: 1 });

        let state = fresh.snapshot().await;
        assert_eq!(state.subjects, vec![subject]);
        assert_eq!(state.assignments, vec![assignment]);
        drop(controller);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_lists() {
        let (store, controller) = controller();
        controller.add_subject(calculus_request()).await.unwrap();

        store.fail_reads(true);
        assert!(matches!(controller.load().await, Err(AppError::ReadFailed(_))));
        assert_eq!(controller.snapshot().await.subjects.len(), 1);
    }

    #[tokio::test]
    async fn import_replaces_store_contents() {
        let (store, controller) = controller();
        controller.add_subject(calculus_request()).await.unwrap();

        let backup = ScheduleBackup {
            subjects: vec![subject("s9", "Physics", Day::Friday, "10:00", "11:00")],
            assignments: vec![assignment("a9", "Lab report", "2025-02-01", false)],
            export_date: "2025-01-01T00:00:00.000Z".to_string(),
            version: "1.0".to_string(),
        };
        let stats = controller.import(backup.clone()).await.unwrap();
        assert_eq!(stats.subjects, 1);

        let state = controller.snapshot().await;
        assert_eq!(state.subjects, backup.subjects);
        assert_eq!(state.assignments, backup.assignments);

        let ids: Vec<String> = store
            .list(store::SUBJECTS)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["s9"]);
    }

    /// Delays every write so concurrent callers queue on the state lock.
    struct SlowStore {
        inner: MemoryStore,
        delay: std::time::Duration,
    }

    #[async_trait::async_trait]
    impl DocumentStore for SlowStore {
        async fn put(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), AppError> {
            tokio::time::sleep(self.delay).await;
            self.inner.put(collection, id, fields).await
        }

        async fn list(&self, collection: &str) -> Result<Vec<Document>, AppError> {
            self.inner.list(collection).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn concurrent_toggles_cancel_out() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            delay: std::time::Duration::from_millis(50),
        });
        let controller = ScheduleController::new(store.clone());
        let essay = controller.add_assignment(essay_request()).await.unwrap();
        let mut other = essay_request();
        other.title = "Lab".to_string();
        let lab = controller.add_assignment(other).await.unwrap();

        let mut renamed = essay_request();
        renamed.title = "Lab v2".to_string();
        let (updated, first, second) = tokio::join!(
            controller.update_assignment(&lab.id, renamed),
            controller.toggle_assignment(&essay.id),
            controller.toggle_assignment(&essay.id),
        );
        updated.unwrap();
        assert_ne!(first.unwrap().completed, second.unwrap().completed);

        let state = controller.snapshot().await;
        let local = state.assignments.iter().find(|a| a.id == essay.id).unwrap();
        assert!(!local.completed);

        let docs = store.list(store::ASSIGNMENTS).await.unwrap();
        let stored = docs.iter().find(|d| d.id == essay.id).unwrap();
        assert_eq!(stored.fields["completed"], false);
    }

    #[tokio::test]
    async fn failed_import_reloads_from_store() {
        let (store, controller) = controller();
        controller.add_subject(calculus_request()).await.unwrap();
        controller.add_assignment(essay_request()).await.unwrap();

        let backup = ScheduleBackup {
            subjects: vec![subject("s9", "Physics", Day::Friday, "10:00", "11:00")],
            assignments: vec![assignment("a9", "Lab report", "2025-02-01", false)],
            export_date: "2025-01-01T00:00:00.000Z".to_string(),
            version: "1.0".to_string(),
        };

        store.fail_writes(true);
        let err = controller.import(backup).await.unwrap_err();
        assert!(matches!(err, AppError::WriteFailed { entity: "schedule", .. }));
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::BAD_GATEWAY
        );

        let fresh = ScheduleController::new(store.clone());
        fresh.load().await.unwrap();
        assert_eq!(controller.snapshot().await, fresh.snapshot().await);
        assert_eq!(
            controller.snapshot().await.subjects.len(),
            store.list(store::SUBJECTS).await.unwrap().len()
        );
    }

    #[tokio::test]
    async fn import_with_duplicate_ids_is_rejected_before_writing() {
        let (store, controller) = controller();
        let existing = controller.add_subject(calculus_request()).await.unwrap();

        let backup = ScheduleBackup {
            subjects: vec![
                subject("s9", "Physics", Day::Friday, "10:00", "11:00"),
                subject("s9", "Chemistry", Day::Monday, "10:00", "11:00"),
            ],
            assignments: vec![],
            export_date: "2025-01-01T00:00:00.000Z".to_string(),
            version: "1.0".to_string(),
        };
        assert!(matches!(controller.import(backup).await, Err(AppError::BadRequest(_))));

        assert_eq!(controller.snapshot().await.subjects, vec![existing]);
        assert_eq!(store.list(store::SUBJECTS).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reminder_settings_round_trip() {
        let (_store, controller) = controller();
        assert_eq!(controller.reminder_settings().await, ReminderSettings::default());

        let settings = ReminderSettings {
            class_reminders: false,
            assignment_reminders: true,
            daily_schedule: true,
        };
        controller.set_reminder_settings(settings).await;
        assert_eq!(controller.reminder_settings().await, settings);
    }
}

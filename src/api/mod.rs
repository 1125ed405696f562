use axum::Json;
use axum::extract::{Path, Query};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{patch, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::assistant::{self, AssistantContext, QuickAction, GREETING, QUICK_ACTIONS};
use crate::error::AppError;
use crate::export::{self, json, ExportFormat};
use crate::models::*;
use crate::schedule::calendar::{self, DailyView, WeeklyView};
use crate::schedule::reminders::{self, Reminder, ReminderSettings};
use crate::schedule::{self, AssignmentFilter, CompletionStatistics, DEFAULT_UPCOMING_LIMIT};
use crate::services::LoadStats;
use crate::state::AppState;

#[derive(Deserialize)]
struct SuggestionParams {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct AssignmentQueryParams {
    #[serde(default)]
    filter: AssignmentFilter,
}

#[derive(Deserialize)]
struct UpcomingParams {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct DateParams {
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct AssistantRequest {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistantReply {
    reply: String,
    intent: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistantIntro {
    greeting: &'static str,
    quick_actions: &'static [QuickAction],
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/{id}", put(update_subject).delete(delete_subject))
        .route("/subjects/day/{day}", get(subjects_for_day))
        .route("/subjects/suggestions", get(subject_suggestions))
        .route("/assignments", get(list_assignments).post(create_assignment))
        .route("/assignments/upcoming", get(upcoming_assignments))
        .route("/assignments/due/{date}", get(assignments_due))
        .route("/assignments/{id}", put(update_assignment).delete(delete_assignment))
        .route("/assignments/{id}/toggle", patch(toggle_assignment))
        .route("/stats", get(stats))
        .route("/views/daily", get(daily_view))
        .route("/views/weekly", get(weekly_view))
        .route("/reminders/settings", get(get_reminder_settings).put(put_reminder_settings))
        .route("/reminders/upcoming", get(upcoming_reminders))
        .route("/export/{format}", get(export_schedule))
        .route("/import", post(import_schedule))
        .route("/assistant", get(assistant_intro).post(ask_assistant))
        .route("/reload", post(reload))
        .with_state(state)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.controller.check_connection().await?;
    Ok(StatusCode::OK)
}

async fn list_subjects(State(state): State<AppState>) -> Json<Vec<Subject>> {
    Json(state.controller.snapshot().await.subjects)
}

async fn create_subject(
    State(state): State<AppState>,
    Json(req): Json<NewSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let subject = state.controller.add_subject(req).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewSubjectRequest>,
) -> Result<Json<Subject>, AppError> {
    let subject = state.controller.update_subject(&id, req).await?;
    Ok(Json(subject))
}

async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.controller.delete_subject(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn subjects_for_day(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<Vec<Subject>>, AppError> {
    let day: Day = day.parse().map_err(AppError::BadRequest)?;
    let subjects = state.controller.snapshot().await.subjects;
    Ok(Json(schedule::subjects_for_day(&subjects, day)))
}

async fn subject_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Json<Vec<String>> {
    let subjects = state.controller.snapshot().await.subjects;
    Json(schedule::subject_suggestions(&subjects, &params.q))
}

async fn list_assignments(
    State(state): State<AppState>,
    Query(params): Query<AssignmentQueryParams>,
) -> Json<Vec<Assignment>> {
    let assignments = state.controller.snapshot().await.assignments;
    Json(schedule::filter_assignments(&assignments, params.filter, today()))
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(req): Json<NewAssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = state.controller.add_assignment(req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewAssignmentRequest>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.controller.update_assignment(&id, req).await?;
    Ok(Json(assignment))
}

async fn toggle_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.controller.toggle_assignment(&id).await?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.controller.delete_assignment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upcoming_assignments(
    State(state): State<AppState>,
    Query(params): Query<UpcomingParams>,
) -> Json<Vec<Assignment>> {
    let assignments = state.controller.snapshot().await.assignments;
    let limit = params.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
    Json(schedule::upcoming_assignments(&assignments, today(), limit))
}

async fn assignments_due(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Json<Vec<Assignment>> {
    let assignments = state.controller.snapshot().await.assignments;
    Json(schedule::assignments_for_date(&assignments, date))
}

async fn stats(State(state): State<AppState>) -> Json<CompletionStatistics> {
    let assignments = state.controller.snapshot().await.assignments;
    Json(schedule::completion_statistics(&assignments, today()))
}

async fn daily_view(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<DailyView>, AppError> {
    let snapshot = state.controller.snapshot().await;
    let date = params.date.unwrap_or_else(today);
    let view = calendar::daily_view(&snapshot.subjects, &snapshot.assignments, date)?;
    Ok(Json(view))
}

async fn weekly_view(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<WeeklyView>, AppError> {
    let snapshot = state.controller.snapshot().await;
    let today = today();
    let date = params.date.unwrap_or(today);
    let view = calendar::weekly_view(&snapshot.subjects, &snapshot.assignments, date, today)?;
    Ok(Json(view))
}

async fn get_reminder_settings(State(state): State<AppState>) -> Json<ReminderSettings> {
    Json(state.controller.reminder_settings().await)
}

async fn put_reminder_settings(
    State(state): State<AppState>,
    Json(settings): Json<ReminderSettings>,
) -> Json<ReminderSettings> {
    Json(state.controller.set_reminder_settings(settings).await)
}

async fn upcoming_reminders(State(state): State<AppState>) -> Json<Vec<Reminder>> {
    let snapshot = state.controller.snapshot().await;
    Json(reminders::upcoming_reminders(
        &snapshot.subjects,
        &snapshot.assignments,
        &snapshot.reminder_settings,
        today(),
    ))
}

async fn export_schedule(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    let snapshot = state.controller.snapshot().await;
    let file = export::export(format, &snapshot.subjects, &snapshot.assignments, Local::now())?;

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response())
}

async fn import_schedule(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<LoadStats>, AppError> {
    let backup = json::from_json(&body)?;
    let stats = state.controller.import(backup).await?;
    Ok(Json(stats))
}

async fn assistant_intro() -> Json<AssistantIntro> {
    Json(AssistantIntro {
        greeting: GREETING,
        quick_actions: &QUICK_ACTIONS,
    })
}

async fn ask_assistant(
    State(state): State<AppState>,
    Json(req): Json<AssistantRequest>,
) -> Result<Json<AssistantReply>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let snapshot = state.controller.snapshot().await;
    let ctx = AssistantContext::build(&snapshot.subjects, &snapshot.assignments, today());
    let reply = assistant::respond(&req.message, &ctx);

    if !state.assistant_delay.is_zero() {
        tokio::time::sleep(state.assistant_delay).await;
    }

    Ok(Json(AssistantReply {
        reply: reply.text,
        intent: reply.intent,
    }))
}

async fn reload(State(state): State<AppState>) -> Result<Json<LoadStats>, AppError> {
    let stats = state.controller.load().await?;
    Ok(Json(stats))
}

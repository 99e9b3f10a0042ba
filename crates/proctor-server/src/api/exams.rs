use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use proctor_shared::reschedule::{parse_day, DropTarget};
use proctor_shared::ExamStatus;
use proctor_store::Exam;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{authorize_user, created, parse_id, success, success_message, success_with_message, ApiJson, ApiResult, AppState};
use crate::auth::{AdminContext, AuthContext};
use crate::error::ApiError;
use crate::services::schedule::{self, ExamView, ScheduleView};
use crate::services::scheduling::{self, ConflictWarning, ExamDraft, SaveOutcome};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRequest {
    course_id: Option<Uuid>,
    room_id: Option<Uuid>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    status: Option<String>,
    #[serde(default)]
    confirm_conflicts: bool,
    /// Only read by the conflict preview: the exam being edited.
    exam_id: Option<Uuid>,
}

impl ExamRequest {
    fn draft(&self) -> Result<ExamDraft, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<ExamStatus>)
            .transpose()?;
        Ok(ExamDraft {
            course_id: self.course_id,
            room_id: self.room_id,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationBody {
    confirmation_required: bool,
    conflicts: Vec<Exam>,
}

fn confirmation_response(warning: ConflictWarning) -> Response {
    success_with_message(
        ConfirmationBody {
            confirmation_required: true,
            conflicts: warning.conflicts,
        },
        warning.message,
    )
    .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    destination_day: Option<String>,
    slot_index: Option<u32>,
    source_index: Option<u32>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn list(State(state): State<AppState>, _auth: AuthContext) -> ApiResult<Vec<ExamView>> {
    let db = state.db.lock().await;
    Ok(success(schedule::list_exams(&*db)?))
}

pub async fn get(State(state): State<AppState>, _auth: AuthContext, Path(id): Path<String>) -> ApiResult<ExamView> {
    let id = parse_id(&id, "Exam")?;
    let db = state.db.lock().await;
    Ok(success(schedule::exam_view(&*db, id)?))
}

pub async fn list_for_course(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(course_id): Path<String>,
) -> ApiResult<Vec<ExamView>> {
    let course_id = parse_id(&course_id, "Course")?;
    let db = state.db.lock().await;
    Ok(success(schedule::exams_for_course(&*db, course_id)?))
}

pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<ExamView>> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    Ok(success(schedule::exams_for_user(&*db, &user.id.to_string())?))
}

pub async fn schedule(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<ScheduleView> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    let view = schedule::schedule_for_user(&*db, &user.id.to_string(), Utc::now(), state.config.schedule_offset)?;
    Ok(success(view))
}

pub async fn calendar(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    let document = schedule::calendar_for_user(&*db, &user.id.to_string(), Utc::now())?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"exams.ics\""),
        ],
        document,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Admin writes
// ---------------------------------------------------------------------------

pub async fn preview_conflicts(
    State(state): State<AppState>,
    _admin: AdminContext,
    ApiJson(body): ApiJson<ExamRequest>,
) -> ApiResult<Vec<Exam>> {
    let draft = body.draft()?;
    let db = state.db.lock().await;
    Ok(success(scheduling::preview_conflicts(&*db, &draft, body.exam_id)?))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminContext,
    ApiJson(body): ApiJson<ExamRequest>,
) -> Result<Response, ApiError> {
    let draft = body.draft()?;
    let db = state.db.lock().await;

    match scheduling::create_exam(&*db, &draft, body.confirm_conflicts, state.exam_refresh())? {
        SaveOutcome::Saved(exam) => Ok(created(schedule::exam_view(&*db, exam.id)?).into_response()),
        SaveOutcome::ConfirmationRequired(warning) => Ok(confirmation_response(warning)),
    }
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ExamRequest>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "Exam")?;
    let draft = body.draft()?;
    let db = state.db.lock().await;

    match scheduling::update_exam(&*db, id, &draft, body.confirm_conflicts, state.exam_refresh())? {
        SaveOutcome::Saved(exam) => Ok(success(schedule::exam_view(&*db, exam.id)?).into_response()),
        SaveOutcome::ConfirmationRequired(warning) => Ok(confirmation_response(warning)),
    }
}

pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Exam")?;
    let db = state.db.lock().await;
    scheduling::delete_exam(&*db, id, state.exam_refresh())?;
    Ok(success_message("Exam deleted successfully"))
}

pub async fn reschedule(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RescheduleRequest>,
) -> ApiResult<ExamView> {
    let id = parse_id(&id, "Exam")?;

    let day = body
        .destination_day
        .as_deref()
        .ok_or_else(|| ApiError::validation("Destination day is required"))?;
    let target = DropTarget {
        day: parse_day(day)?,
        slot_index: body
            .slot_index
            .ok_or_else(|| ApiError::validation("Slot index is required"))?,
        source_index: body.source_index,
    };

    let db = state.db.lock().await;
    let exam = scheduling::reschedule_exam(&*db, id, target, state.config.schedule_offset, state.exam_refresh())?;
    Ok(success(schedule::exam_view(&*db, exam.id)?))
}

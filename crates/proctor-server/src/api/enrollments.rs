use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use proctor_store::{Course, Enrollment};
use serde::Deserialize;
use uuid::Uuid;

use super::{authorize_user, created, parse_id, success, success_with_message, ApiJson, ApiResult, AppState, Envelope};
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::services::enrollment::{self, EnrollmentView};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    course_id: Option<Uuid>,
    semester: Option<String>,
}

pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<EnrollmentView>> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    Ok(success(enrollment::list_for_user(&*db, &user.id.to_string())?))
}

pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<EnrollRequest>,
) -> Result<(StatusCode, Json<Envelope<EnrollmentView>>), ApiError> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    let view = enrollment::enroll(&*db, &user.id.to_string(), body.course_id, body.semester.as_deref())?;
    Ok(created(view))
}

pub async fn unenroll(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Enrollment> {
    let id = parse_id(&id, "Enrollment")?;
    let db = state.db.lock().await;

    let existing = enrollment::get(&*db, id)?;
    if !auth.is_admin() && existing.user_id != auth.user_id {
        return Err(ApiError::forbidden("You may only access your own records"));
    }

    let removed = enrollment::unenroll(&*db, id)?;
    Ok(success_with_message(removed, "Successfully unenrolled from course"))
}

pub async fn available_courses(State(state): State<AppState>, _auth: AuthContext) -> ApiResult<Vec<Course>> {
    let db = state.db.lock().await;
    Ok(success(enrollment::available_courses(&*db)?))
}

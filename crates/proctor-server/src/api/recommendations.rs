use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use proctor_store::LearningRecommendation;
use serde::Deserialize;
use uuid::Uuid;

use super::{
    authorize_user, created, parse_id, success, success_message, success_with_message, ApiJson, ApiResult, AppState,
    Envelope,
};
use crate::auth::{AdminContext, AuthContext};
use crate::error::ApiError;
use crate::services::recommendations::{self, NewRecommendation, RecommendationView};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecommendationRequest {
    user_id: Option<String>,
    course_id: Option<Uuid>,
    resource_id: Option<Uuid>,
    reason: Option<String>,
    priority: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    completed: Option<bool>,
}

pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<RecommendationView>> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    Ok(success(recommendations::list_for_user(&*db, &user.id.to_string())?))
}

pub async fn list_for_user_course(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((user_id, course_id)): Path<(String, String)>,
) -> ApiResult<Vec<RecommendationView>> {
    let course_id = parse_id(&course_id, "Course")?;
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    Ok(success(recommendations::list_for_user_course(
        &*db,
        &user.id.to_string(),
        course_id,
    )?))
}

pub async fn generate(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<LearningRecommendation>> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    let generated = recommendations::generate_for_user(&*db, &user.id.to_string())?;

    let message = format!("Generated {} new recommendations", generated.len());
    Ok(success_with_message(generated, message))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminContext,
    ApiJson(body): ApiJson<CreateRecommendationRequest>,
) -> Result<(StatusCode, Json<Envelope<LearningRecommendation>>), ApiError> {
    let db = state.db.lock().await;
    let recommendation = recommendations::create(
        &*db,
        NewRecommendation {
            user: body.user_id,
            course_id: body.course_id,
            resource_id: body.resource_id,
            reason: body.reason,
            priority: body.priority,
        },
    )?;
    Ok(created(recommendation))
}

pub async fn complete(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Option<ApiJson<CompleteRequest>>,
) -> ApiResult<LearningRecommendation> {
    let id = parse_id(&id, "Recommendation")?;
    let completed = body.and_then(|ApiJson(body)| body.completed);

    let db = state.db.lock().await;
    let existing = recommendations::get(&*db, id)?;
    if !auth.is_admin() && existing.user_id != auth.user_id {
        return Err(ApiError::forbidden("You may only access your own records"));
    }
    Ok(success(recommendations::mark_completed(&*db, id, completed)?))
}

pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Recommendation")?;
    let db = state.db.lock().await;
    recommendations::delete(&*db, id)?;
    Ok(success_message("Recommendation deleted successfully"))
}

use axum::extract::{Path, State};
use proctor_shared::ResourceType;
use proctor_store::LearningPreference;
use serde::Deserialize;

use super::{authorize_user, parse_id, success, success_message, ApiJson, ApiResult, AppState};
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::services::preferences;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRequest {
    preferred_type: Option<String>,
    study_duration: Option<i64>,
}

pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<LearningPreference>> {
    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    Ok(success(preferences::list_for_user(&*db, &user.id.to_string())?))
}

pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<PreferenceRequest>,
) -> ApiResult<LearningPreference> {
    let preferred_type = body
        .preferred_type
        .as_deref()
        .map(str::parse::<ResourceType>)
        .transpose()?;

    let db = state.db.lock().await;
    let user = authorize_user(&*db, &auth, &user_id)?;
    let preference = preferences::upsert(&*db, &user.id.to_string(), preferred_type, body.study_duration)?;
    Ok(success(preference))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Learning preference")?;
    let db = state.db.lock().await;

    let existing = preferences::get(&*db, id)?;
    if !auth.is_admin() && existing.user_id != auth.user_id {
        return Err(ApiError::forbidden("You may only access your own records"));
    }
    preferences::delete(&*db, id)?;
    Ok(success_message("Learning preference deleted successfully"))
}

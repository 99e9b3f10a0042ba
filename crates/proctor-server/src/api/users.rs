use axum::extract::{Path, State};
use proctor_shared::Role;
use proctor_store::{User, UserRepository};
use serde::Deserialize;

use super::{authorize_user, success, ApiJson, ApiResult, AppState};
use crate::auth::{AdminContext, AuthContext};
use crate::error::ApiError;
use crate::services::users;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    role: Option<String>,
}

pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<User> {
    let db = state.db.lock().await;
    Ok(success(db.get_user(auth.user_id)?))
}

pub async fn get(State(state): State<AppState>, auth: AuthContext, Path(user_id): Path<String>) -> ApiResult<User> {
    let db = state.db.lock().await;
    Ok(success(authorize_user(&*db, &auth, &user_id)?))
}

pub async fn list(State(state): State<AppState>, _admin: AdminContext) -> ApiResult<Vec<User>> {
    let db = state.db.lock().await;
    Ok(success(users::list_users(&*db)?))
}

pub async fn set_role(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<RoleRequest>,
) -> ApiResult<User> {
    let role: Role = body
        .role
        .as_deref()
        .ok_or_else(|| ApiError::validation("Role is required"))?
        .parse()?;

    let db = state.db.lock().await;
    Ok(success(users::set_role(&*db, &user_id, role)?))
}

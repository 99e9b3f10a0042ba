use proctor_shared::Role;
use proctor_store::{StoreError, User, UserRepository};
use uuid::Uuid;

use super::ServiceResult;
use crate::error::ApiError;

/// Look a user up by internal UUID first, then by external id.
pub fn resolve_user<S: UserRepository>(store: &S, key: &str) -> ServiceResult<User> {
    if let Ok(id) = Uuid::parse_str(key) {
        match store.get_user(id) {
            Ok(user) => return Ok(user),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
    }

    store
        .find_user_by_external_id(key)?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub fn list_users<S: UserRepository>(store: &S) -> ServiceResult<Vec<User>> {
    Ok(store.list_users()?)
}

pub fn set_role<S: UserRepository>(store: &S, key: &str, role: Role) -> ServiceResult<User> {
    let user = resolve_user(store, key)?;
    let updated = store.update_user_role(user.id, role)?;
    tracing::info!(user_id = %updated.id, role = %role, "user role changed");
    Ok(updated)
}

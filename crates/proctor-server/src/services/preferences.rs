use proctor_shared::constants::DEFAULT_STUDY_DURATION_MINUTES;
use proctor_shared::ResourceType;
use proctor_store::{now, LearningPreference, PreferenceRepository, StoreError, UserRepository};
use uuid::Uuid;

use super::users::resolve_user;
use super::ServiceResult;
use crate::error::ApiError;

/// Update the user's effective (earliest) preference, or create one.
pub fn upsert<S>(
    store: &S,
    user_key: &str,
    preferred_type: Option<ResourceType>,
    study_duration: Option<i64>,
) -> ServiceResult<LearningPreference>
where
    S: UserRepository + PreferenceRepository,
{
    let preferred_type = preferred_type.ok_or_else(|| ApiError::validation("Preferred type is required"))?;
    if matches!(study_duration, Some(minutes) if minutes <= 0) {
        return Err(ApiError::validation("Study duration must be a positive number of minutes"));
    }

    let user = resolve_user(store, user_key)?;

    match store.list_preferences_for_user(user.id)?.into_iter().next() {
        Some(existing) => {
            let preference = LearningPreference {
                preferred_type,
                study_duration: study_duration.unwrap_or(existing.study_duration),
                updated_at: now(),
                ..existing
            };
            store.update_preference(&preference)?;
            tracing::debug!(user_id = %user.id, preference_id = %preference.id, "preference updated");
            Ok(preference)
        }
        None => {
            let preference = LearningPreference::new(
                user.id,
                preferred_type,
                study_duration.unwrap_or(DEFAULT_STUDY_DURATION_MINUTES),
            );
            store.insert_preference(&preference)?;
            tracing::debug!(user_id = %user.id, preference_id = %preference.id, "preference created");
            Ok(preference)
        }
    }
}

pub fn list_for_user<S>(store: &S, user_key: &str) -> ServiceResult<Vec<LearningPreference>>
where
    S: UserRepository + PreferenceRepository,
{
    let user = resolve_user(store, user_key)?;
    Ok(store.list_preferences_for_user(user.id)?)
}

pub fn get<S: PreferenceRepository>(store: &S, id: Uuid) -> ServiceResult<LearningPreference> {
    store.get_preference(id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Learning preference not found"),
        other => other.into(),
    })
}

pub fn delete<S: PreferenceRepository>(store: &S, id: Uuid) -> ServiceResult<()> {
    if !store.delete_preference(id)? {
        return Err(ApiError::not_found("Learning preference not found"));
    }
    Ok(())
}

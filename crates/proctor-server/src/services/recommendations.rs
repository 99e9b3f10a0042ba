//! Study recommendation generation and bookkeeping.

use std::collections::{HashMap, HashSet};

use proctor_shared::constants::PREFERRED_TYPE_PRIORITY_BOOST;
use proctor_shared::ResourceType;
use proctor_store::{
    Course, CourseRepository, EnrollmentRepository, LearningRecommendation, PreferenceRepository,
    RecommendationRepository, StoreError, StudyResource, StudyResourceRepository, UserRepository,
};
use serde::Serialize;
use uuid::Uuid;

use super::users::resolve_user;
use super::ServiceResult;
use crate::error::ApiError;

/// A recommendation with the course and resource it points at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationView {
    #[serde(flatten)]
    pub recommendation: LearningRecommendation,
    pub course: Option<Course>,
    pub resource: Option<StudyResource>,
}

/// Manual recommendation as submitted by an admin.
#[derive(Debug, Clone, Default)]
pub struct NewRecommendation {
    pub user: Option<String>,
    pub course_id: Option<Uuid>,
    pub resource_id: Option<Uuid>,
    pub reason: Option<String>,
    pub priority: Option<i64>,
}

fn priority_for(resource: &StudyResource, preferred: ResourceType) -> i64 {
    if resource.resource_type == preferred {
        PREFERRED_TYPE_PRIORITY_BOOST
    } else {
        0
    }
}

/// Create recommendations for every study resource of the user's enrolled
/// courses that the user has not been recommended yet. Returns only the
/// newly created rows; an empty list is a normal outcome.
pub fn generate_for_user<S>(store: &S, user_key: &str) -> ServiceResult<Vec<LearningRecommendation>>
where
    S: UserRepository
        + EnrollmentRepository
        + PreferenceRepository
        + StudyResourceRepository
        + CourseRepository
        + RecommendationRepository,
{
    let user = resolve_user(store, user_key)?;

    let enrollments = store.list_enrollments_for_user(user.id)?;
    if enrollments.is_empty() {
        return Err(ApiError::InvalidState("User is not enrolled in any course".into()));
    }

    let preferred = store
        .list_preferences_for_user(user.id)?
        .first()
        .map(|p| p.preferred_type)
        .unwrap_or(ResourceType::Video);

    let course_ids: Vec<Uuid> = enrollments.iter().map(|e| e.course_id).collect();
    let candidates = store.list_resources_for_courses(&course_ids)?;
    if candidates.is_empty() {
        return Err(ApiError::not_found("No study resources available for enrolled courses"));
    }

    let mut seen: HashSet<Uuid> = store
        .list_recommendations_for_user(user.id)?
        .into_iter()
        .map(|r| r.resource_id)
        .collect();

    let mut course_names: HashMap<Uuid, String> = HashMap::new();
    let mut created = Vec::new();
    for resource in candidates {
        if !seen.insert(resource.id) {
            continue;
        }

        let course_name = match course_names.get(&resource.course_id) {
            Some(name) => name.clone(),
            None => {
                let name = store.get_course(resource.course_id)?.name;
                course_names.insert(resource.course_id, name.clone());
                name
            }
        };

        let recommendation = LearningRecommendation::new(
            user.id,
            resource.course_id,
            resource.id,
            format!("Recommended based on your enrollment in {course_name}"),
            priority_for(&resource, preferred),
        );
        store.insert_recommendation(&recommendation)?;
        created.push(recommendation);
    }

    tracing::info!(
        user_id = %user.id,
        preferred = %preferred,
        created = created.len(),
        "generated recommendations"
    );
    Ok(created)
}

fn with_details<S>(store: &S, recommendations: Vec<LearningRecommendation>) -> ServiceResult<Vec<RecommendationView>>
where
    S: CourseRepository + StudyResourceRepository,
{
    let mut courses: HashMap<Uuid, Course> = HashMap::new();
    let mut views = Vec::with_capacity(recommendations.len());
    for recommendation in recommendations {
        if !courses.contains_key(&recommendation.course_id) {
            match store.get_course(recommendation.course_id) {
                Ok(course) => {
                    courses.insert(course.id, course);
                }
                Err(StoreError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        let resource = match store.get_resource(recommendation.resource_id) {
            Ok(resource) => Some(resource),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        views.push(RecommendationView {
            course: courses.get(&recommendation.course_id).cloned(),
            resource,
            recommendation,
        });
    }
    Ok(views)
}

/// Highest priority first.
pub fn list_for_user<S>(store: &S, user_key: &str) -> ServiceResult<Vec<RecommendationView>>
where
    S: UserRepository + RecommendationRepository + CourseRepository + StudyResourceRepository,
{
    let user = resolve_user(store, user_key)?;
    let recommendations = store.list_recommendations_for_user(user.id)?;
    with_details(store, recommendations)
}

pub fn list_for_user_course<S>(store: &S, user_key: &str, course_id: Uuid) -> ServiceResult<Vec<RecommendationView>>
where
    S: UserRepository + RecommendationRepository + CourseRepository + StudyResourceRepository,
{
    let user = resolve_user(store, user_key)?;
    let recommendations = store.list_recommendations_for_user_course(user.id, course_id)?;
    with_details(store, recommendations)
}

pub fn create<S>(store: &S, input: NewRecommendation) -> ServiceResult<LearningRecommendation>
where
    S: UserRepository + CourseRepository + StudyResourceRepository + RecommendationRepository,
{
    let (Some(user_key), Some(course_id), Some(resource_id)) = (input.user.as_deref(), input.course_id, input.resource_id)
    else {
        return Err(ApiError::validation("Missing required fields"));
    };

    let user = resolve_user(store, user_key)?;
    store.get_course(course_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Course not found"),
        other => other.into(),
    })?;
    store.get_resource(resource_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Study resource not found"),
        other => other.into(),
    })?;

    let reason = input
        .reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "Based on your enrollment".to_string());
    let recommendation =
        LearningRecommendation::new(user.id, course_id, resource_id, reason, input.priority.unwrap_or(0));
    store.insert_recommendation(&recommendation)?;
    Ok(recommendation)
}

pub fn get<S: RecommendationRepository>(store: &S, id: Uuid) -> ServiceResult<LearningRecommendation> {
    store.get_recommendation(id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Recommendation not found"),
        other => other.into(),
    })
}

pub fn mark_completed<S: RecommendationRepository>(
    store: &S,
    id: Uuid,
    completed: Option<bool>,
) -> ServiceResult<LearningRecommendation> {
    get(store, id)?;
    Ok(store.set_recommendation_completed(id, completed.unwrap_or(true))?)
}

pub fn delete<S: RecommendationRepository>(store: &S, id: Uuid) -> ServiceResult<()> {
    if !store.delete_recommendation(id)? {
        return Err(ApiError::not_found("Recommendation not found"));
    }
    Ok(())
}

//! Reference data: courses, rooms and study resources.

use proctor_shared::ResourceType;
use proctor_store::{
    now, Course, CourseRepository, Room, RoomRepository, StoreError, StudyResource, StudyResourceRepository,
};
use uuid::Uuid;

use super::{required_text, ServiceResult};
use crate::error::ApiError;

fn not_found(what: &'static str) -> impl Fn(StoreError) -> ApiError {
    move |e| match e {
        StoreError::NotFound => ApiError::not_found(format!("{what} not found")),
        other => other.into(),
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

pub fn list_courses<S: CourseRepository>(store: &S) -> ServiceResult<Vec<Course>> {
    Ok(store.list_courses()?)
}

pub fn get_course<S: CourseRepository>(store: &S, id: Uuid) -> ServiceResult<Course> {
    store.get_course(id).map_err(not_found("Course"))
}

pub fn create_course<S: CourseRepository>(
    store: &S,
    code: Option<&str>,
    name: Option<&str>,
    department: Option<&str>,
) -> ServiceResult<Course> {
    let course = Course::new(
        required_text(code, "Course code is required")?,
        required_text(name, "Course name is required")?,
        required_text(department, "Department is required")?,
    );
    store.insert_course(&course)?;
    tracing::info!(course_id = %course.id, code = %course.code, "course created");
    Ok(course)
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

pub fn list_rooms<S: RoomRepository>(store: &S) -> ServiceResult<Vec<Room>> {
    Ok(store.list_rooms()?)
}

pub fn get_room<S: RoomRepository>(store: &S, id: Uuid) -> ServiceResult<Room> {
    store.get_room(id).map_err(not_found("Room"))
}

pub fn create_room<S: RoomRepository>(
    store: &S,
    building: Option<&str>,
    number: Option<&str>,
    capacity: Option<i64>,
) -> ServiceResult<Room> {
    let building = required_text(building, "Building is required")?;
    let number = required_text(number, "Room number is required")?;
    let capacity = match capacity {
        Some(capacity) if capacity > 0 => capacity,
        _ => return Err(ApiError::validation("Capacity must be a positive number")),
    };

    let room = Room::new(building, number, capacity);
    store.insert_room(&room)?;
    tracing::info!(room_id = %room.id, room = %room.label(), "room created");
    Ok(room)
}

// ---------------------------------------------------------------------------
// Study resources
// ---------------------------------------------------------------------------

/// Resource fields as submitted. On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ResourceDraft {
    pub course_id: Option<Uuid>,
    pub resource_type: Option<ResourceType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

pub fn list_resources<S: StudyResourceRepository>(store: &S) -> ServiceResult<Vec<StudyResource>> {
    Ok(store.list_resources()?)
}

pub fn list_resources_for_course<S>(store: &S, course_id: Uuid) -> ServiceResult<Vec<StudyResource>>
where
    S: CourseRepository + StudyResourceRepository,
{
    get_course(store, course_id)?;
    Ok(store.list_resources_for_course(course_id)?)
}

pub fn get_resource<S: StudyResourceRepository>(store: &S, id: Uuid) -> ServiceResult<StudyResource> {
    store.get_resource(id).map_err(not_found("Study resource"))
}

pub fn create_resource<S>(store: &S, draft: ResourceDraft) -> ServiceResult<StudyResource>
where
    S: CourseRepository + StudyResourceRepository,
{
    let course_id = draft
        .course_id
        .ok_or_else(|| ApiError::validation("Course ID is required"))?;
    let resource_type = draft
        .resource_type
        .ok_or_else(|| ApiError::validation("Resource type is required"))?;
    let title = required_text(draft.title.as_deref(), "Title is required")?;
    let url = required_text(draft.url.as_deref(), "URL is required")?;
    get_course(store, course_id)?;

    let resource = StudyResource::new(course_id, resource_type, title, draft.description.unwrap_or_default(), url);
    store.insert_resource(&resource)?;
    tracing::info!(resource_id = %resource.id, course_id = %course_id, "study resource created");
    Ok(resource)
}

pub fn update_resource<S>(store: &S, id: Uuid, draft: ResourceDraft) -> ServiceResult<StudyResource>
where
    S: CourseRepository + StudyResourceRepository,
{
    let stored = get_resource(store, id)?;
    if let Some(course_id) = draft.course_id {
        get_course(store, course_id)?;
    }

    let title = match draft.title {
        Some(title) => required_text(Some(&title), "Title is required")?,
        None => stored.title.clone(),
    };
    let url = match draft.url {
        Some(url) => required_text(Some(&url), "URL is required")?,
        None => stored.url.clone(),
    };

    let resource = StudyResource {
        course_id: draft.course_id.unwrap_or(stored.course_id),
        resource_type: draft.resource_type.unwrap_or(stored.resource_type),
        title,
        description: draft.description.unwrap_or_else(|| stored.description.clone()),
        url,
        updated_at: now(),
        ..stored
    };
    store.update_resource(&resource)?;
    Ok(resource)
}

pub fn delete_resource<S: StudyResourceRepository>(store: &S, id: Uuid) -> ServiceResult<()> {
    if !store.delete_resource(id)? {
        return Err(ApiError::not_found("Study resource not found"));
    }
    Ok(())
}

//! Courses, rooms and study resources. Reads are open to any signed-in
//! user; writes are admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use proctor_shared::ResourceType;
use proctor_store::{Course, Room, StudyResource};
use serde::Deserialize;
use uuid::Uuid;

use super::{created, parse_id, success, success_message, ApiJson, ApiResult, AppState, Envelope};
use crate::auth::{AdminContext, AuthContext};
use crate::error::ApiError;
use crate::services::catalog::{self, ResourceDraft};

type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    code: Option<String>,
    name: Option<String>,
    department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomRequest {
    building: Option<String>,
    number: Option<String>,
    capacity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequest {
    course_id: Option<Uuid>,
    #[serde(rename = "type")]
    resource_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

impl ResourceRequest {
    fn into_draft(self) -> Result<ResourceDraft, ApiError> {
        Ok(ResourceDraft {
            course_id: self.course_id,
            resource_type: self
                .resource_type
                .as_deref()
                .map(str::parse::<ResourceType>)
                .transpose()?,
            title: self.title,
            description: self.description,
            url: self.url,
        })
    }
}

// courses

pub async fn list_courses(State(state): State<AppState>, _auth: AuthContext) -> ApiResult<Vec<Course>> {
    let db = state.db.lock().await;
    Ok(success(catalog::list_courses(&*db)?))
}

pub async fn get_course(State(state): State<AppState>, _auth: AuthContext, Path(id): Path<String>) -> ApiResult<Course> {
    let id = parse_id(&id, "Course")?;
    let db = state.db.lock().await;
    Ok(success(catalog::get_course(&*db, id)?))
}

pub async fn create_course(
    State(state): State<AppState>,
    _admin: AdminContext,
    ApiJson(body): ApiJson<CourseRequest>,
) -> Created<Course> {
    let db = state.db.lock().await;
    let course = catalog::create_course(
        &*db,
        body.code.as_deref(),
        body.name.as_deref(),
        body.department.as_deref(),
    )?;
    Ok(created(course))
}

// rooms

pub async fn list_rooms(State(state): State<AppState>, _auth: AuthContext) -> ApiResult<Vec<Room>> {
    let db = state.db.lock().await;
    Ok(success(catalog::list_rooms(&*db)?))
}

pub async fn get_room(State(state): State<AppState>, _auth: AuthContext, Path(id): Path<String>) -> ApiResult<Room> {
    let id = parse_id(&id, "Room")?;
    let db = state.db.lock().await;
    Ok(success(catalog::get_room(&*db, id)?))
}

pub async fn create_room(
    State(state): State<AppState>,
    _admin: AdminContext,
    ApiJson(body): ApiJson<RoomRequest>,
) -> Created<Room> {
    let db = state.db.lock().await;
    let room = catalog::create_room(&*db, body.building.as_deref(), body.number.as_deref(), body.capacity)?;
    Ok(created(room))
}

// study resources

pub async fn list_resources(State(state): State<AppState>, _auth: AuthContext) -> ApiResult<Vec<StudyResource>> {
    let db = state.db.lock().await;
    Ok(success(catalog::list_resources(&*db)?))
}

pub async fn list_resources_for_course(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(course_id): Path<String>,
) -> ApiResult<Vec<StudyResource>> {
    let course_id = parse_id(&course_id, "Course")?;
    let db = state.db.lock().await;
    Ok(success(catalog::list_resources_for_course(&*db, course_id)?))
}

pub async fn get_resource(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<StudyResource> {
    let id = parse_id(&id, "Study resource")?;
    let db = state.db.lock().await;
    Ok(success(catalog::get_resource(&*db, id)?))
}

pub async fn create_resource(
    State(state): State<AppState>,
    _admin: AdminContext,
    ApiJson(body): ApiJson<ResourceRequest>,
) -> Created<StudyResource> {
    let draft = body.into_draft()?;
    let db = state.db.lock().await;
    Ok(created(catalog::create_resource(&*db, draft)?))
}

pub async fn update_resource(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ResourceRequest>,
) -> ApiResult<StudyResource> {
    let id = parse_id(&id, "Study resource")?;
    let draft = body.into_draft()?;
    let db = state.db.lock().await;
    Ok(success(catalog::update_resource(&*db, id, draft)?))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Study resource")?;
    let db = state.db.lock().await;
    catalog::delete_resource(&*db, id)?;
    Ok(success_message("Study resource deleted successfully"))
}

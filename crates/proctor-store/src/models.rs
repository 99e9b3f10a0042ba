//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so it can be handed directly to the HTTP layer.

use chrono::{DateTime, SubsecRound, Utc};
use proctor_shared::conflict::{TimeWindow, Window};
use proctor_shared::{ExamStatus, ResourceType, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current time at the precision the store keeps, so freshly built records
/// compare equal to what reading them back returns.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A person known to the scheduler, mirrored from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Subject identifier issued by the identity provider. Never changes.
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        external_id: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            external_id: external_id.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    /// Catalog code, e.g. `CS101`. Unique.
    pub code: String,
    pub name: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(code: impl Into<String>, name: impl Into<String>, department: impl Into<String>) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            department: department.into(),
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// An exam venue. `(building, number)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub building: String,
    pub number: String,
    pub capacity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn new(building: impl Into<String>, number: impl Into<String>, capacity: i64) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            building: building.into(),
            number: number.into(),
            capacity,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    /// `"Main Building, Room 101"`
    pub fn label(&self) -> String {
        format!("{}, Room {}", self.building, self.number)
    }
}

// ---------------------------------------------------------------------------
// Exam
// ---------------------------------------------------------------------------

/// A sitting of one course's exam. `start_time < end_time` always holds for
/// stored exams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: Uuid,
    pub course_id: Uuid,
    pub room_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ExamStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exam {
    pub fn new(course_id: Uuid, room_id: Option<Uuid>, window: Window, status: ExamStatus) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            course_id,
            room_id,
            start_time: window.start_time.trunc_subsecs(3),
            end_time: window.end_time.trunc_subsecs(3),
            status,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    pub fn window(&self) -> Window {
        Window::new(self.start_time, self.end_time)
    }
}

impl TimeWindow for Exam {
    fn starts_at(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn ends_at(&self) -> DateTime<Utc> {
        self.end_time
    }
}

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

/// A student taking a course in a semester. `(user_id, course_id, semester)`
/// is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub semester: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(user_id: Uuid, course_id: Uuid, semester: impl Into<String>) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            semester: semester.into(),
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Study resource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudyResource {
    pub id: Uuid,
    pub course_id: Uuid,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub title: String,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudyResource {
    pub fn new(
        course_id: Uuid,
        resource_type: ResourceType,
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            course_id,
            resource_type,
            title: title.into(),
            description: description.into(),
            url: url.into(),
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Learning preference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferred_type: ResourceType,
    /// Minutes per study session.
    pub study_duration: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningPreference {
    pub fn new(user_id: Uuid, preferred_type: ResourceType, study_duration: i64) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            preferred_type,
            study_duration,
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Learning recommendation
// ---------------------------------------------------------------------------

/// A study resource suggested to a user. Higher priority sorts first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningRecommendation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub resource_id: Uuid,
    pub reason: String,
    pub priority: i64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningRecommendation {
    pub fn new(user_id: Uuid, course_id: Uuid, resource_id: Uuid, reason: impl Into<String>, priority: i64) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            resource_id,
            reason: reason.into(),
            priority,
            completed: false,
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

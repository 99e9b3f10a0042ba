//! One repository trait per entity.
//!
//! [`Database`](crate::Database) implements all of them; services take
//! whichever subset they need as generic bounds.

use proctor_shared::Role;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

pub trait UserRepository {
    /// Fails with `Conflict` when the external id or email is taken.
    fn insert_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: Uuid) -> Result<User>;
    fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn update_user_role(&self, id: Uuid, role: Role) -> Result<User>;
}

pub trait CourseRepository {
    /// Fails with `Conflict` when the code is taken.
    fn insert_course(&self, course: &Course) -> Result<()>;
    fn get_course(&self, id: Uuid) -> Result<Course>;
    fn find_course_by_code(&self, code: &str) -> Result<Option<Course>>;
    /// Ordered by code.
    fn list_courses(&self) -> Result<Vec<Course>>;
}

pub trait RoomRepository {
    /// Fails with `Conflict` when building + number is taken.
    fn insert_room(&self, room: &Room) -> Result<()>;
    fn get_room(&self, id: Uuid) -> Result<Room>;
    fn find_room(&self, building: &str, number: &str) -> Result<Option<Room>>;
    /// Ordered by building, then number.
    fn list_rooms(&self) -> Result<Vec<Room>>;
}

pub trait ExamRepository {
    fn insert_exam(&self, exam: &Exam) -> Result<()>;
    fn get_exam(&self, id: Uuid) -> Result<Exam>;
    /// Overwrites every mutable column. `NotFound` if the id is unknown.
    fn update_exam(&self, exam: &Exam) -> Result<()>;
    /// Returns `true` if a row was deleted.
    fn delete_exam(&self, id: Uuid) -> Result<bool>;
    /// Insertion order.
    fn list_exams(&self) -> Result<Vec<Exam>>;
    fn list_exams_for_course(&self, course_id: Uuid) -> Result<Vec<Exam>>;
    /// Ordered by start time ascending.
    fn list_exams_for_courses(&self, course_ids: &[Uuid]) -> Result<Vec<Exam>>;
    fn list_exams_in_room(&self, room_id: Uuid) -> Result<Vec<Exam>>;
}

pub trait EnrollmentRepository {
    /// Fails with `Conflict` when the (user, course, semester) triple exists.
    fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<()>;
    fn get_enrollment(&self, id: Uuid) -> Result<Enrollment>;
    fn find_enrollment(&self, user_id: Uuid, course_id: Uuid, semester: &str) -> Result<Option<Enrollment>>;
    fn list_enrollments_for_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>>;
    fn delete_enrollment(&self, id: Uuid) -> Result<bool>;
}

pub trait StudyResourceRepository {
    fn insert_resource(&self, resource: &StudyResource) -> Result<()>;
    fn get_resource(&self, id: Uuid) -> Result<StudyResource>;
    fn update_resource(&self, resource: &StudyResource) -> Result<()>;
    fn delete_resource(&self, id: Uuid) -> Result<bool>;
    fn list_resources(&self) -> Result<Vec<StudyResource>>;
    fn list_resources_for_course(&self, course_id: Uuid) -> Result<Vec<StudyResource>>;
    /// Insertion order.
    fn list_resources_for_courses(&self, course_ids: &[Uuid]) -> Result<Vec<StudyResource>>;
}

pub trait PreferenceRepository {
    fn insert_preference(&self, preference: &LearningPreference) -> Result<()>;
    fn get_preference(&self, id: Uuid) -> Result<LearningPreference>;
    fn update_preference(&self, preference: &LearningPreference) -> Result<()>;
    fn delete_preference(&self, id: Uuid) -> Result<bool>;
    /// Insertion order; the first row is the effective preference.
    fn list_preferences_for_user(&self, user_id: Uuid) -> Result<Vec<LearningPreference>>;
}

pub trait RecommendationRepository {
    fn insert_recommendation(&self, recommendation: &LearningRecommendation) -> Result<()>;
    fn get_recommendation(&self, id: Uuid) -> Result<LearningRecommendation>;
    /// Highest priority first.
    fn list_recommendations_for_user(&self, user_id: Uuid) -> Result<Vec<LearningRecommendation>>;
    fn list_recommendations_for_user_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<LearningRecommendation>>;
    fn set_recommendation_completed(&self, id: Uuid, completed: bool) -> Result<LearningRecommendation>;
    fn delete_recommendation(&self, id: Uuid) -> Result<bool>;
}

/// Every repository at once, for callers that touch the whole model.
pub trait Store:
    UserRepository
    + CourseRepository
    + RoomRepository
    + ExamRepository
    + EnrollmentRepository
    + StudyResourceRepository
    + PreferenceRepository
    + RecommendationRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + CourseRepository
        + RoomRepository
        + ExamRepository
        + EnrollmentRepository
        + StudyResourceRepository
        + PreferenceRepository
        + RecommendationRepository
{
}

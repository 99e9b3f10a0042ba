use proctor_store::{Course, CourseRepository, Enrollment, EnrollmentRepository, StoreError, UserRepository};
use serde::Serialize;
use uuid::Uuid;

use super::users::resolve_user;
use super::{required_text, ServiceResult};
use crate::error::ApiError;

const ALREADY_ENROLLED: &str = "User is already enrolled in this course for the specified semester";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Option<Course>,
}

pub fn enroll<S>(
    store: &S,
    user_key: &str,
    course_id: Option<Uuid>,
    semester: Option<&str>,
) -> ServiceResult<EnrollmentView>
where
    S: UserRepository + CourseRepository + EnrollmentRepository,
{
    let course_id = course_id.ok_or_else(|| ApiError::validation("Course ID is required"))?;
    let semester = required_text(semester, "Semester is required")?;

    let user = resolve_user(store, user_key)?;
    let course = store.get_course(course_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Course not found"),
        other => other.into(),
    })?;

    if store.find_enrollment(user.id, course.id, &semester)?.is_some() {
        return Err(ApiError::Conflict(ALREADY_ENROLLED.into()));
    }

    let enrollment = Enrollment::new(user.id, course.id, semester);
    // a racing request can still win between the check and the insert
    store.insert_enrollment(&enrollment).map_err(|e| match e {
        StoreError::Conflict(_) => ApiError::Conflict(ALREADY_ENROLLED.into()),
        other => other.into(),
    })?;

    tracing::info!(user_id = %user.id, course = %course.code, semester = %enrollment.semester, "user enrolled");
    Ok(EnrollmentView {
        enrollment,
        course: Some(course),
    })
}

/// Remove an enrollment, returning it.
pub fn unenroll<S: EnrollmentRepository>(store: &S, enrollment_id: Uuid) -> ServiceResult<Enrollment> {
    let enrollment = get(store, enrollment_id)?;
    store.delete_enrollment(enrollment_id)?;
    tracing::info!(enrollment_id = %enrollment_id, "user unenrolled");
    Ok(enrollment)
}

pub fn get<S: EnrollmentRepository>(store: &S, enrollment_id: Uuid) -> ServiceResult<Enrollment> {
    store.get_enrollment(enrollment_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Enrollment not found"),
        other => other.into(),
    })
}

pub fn list_for_user<S>(store: &S, user_key: &str) -> ServiceResult<Vec<EnrollmentView>>
where
    S: UserRepository + CourseRepository + EnrollmentRepository,
{
    let user = resolve_user(store, user_key)?;
    store
        .list_enrollments_for_user(user.id)?
        .into_iter()
        .map(|enrollment| {
            let course = match store.get_course(enrollment.course_id) {
                Ok(course) => Some(course),
                Err(StoreError::NotFound) => None,
                Err(e) => return Err(ApiError::from(e)),
            };
            Ok(EnrollmentView { enrollment, course })
        })
        .collect()
}

/// Every course, ordered by code.
pub fn available_courses<S: CourseRepository>(store: &S) -> ServiceResult<Vec<Course>> {
    Ok(store.list_courses()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proctor_shared::Role;
    use proctor_store::{Database, User};

    fn fixture() -> (Database, User, Course) {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("user_1", "s@uni.edu", "S", "T", Role::Student);
        let course = Course::new("CS101", "Intro", "CS");
        db.insert_user(&user).unwrap();
        db.insert_course(&course).unwrap();
        (db, user, course)
    }

    #[test]
    fn test_enrolling_twice_conflicts() {
        let (db, user, course) = fixture();

        let view = enroll(&db, "user_1", Some(course.id), Some("Fall 2025")).unwrap();
        assert_eq!(view.course.as_ref().map(|c| c.id), Some(course.id));

        let err = enroll(&db, &user.id.to_string(), Some(course.id), Some("Fall 2025")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(m) if m == ALREADY_ENROLLED));
        assert_eq!(db.list_enrollments_for_user(user.id).unwrap().len(), 1);
    }

    #[test]
    fn test_enroll_validation() {
        let (db, _, course) = fixture();
        assert!(matches!(
            enroll(&db, "user_1", None, Some("Fall 2025")),
            Err(ApiError::Validation(m)) if m == "Course ID is required"
        ));
        assert!(matches!(
            enroll(&db, "user_1", Some(course.id), Some("  ")),
            Err(ApiError::Validation(m)) if m == "Semester is required"
        ));
        assert!(matches!(
            enroll(&db, "ghost", Some(course.id), Some("Fall 2025")),
            Err(ApiError::NotFound(m)) if m == "User not found"
        ));
        assert!(matches!(
            enroll(&db, "user_1", Some(Uuid::new_v4()), Some("Fall 2025")),
            Err(ApiError::NotFound(m)) if m == "Course not found"
        ));
    }

    #[test]
    fn test_unenroll_missing_has_no_side_effects() {
        let (db, user, course) = fixture();
        let view = enroll(&db, "user_1", Some(course.id), Some("Fall 2025")).unwrap();

        assert!(matches!(unenroll(&db, Uuid::new_v4()), Err(ApiError::NotFound(_))));
        assert_eq!(list_for_user(&db, "user_1").unwrap().len(), 1);

        unenroll(&db, view.enrollment.id).unwrap();
        assert!(db.list_enrollments_for_user(user.id).unwrap().is_empty());
    }

    #[test]
    fn test_available_courses_by_code() {
        let (db, _, _) = fixture();
        db.insert_course(&Course::new("BIO110", "Cells", "Biology")).unwrap();
        let codes: Vec<String> = available_courses(&db).unwrap().into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["BIO110", "CS101"]);
    }
}

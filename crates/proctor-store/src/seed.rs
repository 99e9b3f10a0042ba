//! Demo data for local runs.
//!
//! Every step checks for what already exists, so seeding an already seeded
//! database is a no-op.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proctor_shared::{ExamStatus, ResourceType, Role, Window};

use crate::error::Result;
use crate::models::*;
use crate::repo::Store;

pub const DEMO_ADMIN_EXTERNAL_ID: &str = "demo|admin";
pub const DEMO_STUDENT_EXTERNAL_ID: &str = "demo|student";
pub const DEMO_SEMESTER: &str = "Spring 2025";

const COURSES: [(&str, &str, &str); 4] = [
    ("CS101", "Introduction to Computer Science", "Computer Science"),
    ("MATH201", "Calculus II", "Mathematics"),
    ("ENG105", "Academic Writing", "English"),
    ("BIO110", "Cell Biology", "Biology"),
];

const ROOMS: [(&str, &str, i64); 4] = [
    ("Main Building", "101", 120),
    ("Main Building", "204", 60),
    ("Science Hall", "B12", 80),
    ("Library", "3A", 40),
];

const RESOURCE_TYPES: [ResourceType; 5] = [
    ResourceType::Video,
    ResourceType::Article,
    ResourceType::PracticeQuiz,
    ResourceType::Textbook,
    ResourceType::Notes,
];

/// Counts of rows created by one [`seed_demo_data`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub courses: usize,
    pub rooms: usize,
    pub exams: usize,
    pub enrollments: usize,
    pub resources: usize,
    pub preferences: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.users + self.courses + self.rooms + self.exams + self.enrollments + self.resources + self.preferences
    }
}

pub fn seed_demo_data<S: Store>(store: &S) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let _admin = ensure_user(store, &mut report, DEMO_ADMIN_EXTERNAL_ID, "admin@university.edu", "Grace", "Hopper", Role::Admin)?;
    let student = ensure_user(
        store,
        &mut report,
        DEMO_STUDENT_EXTERNAL_ID,
        "student@university.edu",
        "Alan",
        "Turing",
        Role::Student,
    )?;

    let mut rooms = Vec::with_capacity(ROOMS.len());
    for (building, number, capacity) in ROOMS {
        let room = match store.find_room(building, number)? {
            Some(room) => room,
            None => {
                let room = Room::new(building, number, capacity);
                store.insert_room(&room)?;
                report.rooms += 1;
                room
            }
        };
        rooms.push(room);
    }

    let first_day = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap_or_default();
    for (i, (code, name, department)) in COURSES.into_iter().enumerate() {
        let course = match store.find_course_by_code(code)? {
            Some(course) => course,
            None => {
                let course = Course::new(code, name, department);
                store.insert_course(&course)?;
                report.courses += 1;
                course
            }
        };

        if store.find_enrollment(student.id, course.id, DEMO_SEMESTER)?.is_none() {
            store.insert_enrollment(&Enrollment::new(student.id, course.id, DEMO_SEMESTER))?;
            report.enrollments += 1;
        }

        if store.list_exams_for_course(course.id)?.is_empty() {
            let day = first_day + Duration::days(i as i64);
            let start = Utc.from_utc_datetime(&day.and_hms_opt(10, 0, 0).unwrap_or_default());
            let room = rooms.get(i).map(|r| r.id);
            let exam = Exam::new(course.id, room, Window::new(start, start + Duration::hours(2)), ExamStatus::Scheduled);
            store.insert_exam(&exam)?;
            report.exams += 1;
        }

        if store.list_resources_for_course(course.id)?.is_empty() {
            for resource_type in RESOURCE_TYPES {
                let slug = resource_type.as_str().to_lowercase().replace('_', "-");
                let resource = StudyResource::new(
                    course.id,
                    resource_type,
                    format!("{} {}", course.code, resource_label(resource_type)),
                    format!("{} for {}", resource_label(resource_type), course.name),
                    format!("https://resources.university.edu/{}/{}", course.code.to_lowercase(), slug),
                );
                store.insert_resource(&resource)?;
                report.resources += 1;
            }
        }
    }

    if store.list_preferences_for_user(student.id)?.is_empty() {
        store.insert_preference(&LearningPreference::new(student.id, ResourceType::Video, 60))?;
        report.preferences += 1;
    }

    tracing::info!(created = report.total(), "demo data seeded");
    Ok(report)
}

fn ensure_user<S: Store>(
    store: &S,
    report: &mut SeedReport,
    external_id: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
) -> Result<User> {
    if let Some(user) = store.find_user_by_external_id(external_id)? {
        return Ok(user);
    }
    let user = User::new(external_id, email, first_name, last_name, role);
    store.insert_user(&user)?;
    report.users += 1;
    Ok(user)
}

fn resource_label(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::Video => "Lecture Video",
        ResourceType::Article => "Review Article",
        ResourceType::PracticeQuiz => "Practice Quiz",
        ResourceType::Flashcards => "Flashcards",
        ResourceType::Textbook => "Textbook Chapter",
        ResourceType::Notes => "Lecture Notes",
        ResourceType::Other => "Extra Material",
    }
}

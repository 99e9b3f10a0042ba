//! Exam listings and the student schedule: day grouping, conflict flags,
//! next-exam countdown and iCal export.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use proctor_shared::ical::{render_calendar, CalendarExam};
use proctor_shared::schedule::{group_by_day, next_after, Countdown, DayTiming};
use proctor_shared::{find_conflicts, TimeWindow};
use proctor_store::{
    Course, CourseRepository, EnrollmentRepository, Exam, ExamRepository, Room, RoomRepository, StoreError,
    UserRepository,
};
use serde::Serialize;
use uuid::Uuid;

use super::scheduling::get_exam;
use super::users::resolve_user;
use super::ServiceResult;

/// An exam with its course and room resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamView {
    #[serde(flatten)]
    pub exam: Exam,
    pub course: Option<Course>,
    pub room: Option<Room>,
}

impl TimeWindow for ExamView {
    fn starts_at(&self) -> DateTime<Utc> {
        self.exam.start_time
    }

    fn ends_at(&self) -> DateTime<Utc> {
        self.exam.end_time
    }
}

impl ExamView {
    fn to_calendar(&self) -> CalendarExam {
        let (course_code, course_name) = match &self.course {
            Some(course) => (course.code.clone(), course.name.clone()),
            None => (String::from("Unknown"), String::from("Unknown course")),
        };
        CalendarExam {
            exam_id: self.exam.id,
            start_time: self.exam.start_time,
            end_time: self.exam.end_time,
            course_code,
            course_name,
            location: self.room.as_ref().map(Room::label),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryView {
    #[serde(flatten)]
    pub exam: ExamView,
    pub has_conflict: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDayView {
    pub day: NaiveDate,
    pub timing: DayTiming,
    pub exams: Vec<ScheduleEntryView>,
}

/// Ids of two exams whose windows overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictView {
    pub first_exam_id: Uuid,
    pub second_exam_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextExamView {
    pub exam: ExamView,
    pub countdown: Countdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub days: Vec<ScheduleDayView>,
    pub conflicts: Vec<ConflictView>,
    pub next_exam: Option<NextExamView>,
}

fn with_details<S>(store: &S, exams: Vec<Exam>) -> ServiceResult<Vec<ExamView>>
where
    S: CourseRepository + RoomRepository,
{
    let mut courses: HashMap<Uuid, Option<Course>> = HashMap::new();
    let mut rooms: HashMap<Uuid, Option<Room>> = HashMap::new();

    let mut views = Vec::with_capacity(exams.len());
    for exam in exams {
        if !courses.contains_key(&exam.course_id) {
            let course = match store.get_course(exam.course_id) {
                Ok(course) => Some(course),
                Err(StoreError::NotFound) => None,
                Err(e) => return Err(e.into()),
            };
            courses.insert(exam.course_id, course);
        }
        if let Some(room_id) = exam.room_id {
            if !rooms.contains_key(&room_id) {
                let room = match store.get_room(room_id) {
                    Ok(room) => Some(room),
                    Err(StoreError::NotFound) => None,
                    Err(e) => return Err(e.into()),
                };
                rooms.insert(room_id, room);
            }
        }

        views.push(ExamView {
            course: courses.get(&exam.course_id).cloned().flatten(),
            room: exam.room_id.and_then(|id| rooms.get(&id).cloned().flatten()),
            exam,
        });
    }
    Ok(views)
}

pub fn list_exams<S>(store: &S) -> ServiceResult<Vec<ExamView>>
where
    S: ExamRepository + CourseRepository + RoomRepository,
{
    with_details(store, store.list_exams()?)
}

pub fn exam_view<S>(store: &S, id: Uuid) -> ServiceResult<ExamView>
where
    S: ExamRepository + CourseRepository + RoomRepository,
{
    let exam = get_exam(store, id)?;
    let mut views = with_details(store, vec![exam])?;
    Ok(views.remove(0))
}

pub fn exams_for_course<S>(store: &S, course_id: Uuid) -> ServiceResult<Vec<ExamView>>
where
    S: ExamRepository + CourseRepository + RoomRepository,
{
    with_details(store, store.list_exams_for_course(course_id)?)
}

/// Exams of every course the user is enrolled in, earliest first.
pub fn exams_for_user<S>(store: &S, user_key: &str) -> ServiceResult<Vec<ExamView>>
where
    S: UserRepository + EnrollmentRepository + ExamRepository + CourseRepository + RoomRepository,
{
    let user = resolve_user(store, user_key)?;
    let mut course_ids: Vec<Uuid> = store
        .list_enrollments_for_user(user.id)?
        .into_iter()
        .map(|e| e.course_id)
        .collect();
    course_ids.sort();
    course_ids.dedup();

    with_details(store, store.list_exams_for_courses(&course_ids)?)
}

pub fn build_schedule(exams: &[ExamView], now: DateTime<Utc>, tz: FixedOffset) -> ScheduleView {
    let conflicts = find_conflicts(exams)
        .into_iter()
        .map(|pair| ConflictView {
            first_exam_id: pair.first.exam.id,
            second_exam_id: pair.second.exam.id,
        })
        .collect();

    let days = group_by_day(exams, now, tz)
        .into_iter()
        .map(|day| ScheduleDayView {
            day: day.day,
            timing: day.timing,
            exams: day
                .entries
                .into_iter()
                .map(|entry| ScheduleEntryView {
                    exam: entry.item,
                    has_conflict: entry.has_conflict,
                })
                .collect(),
        })
        .collect();

    let next_exam = next_after(exams, now).and_then(|exam| {
        Countdown::between(now, exam.exam.start_time).map(|countdown| NextExamView {
            exam: exam.clone(),
            countdown,
        })
    });

    ScheduleView {
        days,
        conflicts,
        next_exam,
    }
}

pub fn schedule_for_user<S>(store: &S, user_key: &str, now: DateTime<Utc>, tz: FixedOffset) -> ServiceResult<ScheduleView>
where
    S: UserRepository + EnrollmentRepository + ExamRepository + CourseRepository + RoomRepository,
{
    let exams = exams_for_user(store, user_key)?;
    Ok(build_schedule(&exams, now, tz))
}

pub fn calendar_for_user<S>(store: &S, user_key: &str, stamp: DateTime<Utc>) -> ServiceResult<String>
where
    S: UserRepository + EnrollmentRepository + ExamRepository + CourseRepository + RoomRepository,
{
    let exams = exams_for_user(store, user_key)?;
    let events: Vec<CalendarExam> = exams.iter().map(ExamView::to_calendar).collect();
    Ok(render_calendar(&events, stamp))
}

/// The user's earliest exam starting after `now`.
pub fn next_exam_for_user<S>(store: &S, user_key: &str, now: DateTime<Utc>) -> ServiceResult<Option<ExamView>>
where
    S: UserRepository + EnrollmentRepository + ExamRepository + CourseRepository + RoomRepository,
{
    let exams = exams_for_user(store, user_key)?;
    Ok(next_after(&exams, now).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proctor_shared::{ExamStatus, Role, Window};
    use proctor_store::{Database, Enrollment, User};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0).unwrap()
    }

    struct Fixture {
        db: Database,
        cs: Course,
        math: Course,
        room: Room,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("user_1", "s@uni.edu", "S", "T", Role::Student);
        let cs = Course::new("CS101", "Introduction to Computer Science", "CS");
        let math = Course::new("MATH201", "Calculus II", "Math");
        let room = Room::new("Main Building", "101", 50);
        db.insert_user(&user).unwrap();
        db.insert_course(&cs).unwrap();
        db.insert_course(&math).unwrap();
        db.insert_room(&room).unwrap();
        db.insert_enrollment(&Enrollment::new(user.id, cs.id, "Spring 2025")).unwrap();
        db.insert_enrollment(&Enrollment::new(user.id, math.id, "Spring 2025")).unwrap();
        Fixture { db, cs, math, room }
    }

    fn add_exam(f: &Fixture, course: &Course, room: Option<&Room>, start: DateTime<Utc>, end: DateTime<Utc>) -> Exam {
        let exam = Exam::new(course.id, room.map(|r| r.id), Window::new(start, end), ExamStatus::Scheduled);
        f.db.insert_exam(&exam).unwrap();
        exam
    }

    #[test]
    fn test_user_exams_sorted_with_details() {
        let f = fixture();
        let late = add_exam(&f, &f.cs, Some(&f.room), at(22, 10), at(22, 12));
        let early = add_exam(&f, &f.math, None, at(20, 9), at(20, 11));
        let other = Course::new("BIO110", "Cells", "Bio");
        f.db.insert_course(&other).unwrap();
        add_exam(&f, &other, None, at(19, 9), at(19, 11));

        let exams = exams_for_user(&f.db, "user_1").unwrap();
        let ids: Vec<Uuid> = exams.iter().map(|e| e.exam.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
        assert_eq!(exams[1].course.as_ref().map(|c| c.code.as_str()), Some("CS101"));
        assert_eq!(exams[1].room.as_ref().map(Room::label).as_deref(), Some("Main Building, Room 101"));
        assert!(exams[0].room.is_none());
    }

    #[test]
    fn test_schedule_flags_conflicts_and_next_exam() {
        let f = fixture();
        let a = add_exam(&f, &f.cs, Some(&f.room), at(20, 10), at(20, 12));
        let b = add_exam(&f, &f.math, None, at(20, 11), at(20, 13));
        let c = add_exam(&f, &f.math, None, at(21, 9), at(21, 10));

        let tz = FixedOffset::east_opt(0).unwrap();
        let schedule = schedule_for_user(&f.db, "user_1", at(20, 10), tz).unwrap();

        assert_eq!(schedule.days.len(), 2);
        assert_eq!(schedule.days[0].timing, DayTiming::Today);
        assert_eq!(schedule.days[1].timing, DayTiming::Upcoming);
        let flags: Vec<bool> = schedule.days[0].exams.iter().map(|e| e.has_conflict).collect();
        assert_eq!(flags, vec![true, true]);
        assert!(!schedule.days[1].exams[0].has_conflict);
        assert_eq!(
            schedule.conflicts,
            vec![ConflictView {
                first_exam_id: a.id,
                second_exam_id: b.id
            }]
        );

        // a started at exactly now, so b is next
        let next = schedule.next_exam.unwrap();
        assert_eq!(next.exam.exam.id, b.id);
        assert_eq!(next.countdown.hours, 1);

        let later = next_exam_for_user(&f.db, "user_1", at(20, 12)).unwrap().unwrap();
        assert_eq!(later.exam.id, c.id);
        assert!(next_exam_for_user(&f.db, "user_1", at(30, 0)).unwrap().is_none());
    }

    #[test]
    fn test_calendar_export() {
        let f = fixture();
        add_exam(&f, &f.cs, Some(&f.room), at(20, 10), at(20, 12));
        add_exam(&f, &f.math, None, at(21, 10), at(21, 12));

        let doc = calendar_for_user(&f.db, "user_1", at(1, 8)).unwrap();
        assert!(doc.contains("SUMMARY:CS101 Exam\r\n"));
        assert!(doc.contains("DESCRIPTION:Exam for Calculus II\r\n"));
        assert!(doc.contains("LOCATION:TBD\r\n"));
        assert_eq!(doc.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn test_schedule_serializes_camel_case() {
        let f = fixture();
        add_exam(&f, &f.cs, Some(&f.room), at(20, 10), at(20, 12));
        let tz = FixedOffset::east_opt(0).unwrap();
        let schedule = schedule_for_user(&f.db, "user_1", at(1, 0), tz).unwrap();

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["days"][0]["day"], "2025-05-20");
        assert_eq!(json["days"][0]["timing"], "UPCOMING");
        assert_eq!(json["days"][0]["exams"][0]["hasConflict"], false);
        assert_eq!(json["days"][0]["exams"][0]["course"]["code"], "CS101");
        assert!(json["days"][0]["exams"][0]["startTime"].is_string());
        assert_eq!(json["nextExam"]["countdown"]["days"], 19);
    }
}

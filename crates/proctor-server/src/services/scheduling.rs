//! Admin exam scheduling: validation, the room conflict gate, and
//! drag-reschedule.
//!
//! Every check runs before anything is written. A successful write invokes
//! the caller's refresh callback with the resulting exam; a failed one
//! returns the error and leaves the callback untouched.

use chrono::{DateTime, FixedOffset, SubsecRound, Utc};
use proctor_shared::conflict::conflicting_with;
use proctor_shared::reschedule::{relocate, DropTarget, Reschedule};
use proctor_shared::{ExamStatus, Window};
use proctor_store::{now, CourseRepository, Exam, ExamRepository, RoomRepository, StoreError};
use serde::Serialize;
use uuid::Uuid;

use super::ServiceResult;
use crate::error::ApiError;

/// Exam fields as submitted. On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ExamDraft {
    pub course_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<ExamStatus>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    course_id: Uuid,
    room_id: Uuid,
    window: Window,
    status: ExamStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictWarning {
    pub conflicts: Vec<Exam>,
    pub message: String,
}

impl ConflictWarning {
    fn new(conflicts: Vec<Exam>) -> Self {
        let message = format!(
            "There are scheduling conflicts with {} existing exams in this room. Continue anyway?",
            conflicts.len()
        );
        Self { conflicts, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Exam),
    /// Nothing was written; resubmit with confirmation to proceed.
    ConfirmationRequired(ConflictWarning),
}

fn validate(draft: &ExamDraft, fallback: Option<&Exam>) -> ServiceResult<Candidate> {
    let course_id = draft
        .course_id
        .or(fallback.map(|e| e.course_id))
        .ok_or_else(|| ApiError::validation("Course is required"))?;
    let room_id = draft
        .room_id
        .or(fallback.and_then(|e| e.room_id))
        .ok_or_else(|| ApiError::validation("Room is required"))?;
    let start_time = draft
        .start_time
        .or(fallback.map(|e| e.start_time))
        .ok_or_else(|| ApiError::validation("Start time is required"))?;
    let end_time = draft
        .end_time
        .or(fallback.map(|e| e.end_time))
        .ok_or_else(|| ApiError::validation("End time is required"))?;

    // storage keeps millisecond precision
    let window = Window::new(start_time.trunc_subsecs(3), end_time.trunc_subsecs(3));
    if !window.is_well_ordered() {
        return Err(ApiError::validation("Start time must be before end time"));
    }

    let status = draft
        .status
        .or(fallback.map(|e| e.status))
        .unwrap_or_default();

    Ok(Candidate {
        course_id,
        room_id,
        window,
        status,
    })
}

fn ensure_references<S>(store: &S, candidate: &Candidate) -> ServiceResult<()>
where
    S: CourseRepository + RoomRepository,
{
    match store.get_course(candidate.course_id) {
        Err(StoreError::NotFound) => return Err(ApiError::not_found("Course not found")),
        other => {
            other?;
        }
    }
    match store.get_room(candidate.room_id) {
        Err(StoreError::NotFound) => Err(ApiError::not_found("Room not found")),
        other => other.map(|_| ()).map_err(Into::into),
    }
}

pub fn get_exam<S: ExamRepository>(store: &S, id: Uuid) -> ServiceResult<Exam> {
    store.get_exam(id).map_err(|e| match e {
        StoreError::NotFound => ApiError::not_found("Exam not found"),
        other => other.into(),
    })
}

/// Exams in `room_id` overlapping `window`, skipping `exclude`.
pub fn room_conflicts<S: ExamRepository>(
    store: &S,
    room_id: Uuid,
    window: Window,
    exclude: Option<Uuid>,
) -> ServiceResult<Vec<Exam>> {
    let in_room: Vec<Exam> = store
        .list_exams_in_room(room_id)?
        .into_iter()
        .filter(|exam| Some(exam.id) != exclude)
        .collect();

    Ok(conflicting_with(&window, &in_room).into_iter().cloned().collect())
}

/// Validate a draft and report its room conflicts without saving.
pub fn preview_conflicts<S>(store: &S, draft: &ExamDraft, exclude: Option<Uuid>) -> ServiceResult<Vec<Exam>>
where
    S: ExamRepository + CourseRepository + RoomRepository,
{
    let stored = exclude.map(|id| get_exam(store, id)).transpose()?;
    let candidate = validate(draft, stored.as_ref())?;
    room_conflicts(store, candidate.room_id, candidate.window, exclude)
}

pub fn create_exam<S, F>(store: &S, draft: &ExamDraft, confirmed: bool, on_saved: F) -> ServiceResult<SaveOutcome>
where
    S: ExamRepository + CourseRepository + RoomRepository,
    F: FnOnce(&Exam),
{
    let candidate = validate(draft, None)?;
    ensure_references(store, &candidate)?;

    let conflicts = room_conflicts(store, candidate.room_id, candidate.window, None)?;
    if !conflicts.is_empty() && !confirmed {
        tracing::debug!(count = conflicts.len(), room_id = %candidate.room_id, "exam create needs confirmation");
        return Ok(SaveOutcome::ConfirmationRequired(ConflictWarning::new(conflicts)));
    }

    let exam = Exam::new(candidate.course_id, Some(candidate.room_id), candidate.window, candidate.status);
    store.insert_exam(&exam)?;
    tracing::info!(exam_id = %exam.id, course_id = %exam.course_id, conflicts = conflicts.len(), "exam created");

    on_saved(&exam);
    Ok(SaveOutcome::Saved(exam))
}

pub fn update_exam<S, F>(
    store: &S,
    id: Uuid,
    draft: &ExamDraft,
    confirmed: bool,
    on_saved: F,
) -> ServiceResult<SaveOutcome>
where
    S: ExamRepository + CourseRepository + RoomRepository,
    F: FnOnce(&Exam),
{
    let stored = get_exam(store, id)?;
    let candidate = validate(draft, Some(&stored))?;
    ensure_references(store, &candidate)?;

    let conflicts = room_conflicts(store, candidate.room_id, candidate.window, Some(id))?;
    if !conflicts.is_empty() && !confirmed {
        tracing::debug!(count = conflicts.len(), exam_id = %id, "exam update needs confirmation");
        return Ok(SaveOutcome::ConfirmationRequired(ConflictWarning::new(conflicts)));
    }

    let exam = Exam {
        course_id: candidate.course_id,
        room_id: Some(candidate.room_id),
        start_time: candidate.window.start_time,
        end_time: candidate.window.end_time,
        status: candidate.status,
        updated_at: now(),
        ..stored
    };
    store.update_exam(&exam)?;
    tracing::info!(exam_id = %exam.id, conflicts = conflicts.len(), "exam updated");

    on_saved(&exam);
    Ok(SaveOutcome::Saved(exam))
}

/// Delete an exam, returning what was removed.
pub fn delete_exam<S, F>(store: &S, id: Uuid, on_deleted: F) -> ServiceResult<Exam>
where
    S: ExamRepository,
    F: FnOnce(&Exam),
{
    let exam = get_exam(store, id)?;
    if !store.delete_exam(id)? {
        return Err(ApiError::not_found("Exam not found"));
    }
    tracing::info!(exam_id = %id, "exam deleted");

    on_deleted(&exam);
    Ok(exam)
}

/// Move an exam to where it was dropped on the scheduler grid. Saved without
/// a confirmation step; room conflicts are only logged.
pub fn reschedule_exam<S, F>(
    store: &S,
    id: Uuid,
    target: DropTarget,
    tz: FixedOffset,
    on_saved: F,
) -> ServiceResult<Exam>
where
    S: ExamRepository,
    F: FnOnce(&Exam),
{
    let stored = get_exam(store, id)?;

    let window = match relocate(stored.window(), target, tz)? {
        Reschedule::Unchanged => return Ok(stored),
        Reschedule::Moved(window) => window,
    };

    if let Some(room_id) = stored.room_id {
        let conflicts = room_conflicts(store, room_id, window, Some(id))?;
        if !conflicts.is_empty() {
            tracing::warn!(
                exam_id = %id,
                room_id = %room_id,
                count = conflicts.len(),
                "rescheduled exam overlaps other exams in its room"
            );
        }
    }

    let exam = Exam {
        start_time: window.start_time,
        end_time: window.end_time,
        updated_at: now(),
        ..stored
    };
    store.update_exam(&exam)?;
    tracing::info!(exam_id = %id, start = %exam.start_time, end = %exam.end_time, "exam rescheduled");

    on_saved(&exam);
    Ok(exam)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use proctor_store::{Course, Database, Result as StoreResult, Room};
    use std::cell::Cell;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0).unwrap()
    }

    fn zero() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    struct Fixture {
        db: Database,
        course: Course,
        room: Room,
        other_room: Room,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let course = Course::new("CS101", "Intro", "CS");
        let room = Room::new("Main Building", "101", 50);
        let other_room = Room::new("Main Building", "102", 50);
        db.insert_course(&course).unwrap();
        db.insert_room(&room).unwrap();
        db.insert_room(&other_room).unwrap();
        Fixture {
            db,
            course,
            room,
            other_room,
        }
    }

    fn draft(f: &Fixture, room: &Room, start: DateTime<Utc>, end: DateTime<Utc>) -> ExamDraft {
        ExamDraft {
            course_id: Some(f.course.id),
            room_id: Some(room.id),
            start_time: Some(start),
            end_time: Some(end),
            status: None,
        }
    }

    fn saved(outcome: SaveOutcome) -> Exam {
        match outcome {
            SaveOutcome::Saved(exam) => exam,
            other => panic!("expected a saved exam, got {other:?}"),
        }
    }

    #[test]
    fn test_create_persists_and_refreshes() {
        let f = fixture();
        let refreshed = Cell::new(None);

        let exam = saved(
            create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |e| {
                refreshed.set(Some(e.id))
            })
            .unwrap(),
        );

        assert_eq!(exam.status, ExamStatus::Scheduled);
        assert_eq!(refreshed.get(), Some(exam.id));
        assert_eq!(f.db.get_exam(exam.id).unwrap(), exam);
    }

    #[test]
    fn test_sub_millisecond_window_is_rejected_before_insert() {
        let f = fixture();
        let start = at(20, 10) + chrono::Duration::microseconds(100);
        let end = at(20, 10) + chrono::Duration::microseconds(500);

        let err = create_exam(&f.db, &draft(&f, &f.room, start, end), true, |_| panic!("no refresh")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "Start time must be before end time"));
        assert!(f.db.list_exams().unwrap().is_empty());

        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap());
        let shrink = ExamDraft {
            start_time: Some(start),
            end_time: Some(end),
            ..ExamDraft::default()
        };
        let err = update_exam(&f.db, exam.id, &shrink, true, |_| panic!("no refresh")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(f.db.get_exam(exam.id).unwrap(), exam);
    }

    #[test]
    fn test_sub_millisecond_precision_is_dropped_on_create() {
        let f = fixture();
        let start = at(20, 10) + chrono::Duration::microseconds(1_500);
        let end = at(20, 12) + chrono::Duration::microseconds(2_700);

        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, start, end), false, |_| {}).unwrap());
        assert_eq!(exam.start_time, at(20, 10) + chrono::Duration::milliseconds(1));
        assert_eq!(exam.end_time, at(20, 12) + chrono::Duration::milliseconds(2));
        assert_eq!(f.db.get_exam(exam.id).unwrap(), exam);
    }

    #[test]
    fn test_validation_runs_before_anything_is_written() {
        let f = fixture();
        let mut missing_room = draft(&f, &f.room, at(20, 10), at(20, 12));
        missing_room.room_id = None;
        let err = create_exam(&f.db, &missing_room, true, |_| panic!("no refresh")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "Room is required"));

        let backwards = draft(&f, &f.room, at(20, 12), at(20, 10));
        let err = create_exam(&f.db, &backwards, true, |_| panic!("no refresh")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "Start time must be before end time"));

        let empty = draft(&f, &f.room, at(20, 10), at(20, 10));
        assert!(create_exam(&f.db, &empty, true, |_| panic!("no refresh")).is_err());

        let mut unknown_course = draft(&f, &f.room, at(20, 10), at(20, 12));
        unknown_course.course_id = Some(Uuid::new_v4());
        let err = create_exam(&f.db, &unknown_course, true, |_| panic!("no refresh")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(m) if m == "Course not found"));

        assert!(f.db.list_exams().unwrap().is_empty());
    }

    #[test]
    fn test_room_conflict_requires_confirmation() {
        let f = fixture();
        let existing = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap());

        // overlapping by an hour
        let outcome = create_exam(&f.db, &draft(&f, &f.room, at(20, 11), at(20, 13)), false, |_| {
            panic!("no refresh")
        })
        .unwrap();
        match outcome {
            SaveOutcome::ConfirmationRequired(warning) => {
                assert_eq!(warning.conflicts, vec![existing.clone()]);
                assert_eq!(
                    warning.message,
                    "There are scheduling conflicts with 1 existing exams in this room. Continue anyway?"
                );
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
        assert_eq!(f.db.list_exams().unwrap().len(), 1);

        // touching endpoints still conflict
        let touching = draft(&f, &f.room, at(20, 12), at(20, 14));
        assert!(matches!(
            create_exam(&f.db, &touching, false, |_| {}).unwrap(),
            SaveOutcome::ConfirmationRequired(_)
        ));

        // same window, different room
        let elsewhere = draft(&f, &f.other_room, at(20, 10), at(20, 12));
        assert!(matches!(
            create_exam(&f.db, &elsewhere, false, |_| {}).unwrap(),
            SaveOutcome::Saved(_)
        ));

        // confirmed goes through
        assert!(matches!(
            create_exam(&f.db, &touching, true, |_| {}).unwrap(),
            SaveOutcome::Saved(_)
        ));
        assert_eq!(f.db.list_exams().unwrap().len(), 3);
    }

    #[test]
    fn test_no_conflict_after_gap() {
        let f = fixture();
        create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap();
        let later = draft(&f, &f.room, at(20, 13), at(20, 14));
        assert!(preview_conflicts(&f.db, &later, None).unwrap().is_empty());
    }

    #[test]
    fn test_update_merges_and_ignores_itself() {
        let f = fixture();
        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap());

        // shifting by an hour overlaps only the exam's own old window
        let change = ExamDraft {
            start_time: Some(at(20, 11)),
            end_time: Some(at(20, 13)),
            status: Some(ExamStatus::Rescheduled),
            ..ExamDraft::default()
        };
        let updated = saved(update_exam(&f.db, exam.id, &change, false, |_| {}).unwrap());

        assert_eq!(updated.course_id, exam.course_id);
        assert_eq!(updated.room_id, Some(f.room.id));
        assert_eq!(updated.start_time, at(20, 11));
        assert_eq!(updated.status, ExamStatus::Rescheduled);
        assert_eq!(f.db.get_exam(exam.id).unwrap(), updated);

        let backwards = ExamDraft {
            end_time: Some(at(20, 9)),
            ..ExamDraft::default()
        };
        assert!(matches!(
            update_exam(&f.db, exam.id, &backwards, true, |_| {}),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            update_exam(&f.db, Uuid::new_v4(), &change, true, |_| {}),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_and_missing() {
        let f = fixture();
        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap());

        let deleted = Cell::new(false);
        delete_exam(&f.db, exam.id, |_| deleted.set(true)).unwrap();
        assert!(deleted.get());
        assert!(matches!(
            delete_exam(&f.db, exam.id, |_| panic!("no refresh")),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_reschedule_same_day_uses_grid() {
        let f = fixture();
        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 13), at(20, 16)), false, |_| {}).unwrap());

        let target = DropTarget {
            day: NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
            slot_index: 2,
            source_index: Some(0),
        };
        let moved = reschedule_exam(&f.db, exam.id, target, zero(), |_| {}).unwrap();
        assert_eq!(moved.window(), Window::new(at(20, 9), at(20, 11)));
        assert_eq!(f.db.get_exam(exam.id).unwrap().window(), moved.window());
    }

    #[test]
    fn test_reschedule_in_place_is_unchanged() {
        let f = fixture();
        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap());

        let target = DropTarget {
            day: NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
            slot_index: 1,
            source_index: Some(1),
        };
        let same = reschedule_exam(&f.db, exam.id, target, zero(), |_| panic!("no refresh")).unwrap();
        assert_eq!(same, exam);
    }

    #[test]
    fn test_reschedule_other_day_proceeds_despite_conflict() {
        let f = fixture();
        let blocker = saved(create_exam(&f.db, &draft(&f, &f.room, at(22, 10), at(22, 12)), false, |_| {}).unwrap());
        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap());

        let target = DropTarget {
            day: NaiveDate::from_ymd_opt(2025, 5, 22).unwrap(),
            slot_index: 0,
            source_index: None,
        };
        let moved = reschedule_exam(&f.db, exam.id, target, zero(), |_| {}).unwrap();
        assert_eq!(moved.window(), blocker.window());
    }

    /// Exam store whose writes always fail.
    struct ReadOnlyExams(Database);

    impl ExamRepository for ReadOnlyExams {
        fn insert_exam(&self, _exam: &Exam) -> StoreResult<()> {
            Err(StoreError::Migration("read only".into()))
        }
        fn get_exam(&self, id: Uuid) -> StoreResult<Exam> {
            self.0.get_exam(id)
        }
        fn update_exam(&self, _exam: &Exam) -> StoreResult<()> {
            Err(StoreError::Migration("read only".into()))
        }
        fn delete_exam(&self, id: Uuid) -> StoreResult<bool> {
            self.0.delete_exam(id)
        }
        fn list_exams(&self) -> StoreResult<Vec<Exam>> {
            self.0.list_exams()
        }
        fn list_exams_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Exam>> {
            self.0.list_exams_for_course(course_id)
        }
        fn list_exams_for_courses(&self, course_ids: &[Uuid]) -> StoreResult<Vec<Exam>> {
            self.0.list_exams_for_courses(course_ids)
        }
        fn list_exams_in_room(&self, room_id: Uuid) -> StoreResult<Vec<Exam>> {
            self.0.list_exams_in_room(room_id)
        }
    }

    impl CourseRepository for ReadOnlyExams {
        fn insert_course(&self, course: &Course) -> StoreResult<()> {
            self.0.insert_course(course)
        }
        fn get_course(&self, id: Uuid) -> StoreResult<Course> {
            self.0.get_course(id)
        }
        fn find_course_by_code(&self, code: &str) -> StoreResult<Option<Course>> {
            self.0.find_course_by_code(code)
        }
        fn list_courses(&self) -> StoreResult<Vec<Course>> {
            self.0.list_courses()
        }
    }

    impl RoomRepository for ReadOnlyExams {
        fn insert_room(&self, room: &Room) -> StoreResult<()> {
            self.0.insert_room(room)
        }
        fn get_room(&self, id: Uuid) -> StoreResult<Room> {
            self.0.get_room(id)
        }
        fn find_room(&self, building: &str, number: &str) -> StoreResult<Option<Room>> {
            self.0.find_room(building, number)
        }
        fn list_rooms(&self) -> StoreResult<Vec<Room>> {
            self.0.list_rooms()
        }
    }

    #[test]
    fn test_failed_write_skips_refresh_and_keeps_state() {
        let f = fixture();
        let exam = saved(create_exam(&f.db, &draft(&f, &f.room, at(20, 10), at(20, 12)), false, |_| {}).unwrap());
        let room = f.room.clone();
        let store = ReadOnlyExams(f.db);

        let err = create_exam(
            &store,
            &ExamDraft {
                course_id: Some(exam.course_id),
                room_id: Some(room.id),
                start_time: Some(at(21, 10)),
                end_time: Some(at(21, 12)),
                status: None,
            },
            false,
            |_| panic!("no refresh"),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let target = DropTarget {
            day: NaiveDate::from_ymd_opt(2025, 5, 24).unwrap(),
            slot_index: 0,
            source_index: None,
        };
        assert!(reschedule_exam(&store, exam.id, target, zero(), |_| panic!("no refresh")).is_err());
        assert_eq!(store.get_exam(exam.id).unwrap(), exam);
        assert_eq!(store.list_exams().unwrap().len(), 1);
    }
}

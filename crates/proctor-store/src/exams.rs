//! CRUD operations for [`Exam`] records.

use rusqlite::params;
use rusqlite::params_from_iter;
use uuid::Uuid;

use crate::columns::{enum_at, opt_uuid_at, placeholders, ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::Exam;
use crate::repo::ExamRepository;

const COLUMNS: &str = "id, course_id, room_id, start_time, end_time, status, created_at, updated_at";

impl Database {
    fn query_exams<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Exam>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, row_to_exam)?;

        let mut exams = Vec::new();
        for row in rows {
            exams.push(row?);
        }
        Ok(exams)
    }
}

impl ExamRepository for Database {
    fn insert_exam(&self, exam: &Exam) -> Result<()> {
        self.conn().execute(
            "INSERT INTO exams (id, course_id, room_id, start_time, end_time, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                exam.id.to_string(),
                exam.course_id.to_string(),
                exam.room_id.map(|r| r.to_string()),
                ts(&exam.start_time),
                ts(&exam.end_time),
                exam.status.as_str(),
                ts(&exam.created_at),
                ts(&exam.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_exam(&self, id: Uuid) -> Result<Exam> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM exams WHERE id = ?1"),
                params![id.to_string()],
                row_to_exam,
            )
            .map_err(not_found)
    }

    fn update_exam(&self, exam: &Exam) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE exams
             SET course_id = ?2, room_id = ?3, start_time = ?4, end_time = ?5, status = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                exam.id.to_string(),
                exam.course_id.to_string(),
                exam.room_id.map(|r| r.to_string()),
                ts(&exam.start_time),
                ts(&exam.end_time),
                exam.status.as_str(),
                ts(&exam.updated_at),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete_exam(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM exams WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    fn list_exams(&self) -> Result<Vec<Exam>> {
        self.query_exams(&format!("SELECT {COLUMNS} FROM exams ORDER BY rowid"), [])
    }

    fn list_exams_for_course(&self, course_id: Uuid) -> Result<Vec<Exam>> {
        self.query_exams(
            &format!("SELECT {COLUMNS} FROM exams WHERE course_id = ?1 ORDER BY start_time ASC, rowid"),
            params![course_id.to_string()],
        )
    }

    fn list_exams_for_courses(&self, course_ids: &[Uuid]) -> Result<Vec<Exam>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {COLUMNS} FROM exams WHERE course_id IN ({}) ORDER BY start_time ASC, rowid",
            placeholders(course_ids.len())
        );
        self.query_exams(&sql, params_from_iter(course_ids.iter().map(|id| id.to_string())))
    }

    fn list_exams_in_room(&self, room_id: Uuid) -> Result<Vec<Exam>> {
        self.query_exams(
            &format!("SELECT {COLUMNS} FROM exams WHERE room_id = ?1 ORDER BY rowid"),
            params![room_id.to_string()],
        )
    }
}

fn row_to_exam(row: &rusqlite::Row<'_>) -> rusqlite::Result<Exam> {
    Ok(Exam {
        id: uuid_at(row, 0)?,
        course_id: uuid_at(row, 1)?,
        room_id: opt_uuid_at(row, 2)?,
        start_time: ts_at(row, 3)?,
        end_time: ts_at(row, 4)?,
        status: enum_at(row, 5)?,
        created_at: ts_at(row, 6)?,
        updated_at: ts_at(row, 7)?,
    })
}

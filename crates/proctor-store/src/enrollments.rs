//! CRUD operations for [`Enrollment`] records.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::columns::{ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, unique_violation, Result};
use crate::models::Enrollment;
use crate::repo::EnrollmentRepository;

const COLUMNS: &str = "id, user_id, course_id, semester, created_at, updated_at";

impl EnrollmentRepository for Database {
    fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO enrollments (id, user_id, course_id, semester, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    enrollment.id.to_string(),
                    enrollment.user_id.to_string(),
                    enrollment.course_id.to_string(),
                    enrollment.semester,
                    ts(&enrollment.created_at),
                    ts(&enrollment.updated_at),
                ],
            )
            .map_err(|e| unique_violation(e, "User is already enrolled in this course for the specified semester"))?;
        Ok(())
    }

    fn get_enrollment(&self, id: Uuid) -> Result<Enrollment> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM enrollments WHERE id = ?1"),
                params![id.to_string()],
                row_to_enrollment,
            )
            .map_err(not_found)
    }

    fn find_enrollment(&self, user_id: Uuid, course_id: Uuid, semester: &str) -> Result<Option<Enrollment>> {
        let enrollment = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM enrollments
                     WHERE user_id = ?1 AND course_id = ?2 AND semester = ?3"
                ),
                params![user_id.to_string(), course_id.to_string(), semester],
                row_to_enrollment,
            )
            .optional()?;
        Ok(enrollment)
    }

    fn list_enrollments_for_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {COLUMNS} FROM enrollments WHERE user_id = ?1 ORDER BY rowid"))?;

        let rows = stmt.query_map(params![user_id.to_string()], row_to_enrollment)?;

        let mut enrollments = Vec::new();
        for row in rows {
            enrollments.push(row?);
        }
        Ok(enrollments)
    }

    fn delete_enrollment(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM enrollments WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_enrollment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        course_id: uuid_at(row, 2)?,
        semester: row.get(3)?,
        created_at: ts_at(row, 4)?,
        updated_at: ts_at(row, 5)?,
    })
}

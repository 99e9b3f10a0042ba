//! CRUD operations for [`Course`] records.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::columns::{ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, unique_violation, Result};
use crate::models::Course;
use crate::repo::CourseRepository;

const COLUMNS: &str = "id, code, name, department, created_at, updated_at";

impl CourseRepository for Database {
    fn insert_course(&self, course: &Course) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO courses (id, code, name, department, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    course.id.to_string(),
                    course.code,
                    course.name,
                    course.department,
                    ts(&course.created_at),
                    ts(&course.updated_at),
                ],
            )
            .map_err(|e| unique_violation(e, "A course with this code already exists"))?;
        Ok(())
    }

    fn get_course(&self, id: Uuid) -> Result<Course> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM courses WHERE id = ?1"),
                params![id.to_string()],
                row_to_course,
            )
            .map_err(not_found)
    }

    fn find_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        let course = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM courses WHERE code = ?1"),
                params![code],
                row_to_course,
            )
            .optional()?;
        Ok(course)
    }

    fn list_courses(&self) -> Result<Vec<Course>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {COLUMNS} FROM courses ORDER BY code ASC"))?;

        let rows = stmt.query_map([], row_to_course)?;

        let mut courses = Vec::new();
        for row in rows {
            courses.push(row?);
        }
        Ok(courses)
    }
}

fn row_to_course(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: uuid_at(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        department: row.get(3)?,
        created_at: ts_at(row, 4)?,
        updated_at: ts_at(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_list_ordered_by_code() {
        let db = Database::open_in_memory().unwrap();
        db.insert_course(&Course::new("MATH201", "Calculus II", "Mathematics")).unwrap();
        db.insert_course(&Course::new("CS101", "Intro to CS", "Computer Science")).unwrap();

        let codes: Vec<String> = db.list_courses().unwrap().into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["CS101", "MATH201"]);
        assert!(db.find_course_by_code("CS101").unwrap().is_some());
    }

    #[test]
    fn test_duplicate_code_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.insert_course(&Course::new("CS101", "Intro", "CS")).unwrap();
        let err = db.insert_course(&Course::new("CS101", "Other", "CS")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}

//! CRUD operations for [`StudyResource`] records.

use rusqlite::{params, params_from_iter};
use uuid::Uuid;

use crate::columns::{enum_at, placeholders, ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::StudyResource;
use crate::repo::StudyResourceRepository;

const COLUMNS: &str = "id, course_id, resource_type, title, description, url, created_at, updated_at";

impl Database {
    fn query_resources<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<StudyResource>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, row_to_resource)?;

        let mut resources = Vec::new();
        for row in rows {
            resources.push(row?);
        }
        Ok(resources)
    }
}

impl StudyResourceRepository for Database {
    fn insert_resource(&self, resource: &StudyResource) -> Result<()> {
        self.conn().execute(
            "INSERT INTO study_resources (id, course_id, resource_type, title, description, url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                resource.id.to_string(),
                resource.course_id.to_string(),
                resource.resource_type.as_str(),
                resource.title,
                resource.description,
                resource.url,
                ts(&resource.created_at),
                ts(&resource.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_resource(&self, id: Uuid) -> Result<StudyResource> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM study_resources WHERE id = ?1"),
                params![id.to_string()],
                row_to_resource,
            )
            .map_err(not_found)
    }

    fn update_resource(&self, resource: &StudyResource) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE study_resources
             SET course_id = ?2, resource_type = ?3, title = ?4, description = ?5, url = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                resource.id.to_string(),
                resource.course_id.to_string(),
                resource.resource_type.as_str(),
                resource.title,
                resource.description,
                resource.url,
                ts(&resource.updated_at),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete_resource(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM study_resources WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    fn list_resources(&self) -> Result<Vec<StudyResource>> {
        self.query_resources(&format!("SELECT {COLUMNS} FROM study_resources ORDER BY rowid"), [])
    }

    fn list_resources_for_course(&self, course_id: Uuid) -> Result<Vec<StudyResource>> {
        self.query_resources(
            &format!("SELECT {COLUMNS} FROM study_resources WHERE course_id = ?1 ORDER BY rowid"),
            params![course_id.to_string()],
        )
    }

    fn list_resources_for_courses(&self, course_ids: &[Uuid]) -> Result<Vec<StudyResource>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {COLUMNS} FROM study_resources WHERE course_id IN ({}) ORDER BY rowid",
            placeholders(course_ids.len())
        );
        self.query_resources(&sql, params_from_iter(course_ids.iter().map(|id| id.to_string())))
    }
}

fn row_to_resource(row: &rusqlite::Row<'_>) -> rusqlite::Result<StudyResource> {
    Ok(StudyResource {
        id: uuid_at(row, 0)?,
        course_id: uuid_at(row, 1)?,
        resource_type: enum_at(row, 2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        url: row.get(5)?,
        created_at: ts_at(row, 6)?,
        updated_at: ts_at(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use crate::repo::CourseRepository;
    use proctor_shared::ResourceType;

    #[test]
    fn test_resources_listed_in_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let cs = Course::new("CS101", "Intro", "CS");
        let math = Course::new("MATH201", "Calc", "Math");
        let bio = Course::new("BIO100", "Bio", "Biology");
        for c in [&cs, &math, &bio] {
            db.insert_course(c).unwrap();
        }

        let first = StudyResource::new(math.id, ResourceType::Article, "Limits", "", "https://a");
        let second = StudyResource::new(cs.id, ResourceType::Video, "Loops", "", "https://b");
        let third = StudyResource::new(bio.id, ResourceType::Notes, "Cells", "", "https://c");
        for r in [&first, &second, &third] {
            db.insert_resource(r).unwrap();
        }

        let listed = db.list_resources_for_courses(&[cs.id, math.id]).unwrap();
        assert_eq!(listed, vec![first.clone(), second.clone()]);
        assert_eq!(db.list_resources_for_course(bio.id).unwrap(), vec![third]);
        assert_eq!(db.list_resources().unwrap().len(), 3);
    }

    #[test]
    fn test_update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let course = Course::new("CS101", "Intro", "CS");
        db.insert_course(&course).unwrap();

        let mut resource = StudyResource::new(course.id, ResourceType::Video, "Old", "", "https://x");
        db.insert_resource(&resource).unwrap();

        resource.title = "New".into();
        resource.resource_type = ResourceType::PracticeQuiz;
        db.update_resource(&resource).unwrap();
        assert_eq!(db.get_resource(resource.id).unwrap(), resource);

        assert!(db.delete_resource(resource.id).unwrap());
        assert!(matches!(db.update_resource(&resource), Err(StoreError::NotFound)));
    }
}

//! CRUD operations for [`LearningPreference`] records.

use rusqlite::params;
use uuid::Uuid;

use crate::columns::{enum_at, ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::LearningPreference;
use crate::repo::PreferenceRepository;

const COLUMNS: &str = "id, user_id, preferred_type, study_duration, created_at, updated_at";

impl PreferenceRepository for Database {
    fn insert_preference(&self, preference: &LearningPreference) -> Result<()> {
        self.conn().execute(
            "INSERT INTO learning_preferences (id, user_id, preferred_type, study_duration, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                preference.id.to_string(),
                preference.user_id.to_string(),
                preference.preferred_type.as_str(),
                preference.study_duration,
                ts(&preference.created_at),
                ts(&preference.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_preference(&self, id: Uuid) -> Result<LearningPreference> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM learning_preferences WHERE id = ?1"),
                params![id.to_string()],
                row_to_preference,
            )
            .map_err(not_found)
    }

    fn update_preference(&self, preference: &LearningPreference) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE learning_preferences
             SET preferred_type = ?2, study_duration = ?3, updated_at = ?4
             WHERE id = ?1",
            params![
                preference.id.to_string(),
                preference.preferred_type.as_str(),
                preference.study_duration,
                ts(&preference.updated_at),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete_preference(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM learning_preferences WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    fn list_preferences_for_user(&self, user_id: Uuid) -> Result<Vec<LearningPreference>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COLUMNS} FROM learning_preferences WHERE user_id = ?1 ORDER BY rowid"
        ))?;

        let rows = stmt.query_map(params![user_id.to_string()], row_to_preference)?;

        let mut preferences = Vec::new();
        for row in rows {
            preferences.push(row?);
        }
        Ok(preferences)
    }
}

fn row_to_preference(row: &rusqlite::Row<'_>) -> rusqlite::Result<LearningPreference> {
    Ok(LearningPreference {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        preferred_type: enum_at(row, 2)?,
        study_duration: row.get(3)?,
        created_at: ts_at(row, 4)?,
        updated_at: ts_at(row, 5)?,
    })
}

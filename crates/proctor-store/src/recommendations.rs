//! CRUD operations for [`LearningRecommendation`] records.

use rusqlite::params;
use uuid::Uuid;

use crate::columns::{ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::{now, LearningRecommendation};
use crate::repo::RecommendationRepository;

const COLUMNS: &str = "id, user_id, course_id, resource_id, reason, priority, completed, created_at, updated_at";

impl Database {
    fn query_recommendations<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<LearningRecommendation>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, row_to_recommendation)?;

        let mut recommendations = Vec::new();
        for row in rows {
            recommendations.push(row?);
        }
        Ok(recommendations)
    }
}

impl RecommendationRepository for Database {
    fn insert_recommendation(&self, recommendation: &LearningRecommendation) -> Result<()> {
        self.conn().execute(
            "INSERT INTO learning_recommendations
                 (id, user_id, course_id, resource_id, reason, priority, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                recommendation.id.to_string(),
                recommendation.user_id.to_string(),
                recommendation.course_id.to_string(),
                recommendation.resource_id.to_string(),
                recommendation.reason,
                recommendation.priority,
                recommendation.completed,
                ts(&recommendation.created_at),
                ts(&recommendation.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_recommendation(&self, id: Uuid) -> Result<LearningRecommendation> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM learning_recommendations WHERE id = ?1"),
                params![id.to_string()],
                row_to_recommendation,
            )
            .map_err(not_found)
    }

    fn list_recommendations_for_user(&self, user_id: Uuid) -> Result<Vec<LearningRecommendation>> {
        self.query_recommendations(
            &format!(
                "SELECT {COLUMNS} FROM learning_recommendations
                 WHERE user_id = ?1
                 ORDER BY priority DESC, rowid"
            ),
            params![user_id.to_string()],
        )
    }

    fn list_recommendations_for_user_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<LearningRecommendation>> {
        self.query_recommendations(
            &format!(
                "SELECT {COLUMNS} FROM learning_recommendations
                 WHERE user_id = ?1 AND course_id = ?2
                 ORDER BY priority DESC, rowid"
            ),
            params![user_id.to_string(), course_id.to_string()],
        )
    }

    fn set_recommendation_completed(&self, id: Uuid, completed: bool) -> Result<LearningRecommendation> {
        let affected = self.conn().execute(
            "UPDATE learning_recommendations SET completed = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), completed, ts(&now())],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_recommendation(id)
    }

    fn delete_recommendation(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM learning_recommendations WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_recommendation(row: &rusqlite::Row<'_>) -> rusqlite::Result<LearningRecommendation> {
    Ok(LearningRecommendation {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        course_id: uuid_at(row, 2)?,
        resource_id: uuid_at(row, 3)?,
        reason: row.get(4)?,
        priority: row.get(5)?,
        completed: row.get(6)?,
        created_at: ts_at(row, 7)?,
        updated_at: ts_at(row, 8)?,
    })
}

//! CRUD operations for [`User`] records.

use proctor_shared::Role;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::columns::{enum_at, ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, unique_violation, Result, StoreError};
use crate::models::{now, User};
use crate::repo::UserRepository;

const COLUMNS: &str = "id, external_id, email, first_name, last_name, role, created_at, updated_at";

impl UserRepository for Database {
    fn insert_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, external_id, email, first_name, last_name, role, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user.id.to_string(),
                    user.external_id,
                    user.email,
                    user.first_name,
                    user.last_name,
                    user.role.as_str(),
                    ts(&user.created_at),
                    ts(&user.updated_at),
                ],
            )
            .map_err(|e| unique_violation(e, "A user with this identity or email already exists"))?;
        Ok(())
    }

    fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
                row_to_user,
            )
            .map_err(not_found)
    }

    fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE external_id = ?1"),
                params![external_id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY last_name, first_name, rowid"))?;

        let rows = stmt.query_map([], row_to_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn update_user_role(&self, id: Uuid, role: Role) -> Result<User> {
        let affected = self.conn().execute(
            "UPDATE users SET role = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), role.as_str(), ts(&now())],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_user(id)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        external_id: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        role: enum_at(row, 5)?,
        created_at: ts_at(row, 6)?,
        updated_at: ts_at(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(external_id: &str, email: &str) -> User {
        User::new(external_id, email, "Ada", "Lovelace", Role::Student)
    }

    #[test]
    fn test_insert_and_lookup() {
        let db = Database::open_in_memory().unwrap();
        let user = student("auth0|ada", "ada@uni.edu");
        db.insert_user(&user).unwrap();

        assert_eq!(db.get_user(user.id).unwrap(), user);
        assert_eq!(db.find_user_by_external_id("auth0|ada").unwrap(), Some(user.clone()));
        assert_eq!(db.find_user_by_email("ada@uni.edu").unwrap(), Some(user));
        assert_eq!(db.find_user_by_external_id("nobody").unwrap(), None);
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&student("a", "same@uni.edu")).unwrap();

        let err = db.insert_user(&student("b", "same@uni.edu")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_update_role() {
        let db = Database::open_in_memory().unwrap();
        let user = student("a", "a@uni.edu");
        db.insert_user(&user).unwrap();

        let updated = db.update_user_role(user.id, Role::Admin).unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert!(updated.updated_at >= user.updated_at);

        let err = db.update_user_role(Uuid::new_v4(), Role::Admin).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.get_user(Uuid::new_v4()), Err(StoreError::NotFound)));
    }
}

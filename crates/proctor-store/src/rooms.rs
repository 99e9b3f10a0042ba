//! CRUD operations for [`Room`] records.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::columns::{ts, ts_at, uuid_at};
use crate::database::Database;
use crate::error::{not_found, unique_violation, Result};
use crate::models::Room;
use crate::repo::RoomRepository;

const COLUMNS: &str = "id, building, number, capacity, created_at, updated_at";

impl RoomRepository for Database {
    fn insert_room(&self, room: &Room) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO rooms (id, building, number, capacity, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    room.id.to_string(),
                    room.building,
                    room.number,
                    room.capacity,
                    ts(&room.created_at),
                    ts(&room.updated_at),
                ],
            )
            .map_err(|e| unique_violation(e, "A room with this building and number already exists"))?;
        Ok(())
    }

    fn get_room(&self, id: Uuid) -> Result<Room> {
        self.conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM rooms WHERE id = ?1"),
                params![id.to_string()],
                row_to_room,
            )
            .map_err(not_found)
    }

    fn find_room(&self, building: &str, number: &str) -> Result<Option<Room>> {
        let room = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM rooms WHERE building = ?1 AND number = ?2"),
                params![building, number],
                row_to_room,
            )
            .optional()?;
        Ok(room)
    }

    fn list_rooms(&self) -> Result<Vec<Room>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {COLUMNS} FROM rooms ORDER BY building ASC, number ASC"))?;

        let rows = stmt.query_map([], row_to_room)?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(row?);
        }
        Ok(rooms)
    }
}

fn row_to_room(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        id: uuid_at(row, 0)?,
        building: row.get(1)?,
        number: row.get(2)?,
        capacity: row.get(3)?,
        created_at: ts_at(row, 4)?,
        updated_at: ts_at(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_building_and_number_unique() {
        let db = Database::open_in_memory().unwrap();
        let room = Room::new("Main Building", "101", 50);
        db.insert_room(&room).unwrap();
        db.insert_room(&Room::new("Main Building", "102", 30)).unwrap();
        db.insert_room(&Room::new("Science Hall", "101", 30)).unwrap();

        let err = db.insert_room(&Room::new("Main Building", "101", 10)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        assert_eq!(db.find_room("Main Building", "101").unwrap(), Some(room.clone()));
        assert_eq!(db.get_room(room.id).unwrap().label(), "Main Building, Room 101");
        assert_eq!(db.list_rooms().unwrap().len(), 3);
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let db = Database::open_in_memory().unwrap();
        let err = db.insert_room(&Room::new("Annex", "1", 0)).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}

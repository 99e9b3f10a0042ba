//! v001 -- Initial schema creation.
//!
//! Creates the eight tables: `users`, `courses`, `rooms`, `exams`,
//! `enrollments`, `study_resources`, `learning_preferences` and
//! `learning_recommendations`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    external_id TEXT NOT NULL UNIQUE,        -- identity-provider subject
    email       TEXT NOT NULL UNIQUE,
    first_name  TEXT NOT NULL DEFAULT '',
    last_name   TEXT NOT NULL DEFAULT '',
    role        TEXT NOT NULL DEFAULT 'STUDENT',
    created_at  TEXT NOT NULL,               -- RFC-3339, UTC, millis
    updated_at  TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Courses
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS courses (
    id         TEXT PRIMARY KEY NOT NULL,
    code       TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    department TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Rooms
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS rooms (
    id         TEXT PRIMARY KEY NOT NULL,
    building   TEXT NOT NULL,
    number     TEXT NOT NULL,
    capacity   INTEGER NOT NULL CHECK (capacity > 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    UNIQUE (building, number)
);

-- ----------------------------------------------------------------
-- Exams
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS exams (
    id         TEXT PRIMARY KEY NOT NULL,
    course_id  TEXT NOT NULL,                -- FK -> courses(id)
    room_id    TEXT,                         -- nullable FK -> rooms(id)
    start_time TEXT NOT NULL,
    end_time   TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'SCHEDULED',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    CHECK (start_time < end_time),
    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE,
    FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_exams_course ON exams(course_id);
CREATE INDEX IF NOT EXISTS idx_exams_room_start ON exams(room_id, start_time);

-- ----------------------------------------------------------------
-- Enrollments
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS enrollments (
    id         TEXT PRIMARY KEY NOT NULL,
    user_id    TEXT NOT NULL,                -- FK -> users(id)
    course_id  TEXT NOT NULL,                -- FK -> courses(id)
    semester   TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    UNIQUE (user_id, course_id, semester),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Study resources
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS study_resources (
    id            TEXT PRIMARY KEY NOT NULL,
    course_id     TEXT NOT NULL,             -- FK -> courses(id)
    resource_type TEXT NOT NULL,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    url           TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,

    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_study_resources_course ON study_resources(course_id);

-- ----------------------------------------------------------------
-- Learning preferences (several rows per user tolerated, first wins)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS learning_preferences (
    id             TEXT PRIMARY KEY NOT NULL,
    user_id        TEXT NOT NULL,            -- FK -> users(id)
    preferred_type TEXT NOT NULL,
    study_duration INTEGER NOT NULL CHECK (study_duration > 0),  -- minutes
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_learning_preferences_user ON learning_preferences(user_id);

-- ----------------------------------------------------------------
-- Learning recommendations (de-duplicated at generation time only)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS learning_recommendations (
    id          TEXT PRIMARY KEY NOT NULL,
    user_id     TEXT NOT NULL,               -- FK -> users(id)
    course_id   TEXT NOT NULL,               -- FK -> courses(id)
    resource_id TEXT NOT NULL,               -- FK -> study_resources(id)
    reason      TEXT NOT NULL,
    priority    INTEGER NOT NULL DEFAULT 0,
    completed   INTEGER NOT NULL DEFAULT 0,  -- boolean 0/1
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE,
    FOREIGN KEY (resource_id) REFERENCES study_resources(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_learning_recommendations_user
    ON learning_recommendations(user_id, priority DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}

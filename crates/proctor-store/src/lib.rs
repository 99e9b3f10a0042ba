//! # proctor-store
//!
//! Record store for the exam scheduler, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection`. Each entity gets its own repository trait (see
//! [`repo`]) implemented by `Database`, so services can be written against
//! the traits and exercised with substitutes in tests.

pub mod courses;
pub mod database;
pub mod enrollments;
pub mod exams;
pub mod migrations;
pub mod models;
pub mod preferences;
pub mod recommendations;
pub mod repo;
pub mod resources;
pub mod rooms;
pub mod seed;
pub mod users;

mod columns;
mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use repo::*;

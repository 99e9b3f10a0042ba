//! # proctor-shared
//!
//! Domain vocabulary and pure scheduling logic shared by the store and the
//! HTTP server: closed enums for roles, exam statuses and resource types,
//! the exam conflict detector, drag-reschedule arithmetic, schedule
//! grouping, the next-exam countdown and iCal rendering.

pub mod conflict;
pub mod constants;
pub mod countdown;
pub mod error;
pub mod ical;
pub mod reschedule;
pub mod schedule;
pub mod types;

pub use conflict::{find_conflicts, overlaps, ConflictPair, TimeWindow, Window};
pub use error::{ParseEnumError, ScheduleError};
pub use types::{ExamStatus, ResourceType, Role};

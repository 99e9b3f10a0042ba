//! Drag-to-reschedule arithmetic.
//!
//! The admin scheduler lays exams out in one row per calendar day. Dropping
//! an exam on another day keeps its time of day and duration. Dropping it at
//! a different position in its own day maps the position onto a fixed grid
//! of 30-minute slots starting at 08:00 and gives the exam a flat 120-minute
//! duration, whatever it lasted before.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::conflict::Window;
use crate::constants::{SAME_DAY_EXAM_DURATION_MINUTES, SLOT_GRID_ORIGIN_HOUR, SLOT_WIDTH_MINUTES};
use crate::error::ScheduleError;

/// Number of grid slots between the grid origin and midnight.
pub const SLOTS_PER_DAY: u32 = ((24 - SLOT_GRID_ORIGIN_HOUR) as i64 * 60 / SLOT_WIDTH_MINUTES) as u32;

/// Where an exam was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    /// Calendar day of the destination row, in the schedule time zone.
    pub day: NaiveDate,
    /// Position within the destination row.
    pub slot_index: u32,
    /// Position the exam was dragged from, when known.
    pub source_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reschedule {
    /// Dropped back where it came from.
    Unchanged,
    Moved(Window),
}

/// Parse a `YYYY-MM-DD` day key.
pub fn parse_day(s: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ScheduleError::InvalidDay(s.to_string()))
}

/// Calendar day an instant falls on in `tz`.
pub fn day_of(instant: DateTime<Utc>, tz: FixedOffset) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Compute the new window for an exam currently occupying `current`.
pub fn relocate(current: Window, target: DropTarget, tz: FixedOffset) -> Result<Reschedule, ScheduleError> {
    let current_day = day_of(current.start_time, tz);

    if target.day != current_day {
        let time_of_day = current.start_time.with_timezone(&tz).time();
        let duration = current.end_time - current.start_time;
        let start = to_utc(target.day.and_time(time_of_day), tz)?;
        return Ok(Reschedule::Moved(Window::new(start, start + duration)));
    }

    if target.source_index == Some(target.slot_index) {
        return Ok(Reschedule::Unchanged);
    }

    Ok(Reschedule::Moved(slot_window(target.day, target.slot_index, tz)?))
}

/// Window for grid slot `slot_index` on `day`: 08:00 + index × 30 min,
/// lasting 120 minutes.
pub fn slot_window(day: NaiveDate, slot_index: u32, tz: FixedOffset) -> Result<Window, ScheduleError> {
    if slot_index >= SLOTS_PER_DAY {
        return Err(ScheduleError::SlotOutOfRange(slot_index));
    }

    let origin = NaiveTime::from_hms_opt(SLOT_GRID_ORIGIN_HOUR, 0, 0).ok_or(ScheduleError::NonexistentLocalTime)?;
    let start = to_utc(day.and_time(origin), tz)? + Duration::minutes(i64::from(slot_index) * SLOT_WIDTH_MINUTES);
    let end = start + Duration::minutes(SAME_DAY_EXAM_DURATION_MINUTES);
    Ok(Window::new(start, end))
}

fn to_utc(local: NaiveDateTime, tz: FixedOffset) -> Result<DateTime<Utc>, ScheduleError> {
    tz.from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(ScheduleError::NonexistentLocalTime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, minute, 0).unwrap()
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn drop_at(day: u32, slot_index: u32) -> DropTarget {
        DropTarget {
            day: may(day),
            slot_index,
            source_index: None,
        }
    }

    fn zero() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_same_day_slot_two_maps_to_nine_to_eleven() {
        // a three-hour exam; the grid ignores its length
        let current = Window::new(utc(20, 13, 0), utc(20, 16, 0));
        let moved = relocate(current, drop_at(20, 2), zero()).unwrap();
        assert_eq!(moved, Reschedule::Moved(Window::new(utc(20, 9, 0), utc(20, 11, 0))));
    }

    #[test]
    fn test_same_day_slot_zero_is_grid_origin() {
        let current = Window::new(utc(20, 14, 0), utc(20, 15, 0));
        let moved = relocate(current, drop_at(20, 0), zero()).unwrap();
        assert_eq!(moved, Reschedule::Moved(Window::new(utc(20, 8, 0), utc(20, 10, 0))));
    }

    #[test]
    fn test_other_day_preserves_time_of_day_and_duration() {
        let current = Window::new(utc(20, 10, 15), utc(20, 13, 45));
        let moved = relocate(current, drop_at(23, 5), zero()).unwrap();
        assert_eq!(moved, Reschedule::Moved(Window::new(utc(23, 10, 15), utc(23, 13, 45))));
    }

    #[test]
    fn test_dropping_in_place_is_a_no_op() {
        let current = Window::new(utc(20, 10, 0), utc(20, 12, 0));
        let target = DropTarget {
            source_index: Some(3),
            ..drop_at(20, 3)
        };
        assert_eq!(relocate(current, target, zero()).unwrap(), Reschedule::Unchanged);
    }

    #[test]
    fn test_days_are_taken_in_the_schedule_time_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 23:30 UTC on the 19th is 01:30 on the 20th at +02:00
        let current = Window::new(utc(19, 23, 30), utc(20, 1, 30));
        assert_eq!(day_of(current.start_time, plus_two), may(20));

        let moved = relocate(current, drop_at(20, 2), plus_two).unwrap();
        // 09:00 local is 07:00 UTC
        assert_eq!(moved, Reschedule::Moved(Window::new(utc(20, 7, 0), utc(20, 9, 0))));
    }

    #[test]
    fn test_slot_past_midnight_rejected() {
        assert_eq!(
            slot_window(may(20), SLOTS_PER_DAY, zero()),
            Err(ScheduleError::SlotOutOfRange(SLOTS_PER_DAY))
        );
        assert!(slot_window(may(20), SLOTS_PER_DAY - 1, zero()).is_ok());
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2025-05-20").unwrap(), may(20));
        assert!(matches!(parse_day("20/05/2025"), Err(ScheduleError::InvalidDay(_))));
    }
}

//! Student schedule presentation: day grouping, conflict flags, timing and
//! the next-exam countdown.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::conflict::{find_conflicts, TimeWindow};
use crate::reschedule::day_of;

/// Where a day sits relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayTiming {
    Today,
    Upcoming,
    Past,
}

impl DayTiming {
    pub fn classify(day: NaiveDate, now: DateTime<Utc>, tz: FixedOffset) -> Self {
        let today = day_of(now, tz);
        if day == today {
            Self::Today
        } else if day > today {
            Self::Upcoming
        } else {
            Self::Past
        }
    }
}

/// One exam inside a [`ScheduleDay`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry<T> {
    pub item: T,
    pub has_conflict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDay<T> {
    pub day: NaiveDate,
    pub timing: DayTiming,
    pub entries: Vec<ScheduleEntry<T>>,
}

/// Group items by calendar day in `tz`, days ascending and items within a
/// day ascending by start. Each entry is flagged when it takes part in any
/// conflict across the whole input, not just its own day.
pub fn group_by_day<T>(items: &[T], now: DateTime<Utc>, tz: FixedOffset) -> Vec<ScheduleDay<T>>
where
    T: TimeWindow + Clone,
{
    let mut flagged = vec![false; items.len()];
    for pair in find_conflicts(items) {
        let (i, j) = pair.indices;
        flagged[i] = true;
        flagged[j] = true;
    }

    let mut days: BTreeMap<NaiveDate, Vec<ScheduleEntry<T>>> = BTreeMap::new();
    for (item, has_conflict) in items.iter().zip(flagged) {
        days.entry(day_of(item.starts_at(), tz))
            .or_default()
            .push(ScheduleEntry {
                item: item.clone(),
                has_conflict,
            });
    }

    days.into_iter()
        .map(|(day, mut entries)| {
            entries.sort_by_key(|e| e.item.starts_at());
            ScheduleDay {
                day,
                timing: DayTiming::classify(day, now, tz),
                entries,
            }
        })
        .collect()
}

/// Earliest item starting strictly after `now`.
pub fn next_after<T: TimeWindow>(items: &[T], now: DateTime<Utc>) -> Option<&T> {
    items
        .iter()
        .filter(|item| item.starts_at() > now)
        .min_by_key(|item| item.starts_at())
}

/// Remaining time until an exam, split into calendar-free units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// `None` once `target` is no longer in the future.
    pub fn between(now: DateTime<Utc>, target: DateTime<Utc>) -> Option<Self> {
        let remaining = (target - now).num_milliseconds();
        if remaining <= 0 {
            return None;
        }

        let total_secs = remaining / 1000;
        Some(Self {
            days: total_secs / 86_400,
            hours: total_secs % 86_400 / 3_600,
            minutes: total_secs % 3_600 / 60,
            seconds: total_secs % 60,
        })
    }
}

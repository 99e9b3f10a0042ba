/// Application name
pub const APP_NAME: &str = "Proctor";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 4000;

/// Hour of day at which the drag-reschedule slot grid starts
pub const SLOT_GRID_ORIGIN_HOUR: u32 = 8;

/// Width of one drag-reschedule slot in minutes
pub const SLOT_WIDTH_MINUTES: i64 = 30;

/// Duration applied to an exam moved within its own day, in minutes
pub const SAME_DAY_EXAM_DURATION_MINUTES: i64 = 120;

/// Study duration assigned to a new learning preference when none is given
pub const DEFAULT_STUDY_DURATION_MINUTES: i64 = 30;

/// Priority boost for a resource matching the user's preferred type
pub const PREFERRED_TYPE_PRIORITY_BOOST: i64 = 10;

/// Period of the next-exam countdown ticker in milliseconds
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// Calendar product identifier written into iCal exports
pub const ICAL_PRODID: &str = "-//University Exam Scheduler//EN";

/// Domain suffix for iCal event UIDs
pub const ICAL_UID_DOMAIN: &str = "university-exam-scheduler.com";

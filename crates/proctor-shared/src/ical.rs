//! iCalendar (RFC 5545) export of exam schedules.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::constants::{ICAL_PRODID, ICAL_UID_DOMAIN};

/// Everything one VEVENT needs, already resolved from course and room.
#[derive(Debug, Clone)]
pub struct CalendarExam {
    pub exam_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub course_code: String,
    pub course_name: String,
    /// `"<building>, Room <number>"`, or `None` when no room is assigned.
    pub location: Option<String>,
}

/// `20250520T100000Z`
pub fn format_ical_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

// Commas, semicolons and backslashes are structural in TEXT values.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

pub fn render_event(exam: &CalendarExam, stamp: DateTime<Utc>) -> String {
    let location = exam.location.as_deref().unwrap_or("TBD");
    [
        "BEGIN:VEVENT".to_string(),
        format!("UID:exam-{}@{}", exam.exam_id, ICAL_UID_DOMAIN),
        format!("DTSTAMP:{}", format_ical_date(stamp)),
        format!("DTSTART:{}", format_ical_date(exam.start_time)),
        format!("DTEND:{}", format_ical_date(exam.end_time)),
        format!("SUMMARY:{} Exam", escape_text(&exam.course_code)),
        format!("DESCRIPTION:Exam for {}", escape_text(&exam.course_name)),
        format!("LOCATION:{}", escape_text(location)),
        "END:VEVENT".to_string(),
    ]
    .join("\r\n")
}

/// Full VCALENDAR document with one event per exam, CRLF-terminated lines.
pub fn render_calendar(exams: &[CalendarExam], stamp: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{ICAL_PRODID}"),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];
    lines.extend(exams.iter().map(|exam| render_event(exam, stamp)));
    lines.push("END:VCALENDAR".to_string());

    let mut doc = lines.join("\r\n");
    doc.push_str("\r\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> CalendarExam {
        CalendarExam {
            exam_id: Uuid::nil(),
            start_time: Utc.with_ymd_and_hms(2025, 5, 20, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap(),
            course_code: "CS101".into(),
            course_name: "Introduction to Computer Science".into(),
            location: Some("Main Building, Room 101".into()),
        }
    }

    #[test]
    fn test_event_fields() {
        let stamp = Utc.with_ymd_and_hms(2025, 5, 1, 8, 30, 0).unwrap();
        let event = render_event(&sample(), stamp);
        let lines: Vec<&str> = event.split("\r\n").collect();

        assert_eq!(lines[0], "BEGIN:VEVENT");
        assert_eq!(
            lines[1],
            "UID:exam-00000000-0000-0000-0000-000000000000@university-exam-scheduler.com"
        );
        assert_eq!(lines[2], "DTSTAMP:20250501T083000Z");
        assert_eq!(lines[3], "DTSTART:20250520T100000Z");
        assert_eq!(lines[4], "DTEND:20250520T120000Z");
        assert_eq!(lines[5], "SUMMARY:CS101 Exam");
        assert_eq!(lines[6], "DESCRIPTION:Exam for Introduction to Computer Science");
        assert_eq!(lines[7], "LOCATION:Main Building\\, Room 101");
        assert_eq!(lines[8], "END:VEVENT");
    }

    #[test]
    fn test_missing_room_is_tbd() {
        let exam = CalendarExam {
            location: None,
            ..sample()
        };
        assert!(render_event(&exam, Utc::now()).contains("LOCATION:TBD"));
    }

    #[test]
    fn test_calendar_wraps_events() {
        let doc = render_calendar(&[sample(), sample()], Utc::now());
        assert!(doc.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//University Exam Scheduler//EN\r\n"));
        assert!(doc.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(doc.matches("BEGIN:VEVENT").count(), 2);
        assert!(!doc.replace("\r\n", "").contains('\n'));
    }
}

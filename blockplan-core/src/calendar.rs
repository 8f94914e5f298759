//! Calendar export for finished schedules.

use chrono::{DateTime, Utc};

use crate::scheduler::ScheduleEntry;
use crate::time::to_rfc3339_utc;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// One event per entry, using the entry's computed start/end.
pub fn entries_to_events(entries: &[ScheduleEntry], prefix: &str) -> Vec<CalendarEvent> {
    entries
        .iter()
        .map(|e| {
            let mut description = format!(
                "TaskId: {}\nPriority: {}\nFocus: {}\nEnergy: {}\nScore: {:.4}\n",
                e.task.id, e.task.priority, e.task.focus_type, e.task.energy_requirement, e.score
            );
            if let Some(due) = e.task.due_date {
                description.push_str(&format!("Due: {}\n", to_rfc3339_utc(due)));
            }
            CalendarEvent {
                start_utc: e.start_time,
                end_utc: e.end_time,
                summary: format!("{}{}", prefix, e.task.title),
                description,
            }
        })
        .collect()
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Blockplan//EN\n");

    for (i, e) in events.iter().enumerate() {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:blockplan-{}-{}@blockplan\n", e.start_utc.timestamp(), i));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

pub fn entries_to_ics(entries: &[ScheduleEntry], prefix: &str) -> String {
    events_to_ics(&entries_to_events(entries, prefix))
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use crate::slots::TimeSlot;
    use crate::task::Task;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_ics_has_one_event_per_entry_with_utc_times() {
        let start = Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).unwrap();
        let slot = TimeSlot::new(start, start + Duration::minutes(60), 60);
        let tasks = vec![Task::new("t1", "Draft report, v2; final").with_duration(45)];

        let out = Scheduler::default().schedule_tasks(&tasks, &[slot], 5);
        let ics = entries_to_ics(&out, "[bp] ");

        assert!(ics.starts_with("BEGIN:VCALENDAR\n"));
        assert!(ics.ends_with("END:VCALENDAR\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("DTSTART:20260220T090000Z"));
        assert!(ics.contains("DTEND:20260220T094500Z"));
        assert!(ics.contains("SUMMARY:[bp] Draft report\\, v2\\; final"));
        assert!(ics.contains("TaskId: t1\\nPriority: medium"));
        assert!(!ics.contains("Due:"));
    }

    #[test]
    fn test_due_date_lands_in_description_as_rfc3339() {
        let start = Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2026, 2, 21, 17, 0, 0).unwrap();
        let slot = TimeSlot::new(start, start + Duration::minutes(60), 60);
        let tasks = vec![Task::new("t1", "Ship").with_duration(30).with_due_date(due)];

        let out = Scheduler::default().schedule_tasks(&tasks, &[slot], 5);
        let events = entries_to_events(&out, "");
        assert!(events[0].description.ends_with("Due: 2026-02-21T17:00:00+00:00\n"));
    }

    #[test]
    fn test_empty_schedule_is_bare_calendar() {
        let ics = entries_to_ics(&[], "");
        assert!(!ics.contains("VEVENT"));
    }
}

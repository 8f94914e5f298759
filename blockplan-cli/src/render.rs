use blockplan_core::{ScheduleEntry, ScheduleInsights, Scheduler, Task, TimeSlot};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

fn local(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%a %H:%M").to_string()
}

pub fn schedule_text(entries: &[ScheduleEntry], tz: Tz) -> String {
    if entries.is_empty() {
        return "(nothing scheduled)\n".to_string();
    }
    let mut s = String::new();
    for e in entries {
        if e.is_break() {
            s.push_str(&format!(
                "{} - {}  -- break ({} min) --\n",
                local(e.start_time, tz),
                e.end_time.with_timezone(&tz).format("%H:%M"),
                e.duration_minutes()
            ));
            continue;
        }
        s.push_str(&format!(
            "{} - {}  [{:<6}] {} ({}, {} min, score {:.4})\n",
            local(e.start_time, tz),
            e.end_time.with_timezone(&tz).format("%H:%M"),
            e.task.priority,
            e.task.title,
            e.task.focus_type,
            e.task.estimated_minutes,
            e.score
        ));
    }
    s
}

pub fn unscheduled_text(tasks: &[Task]) -> String {
    let mut s = String::new();
    if tasks.is_empty() {
        return s;
    }
    s.push_str(&format!("\nUnscheduled ({}):\n", tasks.len()));
    for t in tasks {
        s.push_str(&format!(
            "- {} [{}] {} min: no free slot long enough\n",
            t.title, t.priority, t.estimated_minutes
        ));
    }
    s
}

pub fn insights_text(insights: &ScheduleInsights) -> String {
    let summary = match insights {
        ScheduleInsights::Empty { message } => return format!("{message}\n"),
        ScheduleInsights::Summary(summary) => summary,
    };

    let mut s = String::new();
    s.push_str(&format!(
        "Tasks: {}  Breaks: {}  Minutes: {}  Efficiency: {:.4}\n",
        summary.total_tasks,
        summary.total_breaks,
        summary.total_duration_minutes,
        summary.schedule_efficiency
    ));
    let join = |m: &std::collections::BTreeMap<String, usize>| {
        m.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    s.push_str(&format!("Priority: {}\n", join(&summary.priority_distribution)));
    s.push_str(&format!("Focus: {}\n", join(&summary.focus_type_distribution)));
    s
}

/// Task x slot score grid; `-` marks slots too short for the task.
pub fn score_matrix_text(
    scheduler: &Scheduler,
    tasks: &[Task],
    slots: &[TimeSlot],
    user_energy: i32,
    tz: Tz,
) -> String {
    let mut s = String::new();
    s.push_str(&format!("{:<24}", "task \\ slot"));
    for slot in slots {
        s.push_str(&format!(" {:>12}", local(slot.start_time, tz)));
    }
    s.push('\n');

    for t in tasks {
        let mut name = t.id.clone();
        name.truncate(24);
        s.push_str(&format!("{:<24}", name));
        for slot in slots {
            if t.estimated_minutes > slot.duration_minutes {
                s.push_str(&format!(" {:>12}", "-"));
            } else {
                let score = scheduler.calculate_task_score(t, slot, user_energy);
                s.push_str(&format!(" {:>12.5}", score));
            }
        }
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockplan_core::{Priority, Scheduler};
    use chrono::{Duration, TimeZone};

    fn slot(h: u32, minutes: i64) -> TimeSlot {
        let start = Utc.with_ymd_and_hms(2026, 2, 20, h, 0, 0).unwrap();
        TimeSlot::new(start, start + Duration::minutes(minutes), minutes)
    }

    #[test]
    fn test_schedule_text_marks_breaks_and_local_times() {
        let s = Scheduler::default();
        let tasks = vec![
            Task::new("a", "Write").with_priority(Priority::High).with_duration(30),
            Task::new("b", "Read").with_duration(30),
        ];
        let out = s.add_breaks(&s.schedule_tasks(&tasks, &[slot(15, 60), slot(16, 60)], 5), None);
        let text = schedule_text(&out, chrono_tz::America::Chicago);

        assert!(text.contains("Fri 09:00 - 09:30"));
        assert!(text.contains("-- break (15 min) --"));
        assert!(text.contains("Write"));
    }

    #[test]
    fn test_matrix_dashes_slots_that_are_too_short() {
        let tasks = vec![Task::new("long", "long").with_duration(90)];
        let text = score_matrix_text(
            &Scheduler::default(),
            &tasks,
            &[slot(9, 60), slot(10, 120)],
            5,
            chrono_tz::UTC,
        );
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains(" -"));
        assert!(row.contains("0.0"));
    }

    #[test]
    fn test_empty_insights_print_message() {
        let text = insights_text(&Scheduler::default().get_schedule_insights(&[]));
        assert_eq!(text, "No tasks scheduled\n");
    }
}

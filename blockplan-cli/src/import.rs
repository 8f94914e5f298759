//! Load tasks, slots and schedules from files.
//!
//! Tasks come from JSON (an array of task objects) or CSV with the header
//! `id,title,priority,estimated_minutes,energy_requirement,focus_type,category,description,due_date`.
//! Columns after `estimated_minutes` may be left out or empty.

use anyhow::{Context, Result};
use blockplan_core::time::parse_local_to_utc;
use blockplan_core::{FocusType, Priority, ScheduleEntry, Task, TimeSlot};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::state::read_json;

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: String,
    title: String,
    #[serde(default)]
    priority: Option<String>,
    estimated_minutes: i64,
    #[serde(default)]
    energy_requirement: Option<i32>,
    #[serde(default)]
    focus_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

/// Load tasks by file extension (`.csv`, anything else is JSON) and warn
/// about rows that fail strict validation. Invalid rows are still returned;
/// the scheduler copes with them.
pub fn load_tasks(path: &Path, tz: &str) -> Result<Vec<Task>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let tasks = if is_csv {
        parse_tasks_csv(path, tz)?
    } else {
        read_json(path)?
    };

    for t in &tasks {
        if let Err(e) = t.validate() {
            warn!(task_id = %t.id, "questionable task: {e}");
        }
    }
    Ok(tasks)
}

pub fn parse_tasks_csv(path: &Path, tz: &str) -> Result<Vec<Task>> {
    let rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_task_rows(rdr, tz).with_context(|| format!("parsing {}", path.display()))
}

fn read_task_rows<R: std::io::Read>(mut rdr: csv::Reader<R>, tz: &str) -> Result<Vec<Task>> {
    let mut tasks = Vec::new();
    for (line, result) in rdr.deserialize::<TaskRow>().enumerate() {
        let row = result.with_context(|| format!("row {}", line + 1))?;
        tasks.push(row_to_task(row, tz)?);
    }
    Ok(tasks)
}

fn row_to_task(row: TaskRow, tz: &str) -> Result<Task> {
    let priority = match row.priority.as_deref().filter(|p| !p.is_empty()) {
        None => Priority::Medium,
        Some(label) => Priority::parse(label).unwrap_or_else(|| {
            // Unknown labels weigh 1.0, same as low.
            warn!(task_id = %row.id, label, "unknown priority; scheduling as low");
            Priority::Low
        }),
    };

    let mut task = Task::new(row.id, row.title)
        .with_priority(priority)
        .with_duration(row.estimated_minutes);

    if let Some(energy) = row.energy_requirement {
        task = task.with_energy(energy);
    }
    if let Some(focus) = row.focus_type.filter(|f| !f.is_empty()) {
        task = task.with_focus(FocusType::from(focus));
    }
    if let Some(category) = row.category {
        task = task.with_category(category);
    }
    if let Some(description) = row.description {
        task = task.with_description(description);
    }
    if let Some(due) = row.due_date.filter(|d| !d.is_empty()) {
        task = task.with_due_date(parse_due_date(&due, tz)?);
    }
    Ok(task)
}

/// RFC3339, or local "YYYY-MM-DD HH:MM" in `tz`.
fn parse_due_date(s: &str, tz: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_local_to_utc(s, tz)
}

pub fn load_slots(path: &Path) -> Result<Vec<TimeSlot>> {
    let slots: Vec<TimeSlot> = read_json(path)?;
    for s in &slots {
        if let Err(e) = s.validate() {
            warn!(start = %s.start_time, "questionable slot: {e}");
        }
    }
    Ok(slots)
}

pub fn load_schedule(path: &Path) -> Result<Vec<ScheduleEntry>> {
    read_json(path)
}

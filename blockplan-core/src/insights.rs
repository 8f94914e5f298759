//! Read-only aggregates over a finished schedule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scheduler::ScheduleEntry;

pub const EMPTY_SCHEDULE_MESSAGE: &str = "No tasks scheduled";

/// Insights for a schedule.
///
/// Serializes untagged: an empty schedule becomes exactly
/// `{"message": "No tasks scheduled"}`, anything else the flat summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleInsights {
    Empty { message: String },
    Summary(InsightSummary),
}

impl ScheduleInsights {
    pub fn summary(&self) -> Option<&InsightSummary> {
        match self {
            ScheduleInsights::Summary(s) => Some(s),
            ScheduleInsights::Empty { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub total_tasks: usize,
    pub total_breaks: usize,
    /// Summed task minutes, breaks excluded.
    pub total_duration_minutes: i64,
    pub priority_distribution: BTreeMap<String, usize>,
    pub focus_type_distribution: BTreeMap<String, usize>,
    /// Mean score over non-break entries; 0.0 when there are none.
    pub schedule_efficiency: f64,
}

pub fn summarize(schedule: &[ScheduleEntry]) -> ScheduleInsights {
    if schedule.is_empty() {
        return ScheduleInsights::Empty {
            message: EMPTY_SCHEDULE_MESSAGE.to_string(),
        };
    }

    let (breaks, tasks): (Vec<&ScheduleEntry>, Vec<&ScheduleEntry>) =
        schedule.iter().partition(|e| e.is_break());

    let mut priority_distribution = BTreeMap::new();
    let mut focus_type_distribution = BTreeMap::new();
    for e in &tasks {
        *priority_distribution
            .entry(e.task.priority.as_str().to_string())
            .or_insert(0) += 1;
        *focus_type_distribution
            .entry(e.task.focus_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let schedule_efficiency = if tasks.is_empty() {
        0.0
    } else {
        tasks.iter().map(|e| e.score).sum::<f64>() / tasks.len() as f64
    };

    ScheduleInsights::Summary(InsightSummary {
        total_tasks: tasks.len(),
        total_breaks: breaks.len(),
        total_duration_minutes: tasks.iter().map(|e| e.task.estimated_minutes).sum(),
        priority_distribution,
        focus_type_distribution,
        schedule_efficiency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use crate::slots::TimeSlot;
    use crate::task::{FocusType, Priority, Task};
    use chrono::{Duration, TimeZone, Utc};

    fn slot(h: u32) -> TimeSlot {
        let start = Utc.with_ymd_and_hms(2026, 2, 20, h, 0, 0).unwrap();
        TimeSlot::new(start, start + Duration::minutes(60), 60)
    }

    #[test]
    fn test_empty_schedule_is_exactly_the_message() {
        let json = serde_json::to_value(summarize(&[])).unwrap();
        assert_eq!(json, serde_json::json!({"message": "No tasks scheduled"}));
    }

    #[test]
    fn test_summary_excludes_breaks_from_task_aggregates() {
        let s = Scheduler::default();
        let tasks = vec![
            Task::new("a", "a").with_priority(Priority::High).with_duration(30),
            Task::new("b", "b")
                .with_duration(20)
                .with_focus(FocusType::Learning),
        ];
        let out = s.schedule_tasks(&tasks, &[slot(9), slot(10)], 5);
        let with_breaks = s.add_breaks(&out, None);
        assert_eq!(with_breaks.len(), 3);

        let insights = s.get_schedule_insights(&with_breaks);
        let summary = insights.summary().unwrap();
        assert_eq!(summary.total_tasks, 2);
        assert_eq!(summary.total_breaks, 1);
        assert_eq!(summary.total_duration_minutes, 50);
        assert_eq!(summary.priority_distribution.get("high"), Some(&1));
        assert_eq!(summary.priority_distribution.get("medium"), Some(&1));
        assert_eq!(summary.priority_distribution.get("low"), None);
        assert_eq!(summary.focus_type_distribution.get("learning"), Some(&1));
        assert_eq!(summary.focus_type_distribution.get("break"), None);

        let mean = (out[0].score + out[1].score) / 2.0;
        assert!((summary.schedule_efficiency - mean).abs() < 1e-12);
    }

    #[test]
    fn test_only_breaks_gives_zero_efficiency() {
        let s = Scheduler::default();
        let tasks = vec![
            Task::new("a", "a").with_priority(Priority::High).with_duration(30),
            Task::new("b", "b").with_duration(30),
        ];
        let out = s.schedule_tasks(&tasks, &[slot(9), slot(10)], 5);
        let breaks: Vec<ScheduleEntry> = s
            .add_breaks(&out, None)
            .into_iter()
            .filter(|e| e.is_break())
            .collect();

        let insights = summarize(&breaks);
        let summary = insights.summary().unwrap();
        assert_eq!(summary.total_tasks, 0);
        assert_eq!(summary.total_breaks, 1);
        assert_eq!(summary.total_duration_minutes, 0);
        assert_eq!(summary.schedule_efficiency, 0.0);
    }

    #[test]
    fn test_summary_json_has_flat_keys() {
        let s = Scheduler::default();
        let out = s.schedule_tasks(&[Task::new("a", "a")], &[slot(9)], 5);
        let json = serde_json::to_string(&summarize(&out)).unwrap();
        assert!(json.contains("\"total_tasks\":1"));
        assert!(json.contains("\"schedule_efficiency\":"));
        assert!(!json.contains("\"message\""));

        let back: ScheduleInsights = serde_json::from_str(&json).unwrap();
        assert!(back.summary().is_some());
    }
}

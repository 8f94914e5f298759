//! Scheduler engine: multi-factor scoring + greedy slot assignment.
//!
//! Every (task, free slot) pair is scored as the product of five factors:
//! priority weight, length, availability fit, energy fit and time of day.
//! Tasks are then walked in priority order and each takes its best-scoring
//! free slot that is long enough. No backtracking, no global optimum.
//!
//! The engine never fails. Malformed input degrades through defaults and a
//! task that fits nowhere is left out of the schedule (see
//! [`Scheduler::schedule_tasks_detailed`] to get those back).

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::config::SchedulerConfig;
use crate::insights::{self, ScheduleInsights};
use crate::slots::TimeSlot;
use crate::task::{FocusType, Priority, Task};
use crate::time::local_hour;

/// Energy level assumed when the caller has no better estimate.
pub const DEFAULT_USER_ENERGY: i32 = 5;

/// Task id carried by synthetic break entries.
pub const BREAK_TASK_ID: &str = "break";

const BREAK_SCORE: f64 = 0.1;

/// One task placed into one slot.
///
/// `start_time`/`end_time` are recomputed from the slot start plus the
/// task's estimate, so `end_time` can be earlier than `time_slot.end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub task: Task,
    pub time_slot: TimeSlot,
    pub score: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScheduleEntry {
    pub fn is_break(&self) -> bool {
        self.task.id == BREAK_TASK_ID
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Greedy assignment result including the tasks that got no slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub entries: Vec<ScheduleEntry>,
    /// Tasks with no eligible slot left, in the order they were considered.
    pub unscheduled: Vec<Task>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Score `task` in `slot`. Higher is better; only meaningful relative to
    /// other scores from the same run.
    pub fn calculate_task_score(&self, task: &Task, slot: &TimeSlot, user_energy: i32) -> f64 {
        let priority = self.config.priority_weight(task.priority);
        let length = 1.0 / task.estimated_minutes.max(1) as f64;
        let availability = availability_factor(task, slot);
        let energy = self.energy_factor(task, user_energy);
        let time = self.time_factor(slot);

        let score = priority * length * availability * energy * time;
        trace!(
            task_id = %task.id,
            slot_start = %slot.start_time,
            priority,
            length,
            availability,
            energy,
            time,
            score,
            "scored task/slot pair"
        );
        score
    }

    /// Energy compatibility times the focus-type multiplier.
    ///
    /// Compatibility compares the task requirement with the caller-supplied
    /// `user_energy`. The slot's own `energy_level` does not take part.
    pub fn energy_factor(&self, task: &Task, user_energy: i32) -> f64 {
        let diff = (i64::from(task.energy_requirement) - i64::from(user_energy)).abs() as f64;
        let compatibility = (1.0 - diff / 10.0).max(0.1);
        compatibility * self.config.energy_multiplier(&task.focus_type)
    }

    /// Morning boost for [06:00, 12:00), afternoon penalty for [14:00, 18:00).
    pub fn time_factor(&self, slot: &TimeSlot) -> f64 {
        match local_hour(slot.start_time, self.config.timezone) {
            6..=11 => self.config.morning_energy_boost,
            14..=17 => self.config.afternoon_energy_penalty,
            _ => 1.0,
        }
    }

    pub fn schedule_tasks(
        &self,
        tasks: &[Task],
        time_slots: &[TimeSlot],
        user_energy: i32,
    ) -> Vec<ScheduleEntry> {
        self.schedule_tasks_detailed(tasks, time_slots, user_energy)
            .entries
    }

    /// Greedy assignment.
    ///
    /// Algorithm (deterministic):
    /// 1) tasks by priority weight DESC (stable, ties keep input order)
    /// 2) slots by start ASC
    /// 3) per task, best score over free slots with duration >= estimate;
    ///    the earliest slot wins a tie. A slot whose start plus the estimate
    ///    falls outside the representable time range is not eligible.
    /// 4) the chosen slot is consumed
    pub fn schedule_tasks_detailed(
        &self,
        tasks: &[Task],
        time_slots: &[TimeSlot],
        user_energy: i32,
    ) -> SchedulePlan {
        let mut ordered: Vec<&Task> = tasks.iter().collect();
        ordered.sort_by(|a, b| {
            self.config
                .priority_weight(b.priority)
                .total_cmp(&self.config.priority_weight(a.priority))
        });

        let mut slots: Vec<&TimeSlot> = time_slots.iter().collect();
        slots.sort_by_key(|s| s.start_time);

        let mut used = vec![false; slots.len()];
        let mut plan = SchedulePlan::default();

        for task in ordered {
            let mut best: Option<(usize, f64, DateTime<Utc>)> = None;

            for (idx, slot) in slots.iter().enumerate() {
                if used[idx] || task.estimated_minutes > slot.duration_minutes {
                    continue;
                }
                let Some(end_time) = minutes_after(slot.start_time, task.estimated_minutes) else {
                    continue;
                };
                let score = self.calculate_task_score(task, slot, user_energy);
                match best {
                    Some((_, best_score, _)) if score <= best_score => {}
                    _ => best = Some((idx, score, end_time)),
                }
            }

            let Some((idx, score, end_time)) = best else {
                debug!(task_id = %task.id, minutes = task.estimated_minutes, "no eligible slot; task left unscheduled");
                plan.unscheduled.push(task.clone());
                continue;
            };

            used[idx] = true;
            let slot = slots[idx];
            let start_time = slot.start_time;
            debug!(task_id = %task.id, %start_time, score, "assigned task to slot");

            plan.entries.push(ScheduleEntry {
                task: task.clone(),
                time_slot: slot.clone(),
                score,
                start_time,
                end_time,
            });
        }

        debug!(
            scheduled = plan.entries.len(),
            unscheduled = plan.unscheduled.len(),
            slots = slots.len(),
            "greedy assignment finished"
        );
        plan
    }

    /// Re-run the full assignment over the tasks and slots of an existing
    /// schedule with a new energy level. Can reshuffle or drop tasks.
    ///
    /// Break entries are synthetic and are not carried over.
    pub fn optimize_schedule(
        &self,
        current_schedule: &[ScheduleEntry],
        user_energy: i32,
    ) -> Vec<ScheduleEntry> {
        let (tasks, slots): (Vec<Task>, Vec<TimeSlot>) = current_schedule
            .iter()
            .filter(|e| !e.is_break())
            .map(|e| (e.task.clone(), e.time_slot.clone()))
            .unzip();

        self.schedule_tasks(&tasks, &slots, user_energy)
    }

    /// Insert a break after entry `i` whenever the gap to entry `i + 1` is
    /// at least `min_break_minutes` (config default when `None`).
    ///
    /// Entries are walked in the order given; callers holding greedy output
    /// should run [`sort_by_start`] first. A break always spans exactly
    /// `min_break_minutes` and never follows the last entry. No break is
    /// inserted when its end would fall outside the representable range.
    pub fn add_breaks(
        &self,
        schedule: &[ScheduleEntry],
        min_break_minutes: Option<i64>,
    ) -> Vec<ScheduleEntry> {
        let min_break = min_break_minutes.unwrap_or(self.config.min_break_minutes);
        let mut out = Vec::with_capacity(schedule.len() * 2);

        for (i, entry) in schedule.iter().enumerate() {
            out.push(entry.clone());

            let Some(next) = schedule.get(i + 1) else { break };
            let gap_secs = next.start_time.signed_duration_since(entry.end_time).num_seconds();
            if gap_secs < min_break.saturating_mul(60) {
                continue;
            }
            if let Some(brk) = break_entry(entry.end_time, min_break) {
                out.push(brk);
            }
        }

        out
    }

    pub fn get_schedule_insights(&self, schedule: &[ScheduleEntry]) -> ScheduleInsights {
        insights::summarize(schedule)
    }
}

/// 1.0 when the task fits the slot, otherwise the covered fraction
/// floored at 0.1 so an oversized task stays scoreable.
pub fn availability_factor(task: &Task, slot: &TimeSlot) -> f64 {
    if task.estimated_minutes <= slot.duration_minutes {
        return 1.0;
    }
    let ratio = slot.duration_minutes as f64 / task.estimated_minutes as f64;
    ratio.max(0.1)
}

/// `start + minutes`, or `None` when that leaves chrono's range.
fn minutes_after(start: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes).and_then(|d| start.checked_add_signed(d))
}

fn break_entry(start_time: DateTime<Utc>, minutes: i64) -> Option<ScheduleEntry> {
    let end_time = minutes_after(start_time, minutes)?;
    let task = Task::new(BREAK_TASK_ID, "Break")
        .with_priority(Priority::Low)
        .with_duration(minutes)
        .with_energy(1)
        .with_focus(FocusType::Break)
        .with_category("break");
    let time_slot = TimeSlot::new(start_time, end_time, minutes).with_focus(FocusType::Break);

    Some(ScheduleEntry {
        task,
        time_slot,
        score: BREAK_SCORE,
        start_time,
        end_time,
    })
}

/// Stable sort by start time.
pub fn sort_by_start(entries: &mut [ScheduleEntry]) {
    entries.sort_by_key(|e| e.start_time);
}

/// Input tasks whose id does not appear in `schedule`.
pub fn unscheduled_tasks(tasks: &[Task], schedule: &[ScheduleEntry]) -> Vec<Task> {
    let placed: HashSet<&str> = schedule.iter().map(|e| e.task.id.as_str()).collect();
    tasks
        .iter()
        .filter(|t| !placed.contains(t.id.as_str()))
        .cloned()
        .collect()
}

/// Process-wide scheduler with the default config, built on first use.
pub fn default_scheduler() -> &'static Scheduler {
    static DEFAULT: OnceLock<Scheduler> = OnceLock::new();
    DEFAULT.get_or_init(Scheduler::default)
}

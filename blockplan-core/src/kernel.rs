//! Planning kernel: wires the scheduler engine to its collaborators.
//!
//! Persistence and energy estimates live behind traits; real adapters
//! (database, calendar sync) are out of scope for this crate. The kernel
//! itself stays synchronous and does no I/O of its own.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;

use crate::insights::ScheduleInsights;
use crate::scheduler::{sort_by_start, ScheduleEntry, Scheduler};
use crate::slots::TimeSlot;
use crate::task::Task;

/// Loads a user's pending work and stores the resulting schedule.
pub trait ScheduleStore {
    fn load_pending_tasks(&self, user_id: &str) -> Result<Vec<Task>>;
    fn load_available_slots(&self, user_id: &str) -> Result<Vec<TimeSlot>>;
    fn save_schedule(&mut self, user_id: &str, schedule: &[ScheduleEntry]) -> Result<()>;
}

pub trait EnergyProvider {
    /// Coarse 1-10 energy level for scoring.
    fn energy_level(&self, now: DateTime<Utc>) -> i32;
}

/// Energy provider that always reports the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEnergy(pub i32);

impl EnergyProvider for FixedEnergy {
    fn energy_level(&self, _now: DateTime<Utc>) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    pub insert_breaks: bool,
    /// Overrides `SchedulerConfig::min_break_minutes` when set.
    pub min_break_minutes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KernelOutput {
    /// Time-ordered entries, breaks included when requested.
    pub entries: Vec<ScheduleEntry>,
    pub unscheduled: Vec<Task>,
    pub insights: ScheduleInsights,
    pub energy_level: i32,
}

#[derive(Debug, Clone)]
pub struct PlanningKernel<S: ScheduleStore, E: EnergyProvider> {
    scheduler: Scheduler,
    store: S,
    energy: E,
}

impl<S: ScheduleStore, E: EnergyProvider> PlanningKernel<S, E> {
    pub fn new(scheduler: Scheduler, store: S, energy: E) -> Self {
        Self {
            scheduler,
            store,
            energy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Plan a user's day:
    /// - load pending tasks + free slots
    /// - greedy assignment at the provider's energy level
    /// - order by start, optionally insert breaks
    /// - compute insights and persist the schedule
    pub fn plan(&mut self, user_id: &str, now: DateTime<Utc>, options: PlanOptions) -> Result<KernelOutput> {
        let tasks = self
            .store
            .load_pending_tasks(user_id)
            .with_context(|| format!("loading pending tasks for {user_id}"))?;
        let slots = self
            .store
            .load_available_slots(user_id)
            .with_context(|| format!("loading available slots for {user_id}"))?;

        let energy_level = self.energy.energy_level(now);
        let plan = self
            .scheduler
            .schedule_tasks_detailed(&tasks, &slots, energy_level);

        let mut entries = plan.entries;
        sort_by_start(&mut entries);
        if options.insert_breaks {
            entries = self.scheduler.add_breaks(&entries, options.min_break_minutes);
        }

        let insights = self.scheduler.get_schedule_insights(&entries);

        self.store
            .save_schedule(user_id, &entries)
            .with_context(|| format!("saving schedule for {user_id}"))?;

        info!(
            user_id,
            energy_level,
            entries = entries.len(),
            unscheduled = plan.unscheduled.len(),
            "planned schedule"
        );

        Ok(KernelOutput {
            entries,
            unscheduled: plan.unscheduled,
            insights,
            energy_level,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct UserState {
    tasks: Vec<Task>,
    slots: Vec<TimeSlot>,
    saved: Option<Vec<ScheduleEntry>>,
}

/// Store kept entirely in memory. Unknown users have no tasks and no slots.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: HashMap<String, UserState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tasks(&mut self, user_id: &str, tasks: Vec<Task>) {
        self.users.entry(user_id.to_string()).or_default().tasks = tasks;
    }

    pub fn set_slots(&mut self, user_id: &str, slots: Vec<TimeSlot>) {
        self.users.entry(user_id.to_string()).or_default().slots = slots;
    }

    pub fn saved_schedule(&self, user_id: &str) -> Option<&[ScheduleEntry]> {
        self.users.get(user_id)?.saved.as_deref()
    }
}

impl ScheduleStore for InMemoryStore {
    fn load_pending_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        Ok(self
            .users
            .get(user_id)
            .map(|u| u.tasks.clone())
            .unwrap_or_default())
    }

    fn load_available_slots(&self, user_id: &str) -> Result<Vec<TimeSlot>> {
        Ok(self
            .users
            .get(user_id)
            .map(|u| u.slots.clone())
            .unwrap_or_default())
    }

    fn save_schedule(&mut self, user_id: &str, schedule: &[ScheduleEntry]) -> Result<()> {
        self.users.entry(user_id.to_string()).or_default().saved = Some(schedule.to_vec());
        Ok(())
    }
}

//! blockplan-core: task/time-block scheduling engine.

pub mod calendar;
pub mod config;
pub mod insights;
pub mod kernel;
pub mod scheduler;
pub mod slots;
pub mod task;
pub mod time;

pub use calendar::{entries_to_ics, CalendarEvent};
pub use config::SchedulerConfig;
pub use insights::{InsightSummary, ScheduleInsights};
pub use kernel::{
    EnergyProvider, FixedEnergy, InMemoryStore, KernelOutput, PlanOptions, PlanningKernel,
    ScheduleStore,
};
pub use scheduler::{
    availability_factor, default_scheduler, sort_by_start, unscheduled_tasks, ScheduleEntry,
    SchedulePlan, Scheduler, BREAK_TASK_ID, DEFAULT_USER_ENERGY,
};
pub use slots::{ceil_to_quarter_hour, slots_between, TimeSlot};
pub use task::{FocusType, Priority, Task};

//! Task model for the time-block scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Label used as the key in `SchedulerConfig::priority_weights`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What kind of attention a task (or slot) calls for.
///
/// Serialized as a plain snake_case label. Labels outside the known set are
/// kept verbatim in `Other` so callers can extend the multiplier table.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FocusType {
    #[default]
    DeepWork,
    Learning,
    Meeting,
    Break,
    Other(String),
}

impl FocusType {
    pub fn as_str(&self) -> &str {
        match self {
            FocusType::DeepWork => "deep_work",
            FocusType::Learning => "learning",
            FocusType::Meeting => "meeting",
            FocusType::Break => "break",
            FocusType::Other(label) => label,
        }
    }
}

impl From<&str> for FocusType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "deep_work" => FocusType::DeepWork,
            "learning" => FocusType::Learning,
            "meeting" => FocusType::Meeting,
            "break" => FocusType::Break,
            _ => FocusType::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for FocusType {
    fn from(s: String) -> Self {
        FocusType::from(s.as_str())
    }
}

impl From<FocusType> for String {
    fn from(f: FocusType) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for FocusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

fn default_energy_requirement() -> i32 {
    5
}

/// A unit of work to schedule.
///
/// Plain value type: the scheduler never mutates tasks, it only clones them
/// into schedule entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    /// Minutes. Expected to be positive.
    pub estimated_minutes: i64,

    /// Grouping label; not used in scoring.
    #[serde(default)]
    pub category: String,

    /// Modeled for callers; scoring does not look at it.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    /// 1-10 mental energy needed.
    #[serde(default = "default_energy_requirement")]
    pub energy_requirement: i32,

    #[serde(default)]
    pub focus_type: FocusType,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            estimated_minutes: 30,
            category: String::new(),
            due_date: None,
            energy_requirement: default_energy_requirement(),
            focus_type: FocusType::DeepWork,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn with_energy(mut self, energy_requirement: i32) -> Self {
        self.energy_requirement = energy_requirement;
        self
    }

    pub fn with_focus(mut self, focus_type: FocusType) -> Self {
        self.focus_type = focus_type;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Strict checks for callers that want them. The scheduler itself
    /// accepts anything and falls back to defaults.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id must be non-empty".to_string());
        }
        if self.estimated_minutes <= 0 {
            return Err(format!(
                "estimated_minutes must be positive (got {})",
                self.estimated_minutes
            ));
        }
        if !(1..=10).contains(&self.energy_requirement) {
            return Err(format!(
                "energy_requirement must be 1..=10 (got {})",
                self.energy_requirement
            ));
        }
        Ok(())
    }
}

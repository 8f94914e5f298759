//! Time slots: intervals of availability the scheduler fills with tasks.

use chrono::{DateTime, Duration, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::task::FocusType;

fn default_energy_level() -> i32 {
    5
}

/// An interval of availability.
///
/// `duration_minutes` is caller-supplied and is NOT derived from
/// `start_time`/`end_time`; keeping the two consistent is on the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,

    /// 1-10 expected energy during this slot.
    #[serde(default = "default_energy_level")]
    pub energy_level: i32,

    #[serde(default)]
    pub focus_type: FocusType,
}

impl TimeSlot {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self {
            start_time,
            end_time,
            duration_minutes,
            energy_level: default_energy_level(),
            focus_type: FocusType::DeepWork,
        }
    }

    /// Slot whose duration is taken from its bounds.
    pub fn spanning(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self::new(start_time, end_time, (end_time - start_time).num_minutes())
    }

    pub fn with_energy(mut self, energy_level: i32) -> Self {
        self.energy_level = energy_level;
        self
    }

    pub fn with_focus(mut self, focus_type: FocusType) -> Self {
        self.focus_type = focus_type;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.end_time <= self.start_time {
            return Err("end_time must be after start_time".to_string());
        }
        if self.duration_minutes <= 0 {
            return Err(format!(
                "duration_minutes must be positive (got {})",
                self.duration_minutes
            ));
        }
        let span = (self.end_time - self.start_time).num_minutes();
        if span != self.duration_minutes {
            return Err(format!(
                "duration_minutes {} disagrees with start/end span of {} minutes",
                self.duration_minutes, span
            ));
        }
        Ok(())
    }
}

/// Round up to the next 15-minute boundary.
pub fn ceil_to_quarter_hour(dt: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = dt
        .with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt);
    let exact = truncated == dt;

    let add = match truncated.minute() % 15 {
        0 if exact => 0,
        0 => 15,
        r => 15 - r,
    };
    truncated + Duration::minutes(add.into())
}

/// Split `[start, end)` into back-to-back slots of `slot_minutes`.
///
/// A trailing partial slot is kept with its shorter duration, and a slot
/// length past the representable range yields one slot for the whole window.
/// Returns an empty list when the window is empty or `slot_minutes` is not
/// positive.
pub fn slots_between(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    slot_minutes: i64,
    energy_level: i32,
) -> Vec<TimeSlot> {
    let mut out = Vec::new();
    if slot_minutes <= 0 || end <= start {
        return out;
    }

    let mut cursor = start;
    while cursor < end {
        let next = TimeDelta::try_minutes(slot_minutes)
            .and_then(|d| cursor.checked_add_signed(d))
            .map_or(end, |n| n.min(end));
        out.push(TimeSlot::spanning(cursor, next).with_energy(energy_level));
        cursor = next;
    }
    out
}

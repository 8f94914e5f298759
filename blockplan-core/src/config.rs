//! Tunable weights for a scheduling run.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::task::{FocusType, Priority};

/// Weighting parameters. Treated as immutable for the lifetime of a
/// `Scheduler`; build a new scheduler to change them.
///
/// The multiplier tables are keyed by label so config files can name focus
/// types the enum does not know about. Missing labels score as 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub morning_energy_boost: f64,
    pub afternoon_energy_penalty: f64,
    pub min_break_minutes: i64,
    /// Zone the slot start hour is read in for the time-of-day factor.
    pub timezone: Tz,
    pub priority_weights: BTreeMap<String, f64>,
    pub energy_multipliers: BTreeMap<String, f64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let priority_weights = [
            (Priority::Urgent, 4.0),
            (Priority::High, 3.0),
            (Priority::Medium, 2.0),
            (Priority::Low, 1.0),
        ]
        .into_iter()
        .map(|(p, w)| (p.as_str().to_string(), w))
        .collect();

        let energy_multipliers = [
            (FocusType::DeepWork, 1.5),
            (FocusType::Learning, 1.2),
            (FocusType::Meeting, 1.0),
            (FocusType::Break, 0.5),
        ]
        .into_iter()
        .map(|(f, m)| (f.as_str().to_string(), m))
        .collect();

        Self {
            morning_energy_boost: 1.2,
            afternoon_energy_penalty: 0.8,
            min_break_minutes: 15,
            timezone: chrono_tz::UTC,
            priority_weights,
            energy_multipliers,
        }
    }
}

impl SchedulerConfig {
    pub fn priority_weight(&self, priority: Priority) -> f64 {
        self.priority_weights
            .get(priority.as_str())
            .copied()
            .unwrap_or(1.0)
    }

    pub fn energy_multiplier(&self, focus_type: &FocusType) -> f64 {
        self.energy_multipliers
            .get(focus_type.as_str())
            .copied()
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_weights() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.priority_weight(Priority::Urgent), 4.0);
        assert_eq!(cfg.priority_weight(Priority::Low), 1.0);
        assert_eq!(cfg.energy_multiplier(&FocusType::DeepWork), 1.5);
        assert_eq!(cfg.energy_multiplier(&FocusType::Break), 0.5);
        assert_eq!(cfg.min_break_minutes, 15);
        assert_eq!(cfg.timezone, chrono_tz::UTC);
    }

    #[test]
    fn test_missing_labels_fall_back_to_one() {
        let mut cfg = SchedulerConfig::default();
        cfg.priority_weights.remove("high");
        assert_eq!(cfg.priority_weight(Priority::High), 1.0);
        assert_eq!(
            cfg.energy_multiplier(&FocusType::Other("errands".into())),
            1.0
        );
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let cfg: SchedulerConfig =
            serde_json::from_str(r#"{"min_break_minutes": 10, "timezone": "Europe/Berlin"}"#)
                .unwrap();
        assert_eq!(cfg.min_break_minutes, 10);
        assert_eq!(cfg.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(cfg.morning_energy_boost, 1.2);
        assert_eq!(cfg.priority_weight(Priority::Medium), 2.0);
    }
}

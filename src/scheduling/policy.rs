//! Scheduling policy configuration.
//!
//! All knobs the validator consults live here, with the defaults the
//! business has always used: Monday through Friday, 9:00-17:00, a 12:00-13:00
//! lunch break, one-hour tours and a symmetric one-hour conflict window.
//! The struct deserializes from the `[scheduling]` section of the
//! application config file.

use chrono::{Duration, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Half-open hour interval `[start, end)` in 24-hour local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }
}

/// Configuration for the scheduling validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    /// Weekday indices on which tours may be scheduled, 0 = Monday.
    #[serde(default = "default_working_days")]
    pub working_days: Vec<u32>,
    /// Business hours as a half-open interval.
    #[serde(default = "default_business_hours")]
    pub business_hours: HourRange,
    /// Lunch window excluded from scheduling; must lie within business hours.
    #[serde(default = "default_lunch_break")]
    pub lunch_break: HourRange,
    /// Minimum separation between two scheduled tours on the same property,
    /// applied symmetrically and inclusively around the candidate start.
    #[serde(default = "default_conflict_window_minutes")]
    pub conflict_window_minutes: i64,
    /// Duration assigned to `end_time` when the client does not supply one.
    #[serde(default = "default_tour_duration_minutes")]
    pub tour_duration_minutes: i64,
    /// Whether candidates at or before the injected "now" are rejected.
    #[serde(default = "default_reject_past")]
    pub reject_past: bool,
}

fn default_working_days() -> Vec<u32> {
    vec![0, 1, 2, 3, 4]
}

fn default_business_hours() -> HourRange {
    HourRange { start: 9, end: 17 }
}

fn default_lunch_break() -> HourRange {
    HourRange { start: 12, end: 13 }
}

fn default_conflict_window_minutes() -> i64 {
    60
}

fn default_tour_duration_minutes() -> i64 {
    60
}

fn default_reject_past() -> bool {
    true
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            working_days: default_working_days(),
            business_hours: default_business_hours(),
            lunch_break: default_lunch_break(),
            conflict_window_minutes: default_conflict_window_minutes(),
            tour_duration_minutes: default_tour_duration_minutes(),
            reject_past: default_reject_past(),
        }
    }
}

impl SchedulingPolicy {
    /// Check the policy for internal consistency.
    ///
    /// # Returns
    /// * `Ok(())` if the policy is usable
    /// * `Err(String)` describing the first problem found
    pub fn validate(&self) -> Result<(), String> {
        if self.working_days.is_empty() {
            return Err("working_days must not be empty".to_string());
        }
        if let Some(day) = self.working_days.iter().find(|d| **d > 6) {
            return Err(format!("working_days entry {} is not a weekday index (0-6)", day));
        }
        if self.business_hours.start >= self.business_hours.end || self.business_hours.end > 24 {
            return Err(format!(
                "business_hours {}-{} is not a valid hour range",
                self.business_hours.start, self.business_hours.end
            ));
        }
        if self.lunch_break.start >= self.lunch_break.end {
            return Err(format!(
                "lunch_break {}-{} is not a valid hour range",
                self.lunch_break.start, self.lunch_break.end
            ));
        }
        if self.lunch_break.start < self.business_hours.start
            || self.lunch_break.end > self.business_hours.end
        {
            return Err("lunch_break must lie within business_hours".to_string());
        }
        if self.conflict_window_minutes < 0 {
            return Err("conflict_window_minutes must be non-negative".to_string());
        }
        if self.tour_duration_minutes <= 0 {
            return Err("tour_duration_minutes must be positive".to_string());
        }
        Ok(())
    }

    /// Whether tours may be scheduled on the given weekday.
    pub fn is_working_day(&self, weekday: Weekday) -> bool {
        self.working_days.contains(&weekday.num_days_from_monday())
    }

    pub fn conflict_window(&self) -> Duration {
        Duration::minutes(self.conflict_window_minutes)
    }

    pub fn tour_duration(&self) -> Duration {
        Duration::minutes(self.tour_duration_minutes)
    }

    /// Resolve a tour's end time: the explicit one when supplied, otherwise
    /// the start plus the configured duration.
    pub fn resolve_end_time(
        &self,
        tour_time: NaiveDateTime,
        explicit: Option<NaiveDateTime>,
    ) -> NaiveDateTime {
        explicit.unwrap_or(tour_time + self.tour_duration())
    }
}

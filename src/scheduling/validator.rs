//! Slot validation for tour scheduling requests.
//!
//! `validate_schedule_request` decides whether a candidate `(property,
//! tour_time)` pair may be booked given the policy and a snapshot of the
//! property's existing tours. Checks run in a fixed order and the first
//! failing rule wins; the outcome is a closed enum so callers and tests can
//! assert on the exact rule that fired.
//!
//! The function is pure: no I/O, no hidden state, and the wall clock enters
//! only through the `now` argument. Atomicity of check-then-insert is the
//! store's responsibility; repositories call this inside their own critical
//! section.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{Tour, TourId, TourStatus};

use super::policy::SchedulingPolicy;

/// Why a scheduling request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    PastTime,
    NonWorkingDay,
    OutsideBusinessHours,
    DuringLunchBreak,
    SlotConflict,
}

impl RejectionReason {
    /// Stable machine-readable code for API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::PastTime => "PAST_TIME",
            RejectionReason::NonWorkingDay => "NON_WORKING_DAY",
            RejectionReason::OutsideBusinessHours => "OUTSIDE_BUSINESS_HOURS",
            RejectionReason::DuringLunchBreak => "DURING_LUNCH_BREAK",
            RejectionReason::SlotConflict => "SLOT_CONFLICT",
        }
    }

    /// Human-readable message for API payloads.
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::PastTime => "Tour time must be in the future",
            RejectionReason::NonWorkingDay => "Tours can only be scheduled on working days",
            RejectionReason::OutsideBusinessHours => "Tour must be during business hours",
            RejectionReason::DuringLunchBreak => {
                "Tours cannot be scheduled during the lunch break"
            }
            RejectionReason::SlotConflict => "Time slot conflict with an existing tour",
        }
    }
}

/// Decision for a candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    Accepted,
    Rejected(RejectionReason),
}

impl ScheduleDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScheduleDecision::Accepted)
    }

    /// The rejection reason, if any.
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            ScheduleDecision::Accepted => None,
            ScheduleDecision::Rejected(reason) => Some(*reason),
        }
    }
}

/// Outcome of an atomic validate-and-write in a repository: the stored tour
/// on success, the rule that fired otherwise.
pub type ScheduleAttempt = Result<Tour, RejectionReason>;

/// Validate a candidate tour slot against the policy and existing tours.
///
/// `existing_tours` is the set of tours for the candidate's property;
/// entries that are not in `Scheduled` status never conflict, so callers may
/// pass the full set or a pre-filtered one. `exclude_tour_id` removes the
/// tour being rescheduled from the conflict scan.
pub fn validate_schedule_request(
    policy: &SchedulingPolicy,
    candidate_time: NaiveDateTime,
    existing_tours: &[Tour],
    exclude_tour_id: Option<TourId>,
    now: NaiveDateTime,
) -> ScheduleDecision {
    if policy.reject_past && candidate_time <= now {
        return ScheduleDecision::Rejected(RejectionReason::PastTime);
    }

    if !policy.is_working_day(candidate_time.weekday()) {
        return ScheduleDecision::Rejected(RejectionReason::NonWorkingDay);
    }

    let hour = candidate_time.hour();
    if !policy.business_hours.contains(hour) {
        return ScheduleDecision::Rejected(RejectionReason::OutsideBusinessHours);
    }

    if policy.lunch_break.contains(hour) {
        return ScheduleDecision::Rejected(RejectionReason::DuringLunchBreak);
    }

    // Inclusive window on both ends, matching the historical `BETWEEN` query.
    let window = policy.conflict_window();
    let window_start = candidate_time - window;
    let window_end = candidate_time + window;
    let conflict = existing_tours.iter().any(|tour| {
        tour.status == TourStatus::Scheduled
            && exclude_tour_id != Some(tour.id)
            && tour.tour_time >= window_start
            && tour.tour_time <= window_end
    });
    if conflict {
        return ScheduleDecision::Rejected(RejectionReason::SlotConflict);
    }

    ScheduleDecision::Accepted
}

//! Scheduling rules for tour appointments.
//!
//! This module is the decision core of TourSync: a pure, deterministic
//! validator that decides whether a candidate slot is bookable, a status
//! transition guard, and the policy struct that parameterizes both. Nothing
//! in here performs I/O or reads the wall clock; "now" is always injected by
//! the caller.

pub mod policy;
pub mod status;
pub mod validator;

pub use policy::{HourRange, SchedulingPolicy};
pub use status::{apply_status_transition, TransitionAttempt, TransitionError};
pub use validator::{
    validate_schedule_request, RejectionReason, ScheduleAttempt, ScheduleDecision,
};

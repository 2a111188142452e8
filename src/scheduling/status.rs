//! Status transition rules for tours.

use chrono::NaiveDateTime;

use crate::models::{Tour, TourStatus};

/// Rejected status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: TourStatus, to: TourStatus },
}

/// Outcome of a conditional status update in a repository.
pub type TransitionAttempt = Result<Tour, TransitionError>;

/// Apply a status transition to a tour.
///
/// The only valid transitions are from `Scheduled` into a terminal state;
/// anything else (terminal to anything, `Scheduled` to `Scheduled`) is an
/// `InvalidTransition`. This guards double-cancel and double-complete at the
/// logic layer; stores must additionally make the update conditional so two
/// racing requests cannot both succeed.
///
/// Returns a copy of the tour with the new status and `updated_at`.
pub fn apply_status_transition(
    tour: &Tour,
    new_status: TourStatus,
    now: NaiveDateTime,
) -> TransitionAttempt {
    if tour.status != TourStatus::Scheduled || !new_status.is_terminal() {
        return Err(TransitionError::InvalidTransition {
            from: tour.status,
            to: new_status,
        });
    }

    let mut updated = tour.clone();
    updated.status = new_status;
    updated.updated_at = now;
    Ok(updated)
}

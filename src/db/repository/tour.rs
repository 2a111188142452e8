//! Tour repository trait.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{NewTour, Tour, TourFilter, TourId, TourStatus, TourUpdate};
use crate::scheduling::{ScheduleAttempt, SchedulingPolicy, TransitionAttempt};

use super::error::RepositoryResult;

/// Storage operations for tours.
///
/// The scheduling methods return a nested result: the outer
/// `RepositoryResult` is for store faults, the inner attempt is the business
/// decision. A rejected slot is a normal outcome, not an error.
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Validate and insert a tour atomically.
    ///
    /// The conflict check and the insert run inside one critical section so
    /// two concurrent requests for the same slot cannot both succeed.
    /// Fails with a validation error when the referenced property is missing
    /// or soft-deleted.
    async fn schedule_tour(
        &self,
        new_tour: NewTour,
        policy: &SchedulingPolicy,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleAttempt>;

    /// Fetch a tour by ID.
    async fn get_tour(&self, id: TourId) -> RepositoryResult<Tour>;

    /// List tours matching the filter, ordered by `tour_time`.
    async fn list_tours(&self, filter: TourFilter) -> RepositoryResult<Vec<Tour>>;

    /// Apply a partial update to a tour.
    ///
    /// When the update changes `tour_time`, the new slot is revalidated in
    /// the same critical section with the tour itself excluded from the
    /// conflict scan. Only tours still in `Scheduled` status may change
    /// times.
    async fn reschedule_tour(
        &self,
        id: TourId,
        update: TourUpdate,
        policy: &SchedulingPolicy,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleAttempt>;

    /// Transition a tour's status.
    ///
    /// The update is conditional on the current status so racing requests
    /// (double-cancel, cancel-vs-complete) cannot both succeed.
    async fn update_tour_status(
        &self,
        id: TourId,
        new_status: TourStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<TransitionAttempt>;

    /// Permanently delete a tour.
    async fn delete_tour(&self, id: TourId) -> RepositoryResult<()>;
}

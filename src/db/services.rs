//! Service layer: repository-agnostic operations used by the HTTP handlers
//! and by integration tests. Thin by design; scheduling decisions live in
//! `crate::scheduling` and atomicity lives in the repositories.

use chrono::NaiveDateTime;

use crate::models::{
    NewProperty, NewTour, Property, PropertyDeleteOutcome, PropertyId, Tour, TourFilter, TourId,
    TourStatus, TourUpdate,
};
use crate::scheduling::{ScheduleAttempt, SchedulingPolicy, TransitionAttempt};

use super::repository::{FullRepository, RepositoryResult};

/// Check backend health.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Schedule a new tour.
pub async fn schedule_tour(
    repo: &dyn FullRepository,
    policy: &SchedulingPolicy,
    new_tour: NewTour,
    now: NaiveDateTime,
) -> RepositoryResult<ScheduleAttempt> {
    let property_id = new_tour.property_id;
    let attempt = repo.schedule_tour(new_tour, policy, now).await?;
    match &attempt {
        Ok(tour) => log::info!(
            "Scheduled tour {} for property {} at {}",
            tour.id,
            tour.property_id,
            tour.tour_time
        ),
        Err(reason) => log::info!(
            "Rejected tour request for property {}: {}",
            property_id,
            reason.code()
        ),
    }
    Ok(attempt)
}

/// Fetch a tour by ID.
pub async fn get_tour(repo: &dyn FullRepository, id: TourId) -> RepositoryResult<Tour> {
    repo.get_tour(id).await
}

/// List tours matching the filter.
pub async fn list_tours(
    repo: &dyn FullRepository,
    filter: TourFilter,
) -> RepositoryResult<Vec<Tour>> {
    repo.list_tours(filter).await
}

/// Apply a partial update, revalidating any time change.
pub async fn reschedule_tour(
    repo: &dyn FullRepository,
    policy: &SchedulingPolicy,
    id: TourId,
    update: TourUpdate,
    now: NaiveDateTime,
) -> RepositoryResult<ScheduleAttempt> {
    let attempt = repo.reschedule_tour(id, update, policy, now).await?;
    if let Err(reason) = &attempt {
        log::info!("Rejected reschedule of tour {}: {}", id, reason.code());
    }
    Ok(attempt)
}

/// Transition a tour's status.
pub async fn update_tour_status(
    repo: &dyn FullRepository,
    id: TourId,
    new_status: TourStatus,
    now: NaiveDateTime,
) -> RepositoryResult<TransitionAttempt> {
    let attempt = repo.update_tour_status(id, new_status, now).await?;
    match &attempt {
        Ok(tour) => log::info!("Tour {} is now {}", tour.id, tour.status),
        Err(err) => log::warn!("Refused status change for tour {}: {}", id, err),
    }
    Ok(attempt)
}

/// Permanently delete a tour.
pub async fn delete_tour(repo: &dyn FullRepository, id: TourId) -> RepositoryResult<()> {
    repo.delete_tour(id).await?;
    log::info!("Deleted tour {}", id);
    Ok(())
}

/// Create a property.
pub async fn create_property(
    repo: &dyn FullRepository,
    new_property: NewProperty,
    now: NaiveDateTime,
) -> RepositoryResult<Property> {
    let property = repo.create_property(new_property, now).await?;
    log::info!("Created property {} at '{}'", property.id, property.address);
    Ok(property)
}

/// Fetch a property by ID.
pub async fn get_property(
    repo: &dyn FullRepository,
    id: PropertyId,
) -> RepositoryResult<Property> {
    repo.get_property(id).await
}

/// List active properties.
pub async fn list_properties(repo: &dyn FullRepository) -> RepositoryResult<Vec<Property>> {
    repo.list_properties().await
}

/// Soft-delete a property unless scheduled tours still reference it.
pub async fn delete_property(
    repo: &dyn FullRepository,
    id: PropertyId,
    now: NaiveDateTime,
) -> RepositoryResult<PropertyDeleteOutcome> {
    let outcome = repo.delete_property(id, now).await?;
    match &outcome {
        PropertyDeleteOutcome::Deleted(property) => {
            log::info!("Soft-deleted property {}", property.id)
        }
        PropertyDeleteOutcome::Blocked { active_tours } => log::info!(
            "Refused to delete property {}: {} scheduled tour(s) remain",
            id,
            active_tours
        ),
    }
    Ok(outcome)
}

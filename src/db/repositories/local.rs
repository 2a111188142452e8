//! In-memory repository backed by `parking_lot` locks.
//!
//! Default backend for development and tests. Every mutating operation takes
//! the write lock for its whole check-then-write sequence, which is what
//! makes `schedule_tour` and friends atomic here; the Postgres backend gets
//! the same guarantee from transactions and row locks.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::RwLock;

use crate::db::repository::{
    ErrorContext, FullRepository, PropertyRepository, RepositoryError, RepositoryResult,
    TourRepository,
};
use crate::models::{
    NewProperty, NewTour, Property, PropertyDeleteOutcome, PropertyId, PropertyStatus, Tour,
    TourFilter, TourId, TourStatus, TourUpdate,
};
use crate::scheduling::{
    apply_status_transition, validate_schedule_request, ScheduleAttempt, SchedulingPolicy,
    TransitionAttempt,
};

#[derive(Debug, Default)]
struct LocalData {
    tours: HashMap<i64, Tour>,
    properties: HashMap<i64, Property>,
    next_tour_id: i64,
    next_property_id: i64,
    healthy: bool,
}

/// In-memory repository for development and testing.
#[derive(Debug, Default)]
pub struct LocalRepository {
    data: RwLock<LocalData>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(LocalData {
                next_tour_id: 1,
                next_property_id: 1,
                healthy: true,
                ..Default::default()
            }),
        }
    }

    /// Simulate backend availability in tests.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().healthy = healthy;
    }

    /// Remove all stored data, keeping ID counters.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.tours.clear();
        data.properties.clear();
    }

    pub fn tour_count(&self) -> usize {
        self.data.read().tours.len()
    }

    pub fn property_count(&self) -> usize {
        self.data.read().properties.len()
    }

    fn unavailable(operation: &str) -> RepositoryError {
        RepositoryError::connection_with_context(
            "Local repository is marked unhealthy",
            ErrorContext::new(operation),
        )
    }
}

fn active_property_or_err(
    data: &LocalData,
    property_id: PropertyId,
    operation: &str,
) -> RepositoryResult<()> {
    match data.properties.get(&property_id.value()) {
        Some(p) if p.is_active() => Ok(()),
        Some(_) => Err(RepositoryError::validation_with_context(
            format!("Property {} has been deleted", property_id),
            ErrorContext::new(operation)
                .with_entity("property")
                .with_entity_id(property_id),
        )),
        None => Err(RepositoryError::validation_with_context(
            format!("Property {} does not exist", property_id),
            ErrorContext::new(operation)
                .with_entity("property")
                .with_entity_id(property_id),
        )),
    }
}

fn property_tours(data: &LocalData, property_id: PropertyId) -> Vec<Tour> {
    data.tours
        .values()
        .filter(|t| t.property_id == property_id)
        .cloned()
        .collect()
}

#[async_trait]
impl TourRepository for LocalRepository {
    async fn schedule_tour(
        &self,
        new_tour: NewTour,
        policy: &SchedulingPolicy,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleAttempt> {
        let mut data = self.data.write();
        if !data.healthy {
            return Err(Self::unavailable("schedule_tour"));
        }

        active_property_or_err(&data, new_tour.property_id, "schedule_tour")?;

        let existing = property_tours(&data, new_tour.property_id);
        let decision =
            validate_schedule_request(policy, new_tour.tour_time, &existing, None, now);
        if let Some(reason) = decision.rejection() {
            return Ok(Err(reason));
        }

        let end_time = policy.resolve_end_time(new_tour.tour_time, new_tour.end_time);
        if end_time <= new_tour.tour_time {
            return Err(RepositoryError::validation_with_context(
                "end_time must be after tour_time",
                ErrorContext::new("schedule_tour").with_entity("tour"),
            ));
        }

        let id = data.next_tour_id;
        data.next_tour_id += 1;
        let tour = Tour {
            id: TourId(id),
            property_id: new_tour.property_id,
            tour_time: new_tour.tour_time,
            end_time,
            status: TourStatus::Scheduled,
            client_name: new_tour.client_name,
            phone_number: new_tour.phone_number,
            created_at: now,
            updated_at: now,
        };
        data.tours.insert(id, tour.clone());
        Ok(Ok(tour))
    }

    async fn get_tour(&self, id: TourId) -> RepositoryResult<Tour> {
        let data = self.data.read();
        if !data.healthy {
            return Err(Self::unavailable("get_tour"));
        }
        data.tours.get(&id.value()).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Tour {} not found", id),
                ErrorContext::new("get_tour")
                    .with_entity("tour")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_tours(&self, filter: TourFilter) -> RepositoryResult<Vec<Tour>> {
        let data = self.data.read();
        if !data.healthy {
            return Err(Self::unavailable("list_tours"));
        }
        let mut tours: Vec<Tour> = data
            .tours
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tours.sort_by_key(|t| (t.tour_time, t.id));
        Ok(tours)
    }

    async fn reschedule_tour(
        &self,
        id: TourId,
        update: TourUpdate,
        policy: &SchedulingPolicy,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleAttempt> {
        let mut data = self.data.write();
        if !data.healthy {
            return Err(Self::unavailable("reschedule_tour"));
        }

        let current = data.tours.get(&id.value()).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Tour {} not found", id),
                ErrorContext::new("reschedule_tour")
                    .with_entity("tour")
                    .with_entity_id(id),
            )
        })?;

        if update.changes_times() && current.status != TourStatus::Scheduled {
            return Err(RepositoryError::validation_with_context(
                format!(
                    "Cannot reschedule a tour in status '{}'",
                    current.status
                ),
                ErrorContext::new("reschedule_tour")
                    .with_entity("tour")
                    .with_entity_id(id),
            ));
        }

        let candidate_time = update.tour_time.unwrap_or(current.tour_time);
        if update.tour_time.is_some() {
            let existing = property_tours(&data, current.property_id);
            let decision =
                validate_schedule_request(policy, candidate_time, &existing, Some(id), now);
            if let Some(reason) = decision.rejection() {
                return Ok(Err(reason));
            }
        }

        let end_time = match (update.tour_time, update.end_time) {
            // A moved start without an explicit end re-derives the end.
            (Some(start), None) => policy.resolve_end_time(start, None),
            (_, Some(end)) => end,
            (None, None) => current.end_time,
        };
        if end_time <= candidate_time {
            return Err(RepositoryError::validation_with_context(
                "end_time must be after tour_time",
                ErrorContext::new("reschedule_tour")
                    .with_entity("tour")
                    .with_entity_id(id),
            ));
        }

        let mut updated = current;
        updated.tour_time = candidate_time;
        updated.end_time = end_time;
        if let Some(name) = update.client_name {
            updated.client_name = name;
        }
        if let Some(phone) = update.phone_number {
            updated.phone_number = phone;
        }
        updated.updated_at = now;
        data.tours.insert(id.value(), updated.clone());
        Ok(Ok(updated))
    }

    async fn update_tour_status(
        &self,
        id: TourId,
        new_status: TourStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<TransitionAttempt> {
        let mut data = self.data.write();
        if !data.healthy {
            return Err(Self::unavailable("update_tour_status"));
        }

        let current = data.tours.get(&id.value()).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Tour {} not found", id),
                ErrorContext::new("update_tour_status")
                    .with_entity("tour")
                    .with_entity_id(id),
            )
        })?;

        match apply_status_transition(&current, new_status, now) {
            Ok(updated) => {
                data.tours.insert(id.value(), updated.clone());
                Ok(Ok(updated))
            }
            Err(err) => Ok(Err(err)),
        }
    }

    async fn delete_tour(&self, id: TourId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        if !data.healthy {
            return Err(Self::unavailable("delete_tour"));
        }
        data.tours.remove(&id.value()).map(|_| ()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Tour {} not found", id),
                ErrorContext::new("delete_tour")
                    .with_entity("tour")
                    .with_entity_id(id),
            )
        })
    }
}

#[async_trait]
impl PropertyRepository for LocalRepository {
    async fn create_property(
        &self,
        new_property: NewProperty,
        now: NaiveDateTime,
    ) -> RepositoryResult<Property> {
        let mut data = self.data.write();
        if !data.healthy {
            return Err(Self::unavailable("create_property"));
        }

        let address = new_property.address.trim().to_string();
        if address.is_empty() {
            return Err(RepositoryError::validation_with_context(
                "Property address must not be empty",
                ErrorContext::new("create_property").with_entity("property"),
            ));
        }
        if data.properties.values().any(|p| p.address == address) {
            return Err(RepositoryError::Conflict {
                message: format!("A property with address '{}' already exists", address),
                context: ErrorContext::new("create_property").with_entity("property"),
            });
        }

        let id = data.next_property_id;
        data.next_property_id += 1;
        let property = Property {
            id: PropertyId(id),
            address,
            status: PropertyStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        data.properties.insert(id, property.clone());
        Ok(property)
    }

    async fn get_property(&self, id: PropertyId) -> RepositoryResult<Property> {
        let data = self.data.read();
        if !data.healthy {
            return Err(Self::unavailable("get_property"));
        }
        data.properties.get(&id.value()).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Property {} not found", id),
                ErrorContext::new("get_property")
                    .with_entity("property")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_properties(&self) -> RepositoryResult<Vec<Property>> {
        let data = self.data.read();
        if !data.healthy {
            return Err(Self::unavailable("list_properties"));
        }
        let mut properties: Vec<Property> = data
            .properties
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        properties.sort_by_key(|p| p.id);
        Ok(properties)
    }

    async fn delete_property(
        &self,
        id: PropertyId,
        now: NaiveDateTime,
    ) -> RepositoryResult<PropertyDeleteOutcome> {
        let mut data = self.data.write();
        if !data.healthy {
            return Err(Self::unavailable("delete_property"));
        }

        let current = data.properties.get(&id.value()).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Property {} not found", id),
                ErrorContext::new("delete_property")
                    .with_entity("property")
                    .with_entity_id(id),
            )
        })?;

        if !current.is_active() {
            return Ok(PropertyDeleteOutcome::Deleted(current));
        }

        let active_tours = data
            .tours
            .values()
            .filter(|t| t.property_id == id && t.status == TourStatus::Scheduled)
            .count();
        if active_tours > 0 {
            return Ok(PropertyDeleteOutcome::Blocked { active_tours });
        }

        let mut deleted = current;
        deleted.status = PropertyStatus::Deleted;
        deleted.deleted_at = Some(now);
        deleted.updated_at = now;
        data.properties.insert(id.value(), deleted.clone());
        Ok(PropertyDeleteOutcome::Deleted(deleted))
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().healthy)
    }
}

//! Property repository trait.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{NewProperty, Property, PropertyDeleteOutcome, PropertyId};

use super::error::RepositoryResult;

/// Storage operations for properties.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Create a property. A duplicate address is a conflict error.
    async fn create_property(
        &self,
        new_property: NewProperty,
        now: NaiveDateTime,
    ) -> RepositoryResult<Property>;

    /// Fetch a property by ID (including soft-deleted ones).
    async fn get_property(&self, id: PropertyId) -> RepositoryResult<Property>;

    /// List active properties, ordered by ID.
    async fn list_properties(&self) -> RepositoryResult<Vec<Property>>;

    /// Soft-delete a property.
    ///
    /// Blocked while any `Scheduled` tour references the property; the count
    /// check and the status flip share one critical section. Deleting an
    /// already-deleted property reports the current record unchanged.
    async fn delete_property(
        &self,
        id: PropertyId,
        now: NaiveDateTime,
    ) -> RepositoryResult<PropertyDeleteOutcome>;
}

//! Row types mapping the domain models onto the Diesel schema.
//!
//! Statuses are stored as text; converting a row back into a domain model
//! parses them, so a corrupted status surfaces as an internal error instead
//! of a panic.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::db::repository::RepositoryError;
use crate::models::{
    Property, PropertyId, PropertyStatus, Tour, TourId, TourStatus,
};

use super::schema::{properties, tours};

#[derive(Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name = tours)]
pub struct TourRow {
    pub id: i64,
    pub property_id: i64,
    pub tour_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub client_name: String,
    pub phone_number: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TourRow> for Tour {
    type Error = RepositoryError;

    fn try_from(row: TourRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TourStatus>().map_err(|e| {
            RepositoryError::internal(format!("Corrupt tour status in row {}: {}", row.id, e))
        })?;
        Ok(Tour {
            id: TourId(row.id),
            property_id: PropertyId(row.property_id),
            tour_time: row.tour_time,
            end_time: row.end_time,
            status,
            client_name: row.client_name,
            phone_number: row.phone_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tours)]
pub struct NewTourRow {
    pub property_id: i64,
    pub tour_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub client_name: String,
    pub phone_number: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name = properties)]
pub struct PropertyRow {
    pub id: i64,
    pub address: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = RepositoryError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<PropertyStatus>().map_err(|e| {
            RepositoryError::internal(format!(
                "Corrupt property status in row {}: {}",
                row.id, e
            ))
        })?;
        Ok(Property {
            id: PropertyId(row.id),
            address: row.address,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = properties)]
pub struct NewPropertyRow {
    pub address: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

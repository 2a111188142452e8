//! Tour records and their lifecycle status.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PropertyId;

/// Unique identifier of a tour, assigned by the store on creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TourId(pub i64);

impl TourId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a tour.
///
/// A tour starts as `Scheduled`; every other status is terminal and admits
/// no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl TourStatus {
    /// String form used for the database `status` column and JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::Scheduled => "scheduled",
            TourStatus::Completed => "completed",
            TourStatus::Cancelled => "cancelled",
            TourStatus::NoShow => "no_show",
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TourStatus::Scheduled)
    }
}

impl FromStr for TourStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(TourStatus::Scheduled),
            "completed" => Ok(TourStatus::Completed),
            "cancelled" => Ok(TourStatus::Cancelled),
            "no_show" => Ok(TourStatus::NoShow),
            other => Err(format!("Unknown tour status: {}", other)),
        }
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled property-viewing appointment.
///
/// Times are property-local wall clock without a timezone offset; the store
/// owns `created_at` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: TourId,
    pub property_id: PropertyId,
    pub tour_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: TourStatus,
    pub client_name: String,
    pub phone_number: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating a tour.
///
/// `end_time` is optional; when absent the store derives it from the
/// configured tour duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTour {
    pub property_id: PropertyId,
    pub tour_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub client_name: String,
    pub phone_number: String,
}

/// Partial update of a tour.
///
/// A `tour_time` change is a reschedule and is revalidated against the
/// scheduling policy with the tour itself excluded from the conflict scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourUpdate {
    pub tour_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub client_name: Option<String>,
    pub phone_number: Option<String>,
}

impl TourUpdate {
    /// Whether this update touches the scheduled times.
    pub fn changes_times(&self) -> bool {
        self.tour_time.is_some() || self.end_time.is_some()
    }
}

/// Filter for tour listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TourFilter {
    pub property_id: Option<PropertyId>,
    pub status: Option<TourStatus>,
}

impl TourFilter {
    pub fn matches(&self, tour: &Tour) -> bool {
        self.property_id.is_none_or(|p| tour.property_id == p)
            && self.status.is_none_or(|s| tour.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            TourStatus::Scheduled,
            TourStatus::Completed,
            TourStatus::Cancelled,
            TourStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<TourStatus>().unwrap(), status);
        }
        assert!("pending".parse::<TourStatus>().is_err());
    }

    #[test]
    fn only_scheduled_is_non_terminal() {
        assert!(!TourStatus::Scheduled.is_terminal());
        assert!(TourStatus::Completed.is_terminal());
        assert!(TourStatus::Cancelled.is_terminal());
        assert!(TourStatus::NoShow.is_terminal());
    }
}

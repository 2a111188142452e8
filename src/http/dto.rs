//! Request and response payloads.
//!
//! Requests validate themselves before any store access; validation produces
//! the domain payload, so handlers never see raw input past this point.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{
    NewProperty, NewTour, Property, PropertyId, Tour, TourFilter, TourStatus, TourUpdate,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub repository: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TourDto {
    pub id: i64,
    pub property_id: i64,
    pub tour_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: TourStatus,
    pub client_name: String,
    pub phone_number: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Tour> for TourDto {
    fn from(tour: Tour) -> Self {
        Self {
            id: tour.id.value(),
            property_id: tour.property_id.value(),
            tour_time: tour.tour_time,
            end_time: tour.end_time,
            status: tour.status,
            client_name: tour.client_name,
            phone_number: tour.phone_number,
            created_at: tour.created_at,
            updated_at: tour.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub property_id: i64,
    pub tour_time: NaiveDateTime,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    pub client_name: String,
    pub phone_number: String,
}

impl CreateTourRequest {
    pub fn validate(self) -> Result<NewTour, String> {
        let client_name = self.client_name.trim().to_string();
        if client_name.is_empty() {
            return Err("client_name must not be empty".to_string());
        }
        if !is_valid_phone(self.phone_number.trim()) {
            return Err("phone_number is not a valid phone number".to_string());
        }
        if let Some(end) = self.end_time {
            if end <= self.tour_time {
                return Err("end_time must be after tour_time".to_string());
            }
        }
        Ok(NewTour {
            property_id: PropertyId(self.property_id),
            tour_time: self.tour_time,
            end_time: self.end_time,
            client_name,
            phone_number: self.phone_number.trim().to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTourRequest {
    #[serde(default)]
    pub tour_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl UpdateTourRequest {
    pub fn validate(self) -> Result<TourUpdate, String> {
        let client_name = match self.client_name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err("client_name must not be empty".to_string());
                }
                Some(name)
            }
            None => None,
        };
        let phone_number = match self.phone_number {
            Some(phone) => {
                let phone = phone.trim().to_string();
                if !is_valid_phone(&phone) {
                    return Err("phone_number is not a valid phone number".to_string());
                }
                Some(phone)
            }
            None => None,
        };
        if let (Some(start), Some(end)) = (self.tour_time, self.end_time) {
            if end <= start {
                return Err("end_time must be after tour_time".to_string());
            }
        }
        Ok(TourUpdate {
            tour_time: self.tour_time,
            end_time: self.end_time,
            client_name,
            phone_number,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListToursQuery {
    #[serde(default)]
    pub property_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ListToursQuery {
    pub fn into_filter(self) -> Result<TourFilter, String> {
        let status = match self.status {
            Some(s) => Some(s.parse::<TourStatus>()?),
            None => None,
        };
        Ok(TourFilter {
            property_id: self.property_id.map(PropertyId),
            status,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TourListResponse {
    pub tours: Vec<TourDto>,
    pub total: usize,
}

impl TourListResponse {
    pub fn from_tours(tours: Vec<Tour>) -> Self {
        let tours: Vec<TourDto> = tours.into_iter().map(TourDto::from).collect();
        let total = tours.len();
        Self { tours, total }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyDto {
    pub id: i64,
    pub address: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<NaiveDateTime>,
}

impl From<Property> for PropertyDto {
    fn from(property: Property) -> Self {
        Self {
            id: property.id.value(),
            address: property.address,
            status: property.status.as_str().to_string(),
            created_at: property.created_at,
            updated_at: property.updated_at,
            deleted_at: property.deleted_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePropertyRequest {
    pub address: String,
}

impl CreatePropertyRequest {
    pub fn validate(self) -> Result<NewProperty, String> {
        let address = self.address.trim().to_string();
        if address.is_empty() {
            return Err("address must not be empty".to_string());
        }
        Ok(NewProperty { address })
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyListResponse {
    pub properties: Vec<PropertyDto>,
    pub total: usize,
}

impl PropertyListResponse {
    pub fn from_properties(properties: Vec<Property>) -> Self {
        let properties: Vec<PropertyDto> =
            properties.into_iter().map(PropertyDto::from).collect();
        let total = properties.len();
        Self { properties, total }
    }
}

/// Phone numbers: optional leading `+`, optional country `1`, then 9 to 15
/// digits. Matches the rule the booking clients have always enforced.
pub fn is_valid_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    let digits_ok = |s: &str| {
        (9..=15).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    digits_ok(rest) || rest.strip_prefix('1').is_some_and(digits_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn phone_validation_accepts_common_forms() {
        assert!(is_valid_phone("+15551234567"));
        assert!(is_valid_phone("15551234567"));
        assert!(is_valid_phone("555123456"));
        assert!(is_valid_phone("+1123456789012345"));
    }

    #[test]
    fn phone_validation_rejects_bad_forms() {
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("12345678"));
        assert!(!is_valid_phone("555-123-4567"));
        assert!(!is_valid_phone("+1234567890123456789"));
        assert!(!is_valid_phone("phone"));
    }

    #[test]
    fn create_request_rejects_blank_name_and_inverted_times() {
        let start = NaiveDate::from_ymd_opt(2026, 9, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let request = CreateTourRequest {
            property_id: 1,
            tour_time: start,
            end_time: None,
            client_name: "   ".to_string(),
            phone_number: "+15551234567".to_string(),
        };
        assert!(request.validate().is_err());

        let request = CreateTourRequest {
            property_id: 1,
            tour_time: start,
            end_time: Some(start - chrono::Duration::minutes(30)),
            client_name: "Ada".to_string(),
            phone_number: "+15551234567".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn list_query_parses_status() {
        let query = ListToursQuery {
            property_id: Some(3),
            status: Some("no_show".to_string()),
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.property_id, Some(PropertyId(3)));
        assert_eq!(filter.status, Some(TourStatus::NoShow));

        let query = ListToursQuery {
            property_id: None,
            status: Some("pending".to_string()),
        };
        assert!(query.into_filter().is_err());
    }
}

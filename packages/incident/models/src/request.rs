//! Boundary validation for incoming creation requests.
//!
//! Raw requests arrive with every field optional and categories as free
//! strings. They are validated exactly once here into strongly typed
//! [`NewIncident`] / [`NewResponder`] values; nothing downstream checks
//! them again.

use std::sync::LazyLock;

use emergency_geo::{Coordinates, InvalidCoordinatesError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{IncidentCategory, ResponderCategory, ResponderRole};

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@ \t\r\n]+@[^@ \t\r\n]+\.[^@ \t\r\n]+$").ok());

/// Errors produced while validating a creation request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The category string is not part of the enumeration.
    #[error("Unknown category: {value}")]
    UnknownCategory {
        /// The rejected value.
        value: String,
    },

    /// Latitude or longitude out of range or not a number.
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(#[from] InvalidCoordinatesError),

    /// The email address is malformed.
    #[error("Invalid email address: {value}")]
    InvalidEmail {
        /// The rejected value.
        value: String,
    },
}

/// An incident-creation request as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
    /// Latitude of the incident.
    pub latitude: Option<f64>,
    /// Longitude of the incident.
    pub longitude: Option<f64>,
    /// Category label, canonical or legacy.
    #[serde(alias = "reportType")]
    pub category: Option<String>,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional reference to an uploaded image.
    pub image_url: Option<String>,
}

/// A validated incident, ready to be persisted and dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    /// Where the incident happened.
    pub location: Coordinates,
    /// Incident category.
    pub category: IncidentCategory,
    /// Free-text description, `None` when blank.
    pub description: Option<String>,
    /// Image reference, `None` when blank.
    pub image_url: Option<String>,
}

impl CreateIncidentRequest {
    /// Validates the request into a [`NewIncident`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the coordinates or category are
    /// missing or invalid.
    pub fn validate(self) -> Result<NewIncident, ValidationError> {
        let latitude = self.latitude.ok_or(ValidationError::MissingField {
            field: "latitude",
        })?;
        let longitude = self.longitude.ok_or(ValidationError::MissingField {
            field: "longitude",
        })?;
        let raw_category = non_blank(self.category).ok_or(ValidationError::MissingField {
            field: "category",
        })?;

        let category: IncidentCategory =
            raw_category
                .parse()
                .map_err(|_| ValidationError::UnknownCategory {
                    value: raw_category.clone(),
                })?;

        Ok(NewIncident {
            location: Coordinates::new(latitude, longitude)?,
            category,
            description: non_blank(self.description),
            image_url: non_blank(self.image_url),
        })
    }
}

/// A responder-creation request submitted by an administrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponderRequest {
    /// Login email.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Category label, canonical or legacy.
    #[serde(alias = "type")]
    pub category: Option<String>,
    /// Latitude of the base location.
    pub latitude: Option<f64>,
    /// Longitude of the base location.
    pub longitude: Option<f64>,
    /// Street address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Initial push notification token.
    pub endpoint_token: Option<String>,
}

/// A validated responder account, ready to be registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResponder {
    /// Login email, lowercased.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Responder category.
    pub category: ResponderCategory,
    /// Account role, derived from the category.
    pub role: ResponderRole,
    /// Base location.
    pub location: Coordinates,
    /// Street address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Initial push notification token.
    pub endpoint_token: Option<String>,
}

impl CreateResponderRequest {
    /// Validates the request into a [`NewResponder`].
    ///
    /// Creating an account with the `admin` category yields the
    /// [`ResponderRole::Admin`] role; every other category is a field unit.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a required field is missing, the
    /// email is malformed, the category is unknown, or the coordinates are
    /// invalid.
    pub fn validate(self) -> Result<NewResponder, ValidationError> {
        let email =
            non_blank(self.email).ok_or(ValidationError::MissingField { field: "email" })?;
        let name = non_blank(self.name).ok_or(ValidationError::MissingField { field: "name" })?;
        let raw_category =
            non_blank(self.category).ok_or(ValidationError::MissingField { field: "category" })?;
        let latitude = self.latitude.ok_or(ValidationError::MissingField {
            field: "latitude",
        })?;
        let longitude = self.longitude.ok_or(ValidationError::MissingField {
            field: "longitude",
        })?;

        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail { value: email });
        }

        let category: ResponderCategory =
            raw_category
                .parse()
                .map_err(|_| ValidationError::UnknownCategory {
                    value: raw_category.clone(),
                })?;

        let role = if category.is_field_unit() {
            ResponderRole::Responder
        } else {
            ResponderRole::Admin
        };

        Ok(NewResponder {
            email: email.to_lowercase(),
            name,
            category,
            role,
            location: Coordinates::new(latitude, longitude)?,
            address: non_blank(self.address),
            phone_number: non_blank(self.phone_number),
            endpoint_token: non_blank(self.endpoint_token),
        })
    }
}

fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}

/// Trims a string and maps blank values to `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_request() -> CreateIncidentRequest {
        CreateIncidentRequest {
            latitude: Some(-8.152_865),
            longitude: Some(113.722_956),
            category: Some("fire".to_string()),
            description: Some("  smoke from a warehouse ".to_string()),
            image_url: Some(String::new()),
        }
    }

    #[test]
    fn validates_complete_incident() {
        let incident = fire_request().validate().unwrap();
        assert_eq!(incident.category, IncidentCategory::Fire);
        assert_eq!(incident.description.as_deref(), Some("smoke from a warehouse"));
        assert!(incident.image_url.is_none());
    }

    #[test]
    fn rejects_missing_fields() {
        let missing_lat = CreateIncidentRequest {
            latitude: None,
            ..fire_request()
        };
        assert_eq!(
            missing_lat.validate(),
            Err(ValidationError::MissingField { field: "latitude" })
        );

        let blank_category = CreateIncidentRequest {
            category: Some("   ".to_string()),
            ..fire_request()
        };
        assert_eq!(
            blank_category.validate(),
            Err(ValidationError::MissingField { field: "category" })
        );
    }

    #[test]
    fn rejects_unknown_category() {
        let request = CreateIncidentRequest {
            category: Some("alien invasion".to_string()),
            ..fire_request()
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::UnknownCategory {
                value: "alien invasion".to_string()
            })
        );
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let request = CreateIncidentRequest {
            latitude: Some(123.0),
            ..fire_request()
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn deserializes_legacy_payload() {
        let request: CreateIncidentRequest = serde_json::from_value(serde_json::json!({
            "latitude": -8.15,
            "longitude": 113.72,
            "reportType": "kecelakaan",
            "description": "motorbike collision"
        }))
        .unwrap();
        let incident = request.validate().unwrap();
        assert_eq!(incident.category, IncidentCategory::TrafficAccident);
    }

    fn hospital_request() -> CreateResponderRequest {
        CreateResponderRequest {
            email: Some("RSD@Example.org".to_string()),
            name: Some("RSD dr. Soebandi".to_string()),
            category: Some("rumah sakit".to_string()),
            latitude: Some(-8.130_761),
            longitude: Some(113.723_049),
            address: None,
            phone_number: Some("+62331487441".to_string()),
            endpoint_token: None,
        }
    }

    #[test]
    fn validates_responder() {
        let responder = hospital_request().validate().unwrap();
        assert_eq!(responder.email, "rsd@example.org");
        assert_eq!(responder.category, ResponderCategory::Hospital);
        assert_eq!(responder.role, ResponderRole::Responder);
    }

    #[test]
    fn admin_category_gets_admin_role() {
        let request = CreateResponderRequest {
            category: Some("admin".to_string()),
            ..hospital_request()
        };
        assert_eq!(request.validate().unwrap().role, ResponderRole::Admin);
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["no-at-sign", "two@@example.org", "spaces in@example.org", "a@b"] {
            let request = CreateResponderRequest {
                email: Some(bad.to_string()),
                ..hospital_request()
            };
            assert!(
                matches!(request.validate(), Err(ValidationError::InvalidEmail { .. })),
                "{bad} should be rejected"
            );
        }
    }
}

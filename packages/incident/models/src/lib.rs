#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident and responder taxonomy types.
//!
//! Defines the closed enumerations used across the dispatch system
//! (incident categories, incident statuses, responder categories and
//! roles), the fixed capability table that decides which responder
//! category handles which incident category, and the persisted
//! [`Incident`] and [`Responder`] entities.
//!
//! Every enumeration parses both its canonical `snake_case` form and the
//! legacy labels stored by the mobile clients (e.g. `"kebakaran"` for
//! [`IncidentCategory::Fire`]).

pub mod request;

use chrono::{DateTime, Utc};
use emergency_geo::Coordinates;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use request::{
    CreateIncidentRequest, CreateResponderRequest, NewIncident, NewResponder, ValidationError,
};

/// Category of a reported incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum IncidentCategory {
    /// Building, vehicle, or wildland fire
    #[serde(alias = "kebakaran")]
    #[strum(to_string = "fire", serialize = "kebakaran")]
    Fire,
    /// Road traffic collision
    #[serde(alias = "kecelakaan")]
    #[strum(to_string = "traffic_accident", serialize = "kecelakaan")]
    TrafficAccident,
    /// Medical emergency
    #[serde(alias = "medis")]
    #[strum(to_string = "medical", serialize = "medis")]
    Medical,
    /// Crime in progress or just committed
    #[serde(alias = "kriminalitas")]
    #[strum(to_string = "crime", serialize = "kriminalitas")]
    Crime,
    /// Flood, earthquake, landslide, and similar events
    #[serde(alias = "bencana alam")]
    #[strum(to_string = "natural_disaster", serialize = "bencana alam")]
    NaturalDisaster,
    /// Anything not covered above
    #[serde(alias = "lainnya")]
    #[strum(to_string = "other", serialize = "lainnya")]
    Other,
}

impl IncidentCategory {
    /// Returns the responder category that must handle this incident, or
    /// `None` when any active field unit may respond.
    #[must_use]
    pub const fn required_capability(self) -> Option<ResponderCategory> {
        match self {
            Self::Fire => Some(ResponderCategory::FireSuppression),
            Self::Medical => Some(ResponderCategory::Hospital),
            Self::TrafficAccident | Self::Crime => Some(ResponderCategory::Police),
            Self::NaturalDisaster | Self::Other => None,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Fire,
            Self::TrafficAccident,
            Self::Medical,
            Self::Crime,
            Self::NaturalDisaster,
            Self::Other,
        ]
    }
}

/// Lifecycle status of an incident.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum IncidentStatus {
    /// Reported, not yet picked up
    #[default]
    #[strum(to_string = "pending")]
    Pending,
    /// A responder is working on it
    #[serde(alias = "diproses")]
    #[strum(to_string = "in_progress", serialize = "diproses")]
    InProgress,
    /// Resolved
    #[serde(alias = "selesai")]
    #[strum(to_string = "done", serialize = "selesai")]
    Done,
    /// Dismissed by the responder
    #[serde(alias = "ditolak")]
    #[strum(to_string = "rejected", serialize = "ditolak")]
    Rejected,
}

impl IncidentStatus {
    /// Whether the reporter may delete an incident in this status.
    #[must_use]
    pub const fn allows_deletion(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Pending, Self::InProgress, Self::Done, Self::Rejected]
    }
}

/// Category of a responder account.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum ResponderCategory {
    /// Fire and rescue service
    #[serde(alias = "pemadam kebakaran")]
    #[strum(to_string = "fire_suppression", serialize = "pemadam kebakaran")]
    FireSuppression,
    /// Hospital or ambulance service
    #[serde(alias = "rumah sakit")]
    #[strum(to_string = "hospital", serialize = "rumah sakit")]
    Hospital,
    /// Police station
    #[serde(alias = "polisi")]
    #[strum(to_string = "police", serialize = "polisi")]
    Police,
    /// Administrative account, never dispatched
    #[strum(to_string = "admin")]
    Admin,
}

impl ResponderCategory {
    /// Whether responders of this category are field units that can be
    /// dispatched to incidents.
    #[must_use]
    pub const fn is_field_unit(self) -> bool {
        !matches!(self, Self::Admin)
    }

    /// Whether this category may respond to incidents of `category`.
    ///
    /// Categories without a configured capability accept every field unit.
    #[must_use]
    pub fn handles(self, category: IncidentCategory) -> bool {
        self.is_field_unit()
            && category
                .required_capability()
                .is_none_or(|required| required == self)
    }

    /// Returns the incident categories this responder category is the
    /// mapped capability for.
    #[must_use]
    pub fn mapped_incident_categories(self) -> Vec<IncidentCategory> {
        IncidentCategory::all()
            .iter()
            .copied()
            .filter(|c| c.required_capability() == Some(self))
            .collect()
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::FireSuppression,
            Self::Hospital,
            Self::Police,
            Self::Admin,
        ]
    }
}

/// Account role of a responder.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponderRole {
    /// Field unit account
    #[default]
    Responder,
    /// Administrator account
    Admin,
}

/// A reported incident as persisted by the incident store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Primary key.
    pub id: i64,
    /// The reporting user.
    pub reporter_id: i64,
    /// Where the incident happened.
    pub location: Coordinates,
    /// Incident category.
    pub category: IncidentCategory,
    /// Free-text description from the reporter.
    pub description: Option<String>,
    /// Reference to an uploaded image.
    pub image_url: Option<String>,
    /// Lifecycle status.
    pub status: IncidentStatus,
    /// Responder that owns this incident, if any.
    pub assigned_responder_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A responder account (field unit or administrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responder {
    /// Primary key.
    pub id: i64,
    /// Login email, the credential reference.
    pub email: String,
    /// Display name of the unit or institution.
    pub name: String,
    /// Responder category.
    pub category: ResponderCategory,
    /// Base location, if known.
    pub location: Option<Coordinates>,
    /// Street address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Account role.
    pub role: ResponderRole,
    /// Whether the responder is currently available.
    pub active: bool,
    /// Push notification token of the responder's device.
    pub endpoint_token: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Responder {
    /// Whether this responder belongs in the active-responder snapshot:
    /// active, a field unit, located, and reachable by notification.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        self.active
            && self.category.is_field_unit()
            && self.location.is_some()
            && self
                .endpoint_token
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency dispatch core.
//!
//! Given a newly created incident and a snapshot of active responders,
//! the [`Dispatcher`] runs a fixed pipeline:
//!
//! 1. **Filter**: keep responders whose category handles the incident
//!    category and whose base is within [`DispatchConfig::max_radius_km`].
//! 2. **Rank**: sort by distance (ties by responder ID) and keep the top
//!    [`DispatchConfig::top_k`].
//! 3. **Assign**: record the nearest candidate as the incident owner.
//! 4. **Fan out**: send one push message to the deduplicated endpoints of
//!    every ranked candidate and summarize delivery in a
//!    [`DeliveryReport`](emergency_dispatch_models::DeliveryReport).
//!
//! Persistence and delivery are injected through the traits in [`store`]
//! and [`channel`]. Notification failures never fail a dispatch;
//! assignment failures do, but never fail incident creation.

pub mod assignment;
pub mod channel;
pub mod config;
pub mod fanout;
pub mod filter;
pub mod lifecycle;
pub mod orchestrator;
pub mod ranker;
pub mod store;

#[cfg(test)]
mod testing;

pub use channel::{ChannelError, NotificationChannel};
pub use config::{ConfigError, DispatchConfig};
pub use lifecycle::LifecycleError;
pub use orchestrator::{CreatedIncident, DispatchResult, Dispatcher};
pub use store::{IncidentStore, ResponderSnapshotProvider, StoreError};

use emergency_incident_models::ValidationError;
use thiserror::Error;

/// Errors that abort a dispatch or the creation of an incident.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The creation request was rejected at the boundary.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The incident could not be persisted.
    #[error("Failed to persist incident: {source}")]
    Persistence {
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The active-responder snapshot could not be read.
    #[error("Failed to read responder snapshot: {source}")]
    Snapshot {
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The owner could not be recorded; the incident stays unassigned.
    #[error("Failed to assign incident {incident_id}: {source}")]
    Assignment {
        /// The incident being dispatched.
        incident_id: i64,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The incident to re-dispatch does not exist.
    #[error("Incident {id} not found")]
    IncidentNotFound {
        /// The missing incident ID.
        id: i64,
    },
}

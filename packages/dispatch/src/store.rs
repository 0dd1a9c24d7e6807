//! Persistence collaborators consumed by the dispatch core.
//!
//! The dispatch core never talks to a database directly. It reads a
//! snapshot of dispatchable responders through
//! [`ResponderSnapshotProvider`] and records incidents and assignments
//! through [`IncidentStore`]. Implementations are injected as
//! `Arc<dyn ...>` so tests can substitute fakes.

use emergency_incident_models::{Incident, IncidentStatus, NewIncident, Responder};
use thiserror::Error;

/// Errors raised by persistence collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The incident does not exist (never created or already deleted).
    #[error("Incident {id} not found")]
    IncidentNotFound {
        /// The missing incident ID.
        id: i64,
    },

    /// The responder does not exist.
    #[error("Responder {id} not found")]
    ResponderNotFound {
        /// The missing responder ID.
        id: i64,
    },

    /// A uniqueness constraint was violated.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflict.
        message: String,
    },

    /// The backing storage could not serve the request.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// Source of the active-responder snapshot.
///
/// Implementations return only responders that are active, belong to a
/// field-unit category, have coordinates, and have a notification
/// endpoint. The snapshot may be slightly stale.
#[async_trait::async_trait]
pub trait ResponderSnapshotProvider: Send + Sync {
    /// Returns every currently dispatchable responder.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be read.
    async fn active_responders(&self) -> Result<Vec<Responder>, StoreError>;
}

/// Incident persistence.
#[async_trait::async_trait]
pub trait IncidentStore: Send + Sync {
    /// Persists a new incident with status `pending` and no owner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the incident cannot be stored.
    async fn create(&self, reporter_id: i64, incident: NewIncident)
    -> Result<Incident, StoreError>;

    /// Loads an incident by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage cannot be read.
    async fn get(&self, id: i64) -> Result<Option<Incident>, StoreError>;

    /// Records `responder_id` as the owner of `incident_id`, replacing any
    /// previous owner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IncidentNotFound`] if the incident no longer
    /// exists, or another [`StoreError`] if the write fails.
    async fn set_assigned_responder(
        &self,
        incident_id: i64,
        responder_id: i64,
    ) -> Result<Incident, StoreError>;

    /// Changes the lifecycle status of an incident.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IncidentNotFound`] if the incident does not
    /// exist.
    async fn update_status(&self, id: i64, status: IncidentStatus)
    -> Result<Incident, StoreError>;

    /// Removes an incident and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IncidentNotFound`] if the incident does not
    /// exist.
    async fn delete(&self, id: i64) -> Result<Incident, StoreError>;

    /// Lists a reporter's incidents, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage cannot be read.
    async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<Incident>, StoreError>;
}

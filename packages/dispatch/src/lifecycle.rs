//! Ownership rules for incidents after dispatch.
//!
//! Only the assigned responder may move an incident through its statuses,
//! and only the reporter may view or delete it. Viewing never dispatches.

use emergency_incident_models::{Incident, IncidentStatus};
use thiserror::Error;

use crate::store::{IncidentStore, StoreError};

/// Errors from lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The incident does not exist.
    #[error("Incident {id} not found")]
    NotFound {
        /// The missing incident ID.
        id: i64,
    },

    /// The caller does not own the incident for this operation.
    #[error("Not permitted to {action} incident {id}")]
    Forbidden {
        /// The incident.
        id: i64,
        /// The attempted action.
        action: &'static str,
    },

    /// The incident is not in a deletable status.
    #[error("Incident {id} cannot be deleted while {status}")]
    NotDeletable {
        /// The incident.
        id: i64,
        /// Its current status.
        status: IncidentStatus,
    },

    /// The store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::IncidentNotFound { id } => Self::NotFound { id },
            other => Self::Store(other),
        }
    }
}

async fn load(store: &dyn IncidentStore, id: i64) -> Result<Incident, LifecycleError> {
    store.get(id).await?.ok_or(LifecycleError::NotFound { id })
}

/// Changes the status of `incident_id` on behalf of `responder_id`.
///
/// # Errors
///
/// Returns [`LifecycleError::Forbidden`] unless `responder_id` is the
/// assigned owner, or [`LifecycleError::NotFound`] if the incident is
/// missing.
pub async fn update_status_by_responder(
    store: &dyn IncidentStore,
    incident_id: i64,
    responder_id: i64,
    status: IncidentStatus,
) -> Result<Incident, LifecycleError> {
    let incident = load(store, incident_id).await?;
    if incident.assigned_responder_id != Some(responder_id) {
        log::warn!(
            "Responder {responder_id} tried to update incident {incident_id} owned by {:?}",
            incident.assigned_responder_id
        );
        return Err(LifecycleError::Forbidden {
            id: incident_id,
            action: "update",
        });
    }

    let updated = store.update_status(incident_id, status).await?;
    log::info!(
        "Incident {incident_id}: status {} -> {status} by responder {responder_id}",
        incident.status
    );
    Ok(updated)
}

/// Deletes `incident_id` on behalf of its reporter.
///
/// # Errors
///
/// Returns [`LifecycleError::Forbidden`] if `reporter_id` did not report
/// the incident, [`LifecycleError::NotDeletable`] unless its status is
/// done, or [`LifecycleError::NotFound`] if it is missing.
pub async fn delete_by_reporter(
    store: &dyn IncidentStore,
    incident_id: i64,
    reporter_id: i64,
) -> Result<Incident, LifecycleError> {
    let incident = load(store, incident_id).await?;
    if incident.reporter_id != reporter_id {
        return Err(LifecycleError::Forbidden {
            id: incident_id,
            action: "delete",
        });
    }
    if !incident.status.allows_deletion() {
        return Err(LifecycleError::NotDeletable {
            id: incident_id,
            status: incident.status,
        });
    }

    let deleted = store.delete(incident_id).await?;
    log::info!("Incident {incident_id} deleted by reporter {reporter_id}");
    Ok(deleted)
}

/// Returns `incident_id` if `reporter_id` reported it.
///
/// # Errors
///
/// Returns [`LifecycleError::Forbidden`] for any other caller, or
/// [`LifecycleError::NotFound`] if the incident is missing.
pub async fn incident_for_reporter(
    store: &dyn IncidentStore,
    incident_id: i64,
    reporter_id: i64,
) -> Result<Incident, LifecycleError> {
    let incident = load(store, incident_id).await?;
    if incident.reporter_id != reporter_id {
        return Err(LifecycleError::Forbidden {
            id: incident_id,
            action: "view",
        });
    }
    Ok(incident)
}

/// Lists the incidents filed by `reporter_id`, newest first.
///
/// # Errors
///
/// Returns [`LifecycleError::Store`] if the store cannot be read.
pub async fn reports_by_reporter(
    store: &dyn IncidentStore,
    reporter_id: i64,
) -> Result<Vec<Incident>, LifecycleError> {
    Ok(store.list_by_reporter(reporter_id).await?)
}

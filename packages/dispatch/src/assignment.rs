//! Incident ownership.
//!
//! Assignment is last-writer-wins: the nearest candidate is written as the
//! owner and the incident is read back straight away. When a concurrent
//! dispatch for the same incident landed in between, the re-read owner is
//! reported with `superseded = true`. Once the write has committed, a failed
//! re-read falls back to the incident the write returned.

use emergency_dispatch_models::{AssignmentDecision, Candidate};

use crate::DispatchError;
use crate::store::{IncidentStore, StoreError};

/// Assigns the first (nearest) of `ranked` as the owner of `incident_id`.
///
/// An empty ranking leaves the incident untouched and returns an
/// unassigned decision. Any existing owner is kept in that case.
///
/// # Errors
///
/// Returns [`DispatchError::Assignment`] if the owner cannot be written, e.g.
/// because the incident was deleted mid-dispatch.
pub async fn resolve(
    store: &dyn IncidentStore,
    incident_id: i64,
    ranked: &[Candidate],
) -> Result<AssignmentDecision, DispatchError> {
    let Some(nearest) = ranked.first() else {
        log::info!("Incident {incident_id}: no candidate in coverage, leaving unassigned");
        return Ok(AssignmentDecision::unassigned(incident_id));
    };
    let responder_id = nearest.responder.id;

    let assignment_error = |source: StoreError| DispatchError::Assignment {
        incident_id,
        source,
    };

    let written = store
        .set_assigned_responder(incident_id, responder_id)
        .await
        .map_err(assignment_error)?;

    let owner = match store.get(incident_id).await {
        Ok(Some(confirmed)) => confirmed.assigned_responder_id,
        Ok(None) => {
            log::warn!(
                "Incident {incident_id}: gone on re-read after assignment, keeping written owner"
            );
            written.assigned_responder_id
        }
        Err(e) => {
            log::warn!(
                "Incident {incident_id}: failed to confirm assignment ({e}), keeping written owner"
            );
            written.assigned_responder_id
        }
    };
    let superseded = owner != Some(responder_id);
    if superseded {
        log::warn!(
            "Incident {incident_id}: assignment to responder {responder_id} superseded by {owner:?}"
        );
    } else {
        log::info!(
            "Incident {incident_id}: assigned to responder {responder_id} ({}, {:.2} km)",
            nearest.responder.name,
            nearest.distance_km
        );
    }

    Ok(AssignmentDecision {
        incident_id,
        assigned_responder_id: owner,
        superseded,
    })
}

//! The per-incident dispatch pipeline.
//!
//! `created → filtered → ranked → assigned|unassigned → notified|notify_skipped`

use std::sync::Arc;

use emergency_dispatch_models::{
    Candidate, CandidateSummary, DeliveryReport, DispatchOutcome, DispatchStage,
};
use emergency_incident_models::{CreateIncidentRequest, Incident, Responder};
use serde::{Deserialize, Serialize};

use crate::channel::NotificationChannel;
use crate::config::DispatchConfig;
use crate::store::{IncidentStore, ResponderSnapshotProvider};
use crate::{DispatchError, assignment, fanout, filter, ranker};

/// Result of the dispatch that follows incident creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchResult {
    /// The pipeline ran to completion (possibly with no coverage).
    Completed(DispatchOutcome),
    /// The pipeline aborted; the incident itself was still created.
    Failed {
        /// Why the dispatch failed.
        message: String,
    },
}

/// A freshly created incident together with its dispatch result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIncident {
    /// The persisted incident, including its owner when one was assigned.
    pub incident: Incident,
    /// What happened during dispatch.
    pub dispatch: DispatchResult,
}

/// Runs dispatches against injected collaborators.
#[derive(Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
    responders: Arc<dyn ResponderSnapshotProvider>,
    incidents: Arc<dyn IncidentStore>,
    channel: Arc<dyn NotificationChannel>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        config: DispatchConfig,
        responders: Arc<dyn ResponderSnapshotProvider>,
        incidents: Arc<dyn IncidentStore>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            config,
            responders,
            incidents,
            channel,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Filters and ranks `responders` for `incident` without side effects.
    #[must_use]
    pub fn plan(&self, incident: &Incident, responders: &[Responder]) -> Vec<Candidate> {
        let filtered = filter::filter_candidates(
            incident.category,
            incident.location,
            responders,
            self.config.max_radius_km,
        );
        log::debug!(
            "Incident {}: {} of {} responder(s) in coverage",
            incident.id,
            filtered.len(),
            responders.len()
        );
        ranker::rank(filtered, self.config.top_k)
    }

    /// Validates and persists a new incident, then dispatches it.
    ///
    /// Dispatch failures are logged and returned as
    /// [`DispatchResult::Failed`]; they never fail the creation.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Validation`] for a malformed request or
    /// [`DispatchError::Persistence`] if the incident cannot be stored.
    pub async fn create_incident(
        &self,
        reporter_id: i64,
        request: CreateIncidentRequest,
    ) -> Result<CreatedIncident, DispatchError> {
        let new_incident = request.validate()?;
        let incident = self
            .incidents
            .create(reporter_id, new_incident)
            .await
            .map_err(|source| DispatchError::Persistence { source })?;
        log::info!(
            "Created incident {} ({}) for reporter {reporter_id}",
            incident.id,
            incident.category
        );

        let dispatch = match self.dispatch(&incident).await {
            Ok(outcome) => DispatchResult::Completed(outcome),
            Err(e) => {
                log::error!("Dispatch for incident {} failed: {e}", incident.id);
                DispatchResult::Failed {
                    message: e.to_string(),
                }
            }
        };

        let incident = match &dispatch {
            DispatchResult::Completed(outcome) if outcome.assignment.is_assigned() => Incident {
                assigned_responder_id: outcome.assignment.assigned_responder_id,
                ..incident
            },
            _ => incident,
        };

        Ok(CreatedIncident { incident, dispatch })
    }

    /// Re-runs dispatch for an existing incident, overwriting its owner
    /// when a candidate is in coverage.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::IncidentNotFound`] if the incident does not
    /// exist, or any error [`Self::dispatch`] returns.
    pub async fn redispatch(&self, incident_id: i64) -> Result<DispatchOutcome, DispatchError> {
        let incident = self
            .incidents
            .get(incident_id)
            .await
            .map_err(|source| DispatchError::Persistence { source })?
            .ok_or(DispatchError::IncidentNotFound { id: incident_id })?;
        log::info!(
            "Re-dispatching incident {incident_id} (current owner {:?})",
            incident.assigned_responder_id
        );
        self.dispatch(&incident).await
    }

    /// Runs filter, rank, assignment and fan-out for a persisted incident.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Snapshot`] if the responder snapshot cannot
    /// be read or [`DispatchError::Assignment`] if the owner cannot be
    /// recorded. Notification failures are only reported.
    pub async fn dispatch(&self, incident: &Incident) -> Result<DispatchOutcome, DispatchError> {
        let mut stages = vec![DispatchStage::Created];

        let responders = self
            .responders
            .active_responders()
            .await
            .map_err(|source| DispatchError::Snapshot { source })?;

        let ranked = self.plan(incident, &responders);
        stages.push(DispatchStage::Filtered);
        stages.push(DispatchStage::Ranked);

        let candidates: Vec<CandidateSummary> = ranked.iter().map(CandidateSummary::from).collect();
        if ranked.is_empty() {
            log::warn!(
                "Incident {}: no {} responder within {} km",
                incident.id,
                incident.category,
                self.config.max_radius_km
            );
        } else {
            log::info!(
                "Incident {}: ranked candidates {}",
                incident.id,
                candidates
                    .iter()
                    .map(|c| format!("{}@{:.2}km", c.responder_id, c.distance_km))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let assignment = assignment::resolve(self.incidents.as_ref(), incident.id, &ranked).await?;
        stages.push(if assignment.is_assigned() {
            DispatchStage::Assigned
        } else {
            DispatchStage::Unassigned
        });

        let endpoints = fanout::deliverable_endpoints(&ranked);
        let delivery = if endpoints.is_empty() {
            log::debug!("Incident {}: no endpoints to notify", incident.id);
            stages.push(DispatchStage::NotifySkipped);
            DeliveryReport::empty()
        } else {
            let message = fanout::build_message(incident, &ranked, &assignment);
            let report = fanout::fan_out(
                self.channel.as_ref(),
                &endpoints,
                &message,
                self.config.notify_timeout(),
            )
            .await;
            log::info!(
                "Incident {}: notified {}/{} endpoint(s)",
                incident.id,
                report.succeeded,
                report.attempted
            );
            stages.push(DispatchStage::Notified);
            report
        };

        Ok(DispatchOutcome {
            incident_id: incident.id,
            candidates,
            assignment,
            delivery,
            stages,
        })
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Types produced by a single dispatch decision.
//!
//! A dispatch scores responders into [`Candidate`]s, records an
//! [`AssignmentDecision`], sends a [`NotificationMessage`] and summarizes
//! delivery in a [`DeliveryReport`]. None of these are persisted; they are
//! returned to the caller and logged.

use std::collections::BTreeMap;

use emergency_incident_models::{Responder, ResponderCategory};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// A responder paired with its distance to the incident being dispatched.
///
/// Lives only for the duration of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The scored responder.
    pub responder: Responder,
    /// Great-circle distance to the incident in kilometers.
    pub distance_km: f64,
}

/// Serializable view of a ranked [`Candidate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    /// Responder primary key.
    pub responder_id: i64,
    /// Responder display name.
    pub name: String,
    /// Responder category.
    pub category: ResponderCategory,
    /// Distance to the incident in kilometers.
    pub distance_km: f64,
}

impl From<&Candidate> for CandidateSummary {
    fn from(c: &Candidate) -> Self {
        Self {
            responder_id: c.responder.id,
            name: c.responder.name.clone(),
            category: c.responder.category,
            distance_km: c.distance_km,
        }
    }
}

/// Which responder ended up owning an incident after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDecision {
    /// The dispatched incident.
    pub incident_id: i64,
    /// The owner, or `None` when no candidate was in coverage.
    pub assigned_responder_id: Option<i64>,
    /// `true` when a concurrent dispatch overwrote this decision's write
    /// before it could be confirmed; `assigned_responder_id` then holds
    /// the confirmed owner.
    pub superseded: bool,
}

impl AssignmentDecision {
    /// A decision that leaves the incident unassigned.
    #[must_use]
    pub const fn unassigned(incident_id: i64) -> Self {
        Self {
            incident_id,
            assigned_responder_id: None,
            superseded: false,
        }
    }

    /// Whether an owner was assigned.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.assigned_responder_id.is_some()
    }
}

/// A push message sent to candidate endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Structured string payload.
    pub data: BTreeMap<String, String>,
}

/// Why delivery to one endpoint failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureCause {
    /// The channel rejected the endpoint (invalid or unregistered token).
    Rejected {
        /// Channel-provided detail.
        message: String,
    },
    /// The channel could not be reached or returned a transient error.
    Unreachable {
        /// Transport or server detail.
        message: String,
    },
    /// The fan-out deadline expired before the channel answered.
    TimedOut {
        /// The deadline that expired, in milliseconds.
        after_ms: u64,
    },
    /// The channel failed as a whole or returned no outcome for this
    /// endpoint.
    Channel {
        /// Failure detail.
        message: String,
    },
}

impl FailureCause {
    /// Human-readable description including the detail message.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Rejected { message } => format!("rejected: {message}"),
            Self::Unreachable { message } => format!("unreachable: {message}"),
            Self::TimedOut { after_ms } => format!("timed out after {after_ms}ms"),
            Self::Channel { message } => format!("channel error: {message}"),
        }
    }
}

/// Outcome reported by a delivery channel for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointOutcome {
    /// The endpoint token.
    pub endpoint: String,
    /// `None` on success, otherwise the failure cause.
    pub failure: Option<FailureCause>,
}

impl EndpointOutcome {
    /// A successful delivery.
    #[must_use]
    pub fn delivered(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            failure: None,
        }
    }

    /// A failed delivery.
    #[must_use]
    pub fn failed(endpoint: impl Into<String>, cause: FailureCause) -> Self {
        Self {
            endpoint: endpoint.into(),
            failure: Some(cause),
        }
    }
}

/// A single failed endpoint in a [`DeliveryReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFailure {
    /// The endpoint token.
    pub endpoint: String,
    /// Why delivery failed.
    pub cause: FailureCause,
}

/// Summary of one notification fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// Number of distinct endpoints a delivery was attempted to.
    pub attempted: usize,
    /// Number of endpoints that accepted the message.
    pub succeeded: usize,
    /// Number of endpoints that failed.
    pub failed: usize,
    /// Failed endpoints with their causes, in attempt order.
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    /// A report for a fan-out that had nothing to deliver.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A report where every endpoint failed with the same cause.
    #[must_use]
    pub fn all_failed(endpoints: &[String], cause: &FailureCause) -> Self {
        Self::from_partial(endpoints, &[], cause)
    }

    /// Builds a report from channel outcomes for the given `endpoints`.
    ///
    /// Each attempted endpoint is counted exactly once. Endpoints the
    /// channel did not report on are counted as failed; outcomes for
    /// endpoints that were never attempted are ignored.
    #[must_use]
    pub fn from_outcomes(endpoints: &[String], outcomes: &[EndpointOutcome]) -> Self {
        Self::from_partial(
            endpoints,
            outcomes,
            &FailureCause::Channel {
                message: "no outcome reported for endpoint".to_string(),
            },
        )
    }

    /// Like [`Self::from_outcomes`], but endpoints without an outcome fail
    /// with `unfinished` (e.g. a timeout that cut delivery short).
    #[must_use]
    pub fn from_partial(
        endpoints: &[String],
        outcomes: &[EndpointOutcome],
        unfinished: &FailureCause,
    ) -> Self {
        let by_endpoint: BTreeMap<&str, &EndpointOutcome> = outcomes
            .iter()
            .map(|outcome| (outcome.endpoint.as_str(), outcome))
            .collect();

        let mut report = Self {
            attempted: endpoints.len(),
            ..Self::default()
        };

        for endpoint in endpoints {
            let cause = match by_endpoint.get(endpoint.as_str()) {
                Some(EndpointOutcome { failure: None, .. }) => None,
                Some(EndpointOutcome {
                    failure: Some(cause),
                    ..
                }) => Some(cause.clone()),
                None => Some(unfinished.clone()),
            };

            match cause {
                None => report.succeeded += 1,
                Some(cause) => {
                    report.failed += 1;
                    report.failures.push(DeliveryFailure {
                        endpoint: endpoint.clone(),
                        cause,
                    });
                }
            }
        }

        report
    }
}

/// Steps of the per-incident dispatch state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DispatchStage {
    /// The incident was persisted.
    Created,
    /// Responders were narrowed by capability and radius.
    Filtered,
    /// Candidates were sorted and truncated to the top K.
    Ranked,
    /// An owner was recorded.
    Assigned,
    /// No candidate was in coverage; the incident stays unassigned.
    Unassigned,
    /// The notification fan-out ran.
    Notified,
    /// There were no endpoints to notify.
    NotifySkipped,
}

/// Consolidated result of dispatching one incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    /// The dispatched incident.
    pub incident_id: i64,
    /// Ranked candidates, nearest first.
    pub candidates: Vec<CandidateSummary>,
    /// The assignment decision.
    pub assignment: AssignmentDecision,
    /// The notification delivery report.
    pub delivery: DeliveryReport,
    /// State machine transitions in the order they happened.
    pub stages: Vec<DispatchStage>,
}

impl DispatchOutcome {
    /// Whether at least one responder was in coverage.
    #[must_use]
    pub fn has_coverage(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// The last stage reached.
    #[must_use]
    pub fn final_stage(&self) -> Option<DispatchStage> {
        self.stages.last().copied()
    }
}

//! Best-effort notification fan-out to ranked candidates.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use emergency_dispatch_models::{
    AssignmentDecision, Candidate, DeliveryReport, FailureCause, NotificationMessage,
};
use emergency_incident_models::Incident;
use futures::StreamExt as _;

use crate::channel::{ChannelError, NotificationChannel};

/// Title of every dispatch notification.
pub const NOTIFICATION_TITLE: &str = "New Emergency Report";

/// Collects the notification endpoints of `ranked`, trimmed, without
/// blanks, and deduplicated keeping rank order.
#[must_use]
pub fn deliverable_endpoints(ranked: &[Candidate]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    ranked
        .iter()
        .filter_map(|c| c.responder.endpoint_token.as_deref())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(*token))
        .map(ToString::to_string)
        .collect()
}

/// Builds the push message for `incident`.
///
/// The responder fields describe the assigned owner when it is among the
/// ranked candidates, otherwise the nearest candidate, otherwise they are
/// empty.
#[must_use]
pub fn build_message(
    incident: &Incident,
    ranked: &[Candidate],
    assignment: &AssignmentDecision,
) -> NotificationMessage {
    let featured = assignment
        .assigned_responder_id
        .and_then(|id| ranked.iter().find(|c| c.responder.id == id))
        .or_else(|| ranked.first());

    let body = featured.map_or_else(
        || format!("Type: {}.", incident.category),
        |c| {
            format!(
                "Type: {}. Nearest responder: {}, {:.2} km away.",
                incident.category, c.responder.name, c.distance_km
            )
        },
    );

    let mut data = BTreeMap::new();
    data.insert("incident_id".to_string(), incident.id.to_string());
    data.insert("category".to_string(), incident.category.to_string());
    data.insert(
        "latitude".to_string(),
        incident.location.latitude.to_string(),
    );
    data.insert(
        "longitude".to_string(),
        incident.location.longitude.to_string(),
    );
    data.insert(
        "responder_id".to_string(),
        featured.map(|c| c.responder.id.to_string()).unwrap_or_default(),
    );
    data.insert(
        "responder_name".to_string(),
        featured.map(|c| c.responder.name.clone()).unwrap_or_default(),
    );
    data.insert(
        "responder_category".to_string(),
        featured
            .map(|c| c.responder.category.to_string())
            .unwrap_or_default(),
    );

    NotificationMessage {
        title: NOTIFICATION_TITLE.to_string(),
        body,
        data,
    }
}

/// Sends `message` to `endpoints` through `channel`, bounded by `timeout`.
///
/// Never fails: outcomes the channel yields before the deadline are kept,
/// and only endpoints still unfinished when the deadline expires (or when
/// the channel fails as a whole) are marked failed. An empty endpoint list
/// is a no-op with zero attempts.
pub async fn fan_out(
    channel: &dyn NotificationChannel,
    endpoints: &[String],
    message: &NotificationMessage,
    timeout: Duration,
) -> DeliveryReport {
    if endpoints.is_empty() {
        return DeliveryReport::empty();
    }

    log::debug!(
        "Sending notification to {} endpoint(s) via {}",
        endpoints.len(),
        channel.name()
    );

    let deadline = tokio::time::Instant::now() + timeout;
    let mut deliveries = channel.send(endpoints, message);
    let mut outcomes = Vec::with_capacity(endpoints.len());

    let unfinished = loop {
        match tokio::time::timeout_at(deadline, deliveries.next()).await {
            Ok(Some(Ok(outcome))) => outcomes.push(outcome),
            Ok(Some(Err(e))) => {
                log::warn!("Channel {} failed as a whole: {e}", channel.name());
                break match e {
                    ChannelError::Unavailable { message } => FailureCause::Unreachable { message },
                    ChannelError::Config { message } => FailureCause::Channel { message },
                };
            }
            Ok(None) => {
                break FailureCause::Channel {
                    message: "no outcome reported for endpoint".to_string(),
                };
            }
            Err(_) => {
                let after_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                log::warn!(
                    "Channel {} did not finish within {after_ms}ms ({} of {} endpoint(s) answered)",
                    channel.name(),
                    outcomes.len(),
                    endpoints.len()
                );
                break FailureCause::TimedOut { after_ms };
            }
        }
    };
    drop(deliveries);

    let report = DeliveryReport::from_partial(endpoints, &outcomes, &unfinished);

    for failure in &report.failures {
        log::warn!(
            "Delivery to endpoint {} failed: {}",
            failure.endpoint,
            failure.cause.describe()
        );
    }

    report
}

//! Fakes for the dispatch collaborators, shared by this crate's tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use emergency_dispatch_models::{EndpointOutcome, FailureCause, NotificationMessage};
use emergency_geo::Coordinates;
use emergency_incident_models::{
    Incident, IncidentCategory, IncidentStatus, NewIncident, Responder, ResponderCategory,
    ResponderRole,
};
use futures::stream::{self, BoxStream, StreamExt as _};

use crate::channel::{ChannelError, NotificationChannel};
use crate::store::{IncidentStore, ResponderSnapshotProvider, StoreError};

pub fn responder(
    id: i64,
    category: ResponderCategory,
    latitude: f64,
    longitude: f64,
    token: Option<&str>,
) -> Responder {
    Responder {
        id,
        email: format!("unit{id}@example.org"),
        name: format!("Unit {id}"),
        category,
        location: Some(Coordinates::new_unchecked(latitude, longitude)),
        address: None,
        phone_number: None,
        role: ResponderRole::Responder,
        active: true,
        endpoint_token: token.map(ToString::to_string),
        created_at: Utc::now(),
    }
}

pub fn incident(id: i64, category: IncidentCategory, latitude: f64, longitude: f64) -> Incident {
    let now = Utc::now();
    Incident {
        id,
        reporter_id: 100,
        location: Coordinates::new_unchecked(latitude, longitude),
        category,
        description: None,
        image_url: None,
        status: IncidentStatus::Pending,
        assigned_responder_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Latitude offset that moves a point `km` kilometers north.
pub fn km_north(km: f64) -> f64 {
    km / 111.194_926_644_558_73
}

pub struct FakeResponders {
    pub responders: Vec<Responder>,
    pub fail: bool,
}

impl FakeResponders {
    pub const fn new(responders: Vec<Responder>) -> Self {
        Self {
            responders,
            fail: false,
        }
    }
}

#[async_trait::async_trait]
impl ResponderSnapshotProvider for FakeResponders {
    async fn active_responders(&self) -> Result<Vec<Responder>, StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable {
                message: "snapshot offline".to_string(),
            });
        }
        Ok(self.responders.clone())
    }
}

#[derive(Default)]
pub struct FakeIncidents {
    pub incidents: Mutex<BTreeMap<i64, Incident>>,
    pub next_id: Mutex<i64>,
    /// Makes every assignment write fail as if storage were down.
    pub fail_assign: bool,
    /// Simulates a concurrent dispatch whose write lands right after ours.
    pub concurrent_owner: Option<i64>,
    /// Simulates the incident being deleted just before the assignment.
    pub delete_before_assign: bool,
    /// Makes every read fail once an assignment has been written.
    pub fail_reads_after_assign: bool,
    pub assigned: AtomicBool,
}

impl FakeIncidents {
    pub fn with(incidents: Vec<Incident>) -> Self {
        let store = Self::default();
        {
            let mut map = store.incidents.lock().unwrap();
            for incident in incidents {
                map.insert(incident.id, incident);
            }
        }
        store
    }

    pub fn owner_of(&self, id: i64) -> Option<i64> {
        self.incidents
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|i| i.assigned_responder_id)
    }
}

#[async_trait::async_trait]
impl IncidentStore for FakeIncidents {
    async fn create(
        &self,
        reporter_id: i64,
        incident: NewIncident,
    ) -> Result<Incident, StoreError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let now = Utc::now();
        let created = Incident {
            id,
            reporter_id,
            location: incident.location,
            category: incident.category,
            description: incident.description,
            image_url: incident.image_url,
            status: IncidentStatus::Pending,
            assigned_responder_id: None,
            created_at: now,
            updated_at: now,
        };
        self.incidents.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Incident>, StoreError> {
        if self.fail_reads_after_assign && self.assigned.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "read replica down".to_string(),
            });
        }
        Ok(self.incidents.lock().unwrap().get(&id).cloned())
    }

    async fn set_assigned_responder(
        &self,
        incident_id: i64,
        responder_id: i64,
    ) -> Result<Incident, StoreError> {
        if self.fail_assign {
            return Err(StoreError::Unavailable {
                message: "write rejected".to_string(),
            });
        }
        let mut map = self.incidents.lock().unwrap();
        if self.delete_before_assign {
            map.remove(&incident_id);
        }
        let incident = map
            .get_mut(&incident_id)
            .ok_or(StoreError::IncidentNotFound { id: incident_id })?;
        incident.assigned_responder_id = Some(responder_id);
        incident.updated_at = Utc::now();
        self.assigned.store(true, Ordering::SeqCst);
        let written = incident.clone();
        if let Some(other) = self.concurrent_owner {
            incident.assigned_responder_id = Some(other);
        }
        Ok(written)
    }

    async fn update_status(
        &self,
        id: i64,
        status: IncidentStatus,
    ) -> Result<Incident, StoreError> {
        let mut map = self.incidents.lock().unwrap();
        let incident = map
            .get_mut(&id)
            .ok_or(StoreError::IncidentNotFound { id })?;
        incident.status = status;
        Ok(incident.clone())
    }

    async fn delete(&self, id: i64) -> Result<Incident, StoreError> {
        self.incidents
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(StoreError::IncidentNotFound { id })
    }

    async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<Incident>, StoreError> {
        let mut incidents: Vec<Incident> = self
            .incidents
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.reporter_id == reporter_id)
            .cloned()
            .collect();
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(incidents)
    }
}

#[derive(Default)]
pub struct RecordingChannel {
    pub calls: Mutex<Vec<(Vec<String>, NotificationMessage)>>,
    pub rejected: BTreeSet<String>,
    /// Endpoints whose delivery never finishes.
    pub hanging: BTreeSet<String>,
    /// Delay before each endpoint's outcome is yielded.
    pub delay: Option<Duration>,
    pub unavailable: bool,
}

impl RecordingChannel {
    pub fn rejecting(endpoints: &[&str]) -> Self {
        Self {
            rejected: endpoints.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(Vec<String>, NotificationMessage)> {
        self.calls.lock().unwrap().last().cloned()
    }

    async fn deliver(&self, endpoint: &str) -> EndpointOutcome {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.hanging.contains(endpoint) {
            std::future::pending::<()>().await;
        }
        if self.rejected.contains(endpoint) {
            EndpointOutcome::failed(
                endpoint,
                FailureCause::Rejected {
                    message: "UNREGISTERED".to_string(),
                },
            )
        } else {
            EndpointOutcome::delivered(endpoint)
        }
    }
}

impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        endpoints: &'a [String],
        message: &'a NotificationMessage,
    ) -> BoxStream<'a, Result<EndpointOutcome, ChannelError>> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoints.to_vec(), message.clone()));

        if self.unavailable {
            return stream::iter([Err(ChannelError::Unavailable {
                message: "connection refused".to_string(),
            })])
            .boxed();
        }

        stream::iter(endpoints)
            .map(|endpoint| self.deliver(endpoint))
            .buffer_unordered(endpoints.len().max(1))
            .map(Ok)
            .boxed()
    }
}

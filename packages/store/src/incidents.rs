//! In-memory incident store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use emergency_dispatch::{IncidentStore, StoreError};
use emergency_incident_models::{Incident, IncidentStatus, NewIncident};
use tokio::sync::RwLock;

/// Incidents keyed by ID.
#[derive(Debug, Default)]
pub struct MemoryIncidentStore {
    incidents: RwLock<BTreeMap<i64, Incident>>,
    last_id: AtomicI64,
}

impl MemoryIncidentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored incidents.
    pub async fn len(&self) -> usize {
        self.incidents.read().await.len()
    }

    /// Whether the store holds no incidents.
    pub async fn is_empty(&self) -> bool {
        self.incidents.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl IncidentStore for MemoryIncidentStore {
    async fn create(
        &self,
        reporter_id: i64,
        incident: NewIncident,
    ) -> Result<Incident, StoreError> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
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
        self.incidents.write().await.insert(id, created.clone());
        log::debug!("Stored incident {id}");
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Incident>, StoreError> {
        Ok(self.incidents.read().await.get(&id).cloned())
    }

    async fn set_assigned_responder(
        &self,
        incident_id: i64,
        responder_id: i64,
    ) -> Result<Incident, StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&incident_id)
            .ok_or(StoreError::IncidentNotFound { id: incident_id })?;
        incident.assigned_responder_id = Some(responder_id);
        incident.updated_at = Utc::now();
        Ok(incident.clone())
    }

    async fn update_status(
        &self,
        id: i64,
        status: IncidentStatus,
    ) -> Result<Incident, StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&id)
            .ok_or(StoreError::IncidentNotFound { id })?;
        incident.status = status;
        incident.updated_at = Utc::now();
        Ok(incident.clone())
    }

    async fn delete(&self, id: i64) -> Result<Incident, StoreError> {
        self.incidents
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::IncidentNotFound { id })
    }

    async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<Incident>, StoreError> {
        let mut incidents: Vec<Incident> = self
            .incidents
            .read()
            .await
            .values()
            .filter(|i| i.reporter_id == reporter_id)
            .cloned()
            .collect();
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(incidents)
    }
}

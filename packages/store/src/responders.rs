//! In-memory responder registry.
//!
//! Holds every responder account, including inactive units and
//! administrators, and serves the active-responder snapshot used by
//! dispatch.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use emergency_dispatch::{ResponderSnapshotProvider, StoreError};
use emergency_incident_models::{NewResponder, Responder};
use tokio::sync::RwLock;

/// Responder accounts keyed by ID.
#[derive(Debug, Default)]
pub struct ResponderRegistry {
    responders: RwLock<BTreeMap<i64, Responder>>,
    last_id: AtomicI64,
}

impl ResponderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new responder account. New accounts start active.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the email is already registered.
    pub async fn register(&self, responder: NewResponder) -> Result<Responder, StoreError> {
        let mut responders = self.responders.write().await;
        if responders
            .values()
            .any(|r| r.email.eq_ignore_ascii_case(&responder.email))
        {
            return Err(StoreError::Conflict {
                message: format!("email {} is already registered", responder.email),
            });
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let registered = Responder {
            id,
            email: responder.email,
            name: responder.name,
            category: responder.category,
            location: Some(responder.location),
            address: responder.address,
            phone_number: responder.phone_number,
            role: responder.role,
            active: true,
            endpoint_token: responder.endpoint_token,
            created_at: Utc::now(),
        };
        responders.insert(id, registered.clone());
        drop(responders);

        log::info!(
            "Registered responder {id} ({}, {})",
            registered.name,
            registered.category
        );
        Ok(registered)
    }

    /// Loads a responder by ID.
    pub async fn get(&self, id: i64) -> Option<Responder> {
        self.responders.read().await.get(&id).cloned()
    }

    /// Returns every registered responder ordered by ID.
    pub async fn list(&self) -> Vec<Responder> {
        self.responders.read().await.values().cloned().collect()
    }

    /// Marks a responder available or unavailable for dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResponderNotFound`] if the responder does not
    /// exist.
    pub async fn set_availability(&self, id: i64, active: bool) -> Result<Responder, StoreError> {
        let mut responders = self.responders.write().await;
        let responder = responders
            .get_mut(&id)
            .ok_or(StoreError::ResponderNotFound { id })?;
        responder.active = active;
        log::debug!("Responder {id} availability set to {active}");
        Ok(responder.clone())
    }

    /// Replaces a responder's push notification token. Blank tokens clear
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResponderNotFound`] if the responder does not
    /// exist.
    pub async fn set_endpoint_token(
        &self,
        id: i64,
        token: Option<&str>,
    ) -> Result<Responder, StoreError> {
        let mut responders = self.responders.write().await;
        let responder = responders
            .get_mut(&id)
            .ok_or(StoreError::ResponderNotFound { id })?;
        responder.endpoint_token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        Ok(responder.clone())
    }
}

#[async_trait::async_trait]
impl ResponderSnapshotProvider for ResponderRegistry {
    async fn active_responders(&self) -> Result<Vec<Responder>, StoreError> {
        Ok(self
            .responders
            .read()
            .await
            .values()
            .filter(|r| r.is_dispatchable())
            .cloned()
            .collect())
    }
}

//! TOML dispatch scenarios: a set of responders plus one incident report.

use std::path::Path;

use emergency_dispatch::DispatchConfig;
use emergency_incident_models::{CreateIncidentRequest, CreateResponderRequest, ValidationError};
use emergency_store::ResponderRegistry;
use serde::Deserialize;
use thiserror::Error;

/// Errors from loading or seeding a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    /// The scenario file is not valid TOML for a [`Scenario`].
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    /// A responder entry failed validation.
    #[error("Responder #{index} is invalid: {source}")]
    Responder {
        /// Zero-based position in the file.
        index: usize,
        /// The validation failure.
        #[source]
        source: ValidationError,
    },

    /// The registry refused a responder.
    #[error("Failed to register responder #{index}: {message}")]
    Registry {
        /// Zero-based position in the file.
        index: usize,
        /// The store error.
        message: String,
    },
}

/// A dispatch scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// The reporting user.
    #[serde(default = "default_reporter")]
    pub reporter_id: i64,
    /// Optional dispatch tuning; defaults apply when omitted.
    #[serde(default)]
    pub config: Option<DispatchConfig>,
    /// The incident report to create.
    pub incident: ScenarioIncident,
    /// Responder accounts to seed.
    #[serde(default)]
    pub responders: Vec<ScenarioResponder>,
}

/// An incident report in a scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioIncident {
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A responder account in a scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioResponder {
    pub email: String,
    pub name: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub endpoint_token: Option<String>,
    /// Starts the responder off duty when `false`.
    #[serde(default = "default_true")]
    pub active: bool,
}

const fn default_reporter() -> i64 {
    1
}

const fn default_true() -> bool {
    true
}

impl Scenario {
    /// Parses a scenario from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] if the document is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(toml::de::from_str(s)?)
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The incident as a creation request.
    #[must_use]
    pub fn incident_request(&self) -> CreateIncidentRequest {
        CreateIncidentRequest {
            latitude: Some(self.incident.latitude),
            longitude: Some(self.incident.longitude),
            category: Some(self.incident.category.clone()),
            description: self.incident.description.clone(),
            image_url: self.incident.image_url.clone(),
        }
    }

    /// Registers every scenario responder in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] for the first responder that fails
    /// validation or registration.
    pub async fn seed(&self, registry: &ResponderRegistry) -> Result<usize, ScenarioError> {
        for (index, entry) in self.responders.iter().enumerate() {
            let request = CreateResponderRequest {
                email: Some(entry.email.clone()),
                name: Some(entry.name.clone()),
                category: Some(entry.category.clone()),
                latitude: Some(entry.latitude),
                longitude: Some(entry.longitude),
                address: entry.address.clone(),
                phone_number: entry.phone_number.clone(),
                endpoint_token: entry.endpoint_token.clone(),
            };
            let new_responder = request
                .validate()
                .map_err(|source| ScenarioError::Responder { index, source })?;

            let registry_error = |e: emergency_dispatch::StoreError| ScenarioError::Registry {
                index,
                message: e.to_string(),
            };
            let responder = registry
                .register(new_responder)
                .await
                .map_err(registry_error)?;
            if !entry.active {
                registry
                    .set_availability(responder.id, false)
                    .await
                    .map_err(registry_error)?;
            }
        }
        Ok(self.responders.len())
    }
}

#[cfg(test)]
mod tests {
    use emergency_dispatch::ResponderSnapshotProvider as _;

    use super::*;

    const FIRE_EXAMPLE: &str = include_str!("../scenarios/fire_example.toml");
    const JEMBER: &str = include_str!("../scenarios/jember.toml");

    #[test]
    fn parses_bundled_scenarios() {
        let fire = Scenario::from_toml_str(FIRE_EXAMPLE).unwrap();
        assert_eq!(fire.responders.len(), 4);
        assert!(fire.config.is_none());
        assert!(fire.incident_request().validate().is_ok());

        let jember = Scenario::from_toml_str(JEMBER).unwrap();
        assert_eq!(jember.reporter_id, 7);
        assert!(jember.responders.iter().any(|r| !r.active));
    }

    #[test]
    fn parses_inline_config() {
        let scenario = Scenario::from_toml_str(
            r#"
            [config]
            top_k = 1

            [incident]
            category = "medis"
            latitude = 0.0
            longitude = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(scenario.config.unwrap().top_k, 1);
        assert_eq!(scenario.reporter_id, 1);
        assert!(scenario.responders.is_empty());
    }

    #[tokio::test]
    async fn seeding_respects_availability() {
        let scenario = Scenario::from_toml_str(JEMBER).unwrap();
        let registry = ResponderRegistry::new();

        let seeded = scenario.seed(&registry).await.unwrap();

        assert_eq!(seeded, 6);
        assert_eq!(registry.active_responders().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn invalid_responder_is_reported_with_index() {
        let scenario = Scenario::from_toml_str(
            r#"
            [incident]
            category = "fire"
            latitude = 0.0
            longitude = 0.0

            [[responders]]
            email = "not-an-email"
            name = "Broken"
            category = "police"
            latitude = 0.0
            longitude = 0.0
            "#,
        )
        .unwrap();

        let err = scenario.seed(&ResponderRegistry::new()).await.unwrap_err();

        assert!(matches!(err, ScenarioError::Responder { index: 0, .. }));
    }
}

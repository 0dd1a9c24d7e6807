//! Compile-time registry of notification channel configurations.
//!
//! Each channel is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`enabled_services`].

use serde::Deserialize;

use crate::NotificationError;

/// A notification channel configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelService {
    /// Unique identifier (e.g., `"fcm"`, `"log"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this channel may be selected.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Auto-detection order, lower values are preferred.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Firebase Cloud Messaging HTTP v1 API.
    Fcm {
        /// API base URL (e.g., `"https://fcm.googleapis.com"`).
        base_url: String,
        /// Number of concurrent send requests.
        #[serde(default = "default_concurrent")]
        concurrent_requests: usize,
        /// Per-request timeout in milliseconds.
        #[serde(default = "default_request_timeout_ms")]
        request_timeout_ms: u64,
    },
    /// Writes messages to the log instead of delivering them.
    Log,
}

const fn default_true() -> bool {
    true
}

const fn default_concurrent() -> usize {
    10
}

const fn default_request_timeout_ms() -> u64 {
    5_000
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("fcm", include_str!("../services/fcm.toml")),
    ("log", include_str!("../services/log.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 2;

/// Returns all channel configurations (enabled and disabled).
///
/// # Errors
///
/// Returns [`NotificationError::Registry`] if an embedded TOML file is
/// malformed.
pub fn all_services() -> Result<Vec<ChannelService>, NotificationError> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str).map_err(|source| NotificationError::Registry {
                name: (*name).to_string(),
                source,
            })
        })
        .collect()
}

/// Returns only enabled channels, sorted by priority (ascending).
///
/// # Errors
///
/// Returns [`NotificationError::Registry`] if an embedded TOML file is
/// malformed.
pub fn enabled_services() -> Result<Vec<ChannelService>, NotificationError> {
    let mut services: Vec<ChannelService> = all_services()?
        .into_iter()
        .filter(|s| s.enabled)
        .collect();
    services.sort_by_key(|s| s.priority);
    Ok(services)
}

/// Looks up an enabled channel by ID.
///
/// # Errors
///
/// Returns [`NotificationError::UnknownChannel`] if no enabled channel has
/// that ID.
pub fn find_service(id: &str) -> Result<ChannelService, NotificationError> {
    enabled_services()?
        .into_iter()
        .find(|s| s.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| NotificationError::UnknownChannel { id: id.to_string() })
}

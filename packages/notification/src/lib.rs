#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Push notification channels for the dispatch core.
//!
//! Channels are configured via TOML files in `services/` and implement
//! [`NotificationChannel`]:
//!
//! - **FCM** ([`fcm::FcmChannel`]): Firebase Cloud Messaging HTTP v1.
//!   Requires `FCM_PROJECT_ID` and `FCM_ACCESS_TOKEN`.
//! - **Log** ([`log_channel::LogChannel`]): logs messages, delivers nothing.
//!
//! [`create_channel_from_env`] picks the channel named by
//! `NOTIFICATION_CHANNEL`, or FCM when its credentials are present, or
//! the log channel otherwise.

pub mod fcm;
pub mod log_channel;
pub mod service_registry;

use std::sync::Arc;
use std::time::Duration;

use emergency_dispatch::NotificationChannel;
use thiserror::Error;

use crate::service_registry::{ChannelService, ProviderConfig};

/// Errors from building a notification channel.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// An embedded service TOML failed to parse.
    #[error("Failed to parse notification service '{name}': {source}")]
    Registry {
        /// The service file.
        name: String,
        /// The parse error.
        #[source]
        source: toml::de::Error,
    },

    /// No enabled channel has the requested ID.
    #[error("Unknown notification channel: {id}")]
    UnknownChannel {
        /// The requested ID.
        id: String,
    },

    /// A required credential is not set.
    #[error("Missing credential: {var}")]
    MissingCredential {
        /// The environment variable that should hold it.
        var: &'static str,
    },

    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// FCM credentials read from the environment.
#[derive(Debug, Clone)]
pub struct FcmCredentials {
    /// Firebase project ID (`FCM_PROJECT_ID`).
    pub project_id: String,
    /// OAuth2 access token (`FCM_ACCESS_TOKEN`).
    pub access_token: String,
}

/// Reads FCM credentials from environment variables.
///
/// Returns `Some` only when **both** `FCM_PROJECT_ID` and
/// `FCM_ACCESS_TOKEN` are set and non-empty.
#[must_use]
pub fn fcm_credentials_from_env() -> Option<FcmCredentials> {
    let project_id = std::env::var("FCM_PROJECT_ID").ok()?;
    let access_token = std::env::var("FCM_ACCESS_TOKEN").ok()?;
    if project_id.trim().is_empty() || access_token.trim().is_empty() {
        return None;
    }
    Some(FcmCredentials {
        project_id,
        access_token,
    })
}

/// Builds the channel described by `service`.
///
/// # Errors
///
/// Returns [`NotificationError::MissingCredential`] if an FCM channel is
/// requested without `credentials`, or [`NotificationError::Client`] if
/// its HTTP client cannot be built.
pub fn build_channel(
    service: &ChannelService,
    credentials: Option<&FcmCredentials>,
) -> Result<Arc<dyn NotificationChannel>, NotificationError> {
    match &service.provider {
        ProviderConfig::Fcm {
            base_url,
            concurrent_requests,
            request_timeout_ms,
        } => {
            let credentials = credentials.ok_or(NotificationError::MissingCredential {
                var: "FCM_PROJECT_ID",
            })?;
            Ok(Arc::new(fcm::FcmChannel::new(
                base_url,
                &credentials.project_id,
                &credentials.access_token,
                *concurrent_requests,
                Duration::from_millis(*request_timeout_ms),
            )?))
        }
        ProviderConfig::Log => Ok(Arc::new(log_channel::LogChannel)),
    }
}

/// Selects the channel ID to use given an explicit choice and whether FCM
/// credentials are available.
#[must_use]
pub fn select_channel_id(requested: Option<&str>, has_fcm_credentials: bool) -> String {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => id.to_ascii_lowercase(),
        None if has_fcm_credentials => "fcm".to_string(),
        None => "log".to_string(),
    }
}

/// Builds the channel selected by the environment.
///
/// # Errors
///
/// Returns [`NotificationError`] if the selected channel is unknown or
/// cannot be built.
pub fn create_channel_from_env() -> Result<Arc<dyn NotificationChannel>, NotificationError> {
    let credentials = fcm_credentials_from_env();
    let requested = std::env::var("NOTIFICATION_CHANNEL").ok();
    let id = select_channel_id(requested.as_deref(), credentials.is_some());

    let service = service_registry::find_service(&id)?;
    log::info!("Using notification channel {} ({})", service.id, service.name);
    build_channel(&service, credentials.as_ref())
}

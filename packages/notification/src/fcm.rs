//! Firebase Cloud Messaging HTTP v1 channel.
//!
//! The v1 API accepts one token per request, so endpoints are sent
//! concurrently (bounded by `concurrent_requests` from the service TOML).
//! Failures are classified per endpoint and never retried here.
//!
//! See <https://firebase.google.com/docs/reference/fcm/rest/v1/projects.messages/send>

use std::time::Duration;

use emergency_dispatch::{ChannelError, NotificationChannel};
use emergency_dispatch_models::{EndpointOutcome, FailureCause, NotificationMessage};
use futures::stream::{self, BoxStream, StreamExt as _};
use reqwest::StatusCode;

use crate::NotificationError;

/// Sends push messages through the FCM HTTP v1 API.
#[derive(Debug, Clone)]
pub struct FcmChannel {
    client: reqwest::Client,
    send_url: String,
    access_token: String,
    concurrent_requests: usize,
}

impl FcmChannel {
    /// Creates a channel for `project_id` authenticated with an OAuth2
    /// `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::MissingCredential`] if the project ID or
    /// token is blank, or [`NotificationError::Client`] if the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        project_id: &str,
        access_token: &str,
        concurrent_requests: usize,
        request_timeout: Duration,
    ) -> Result<Self, NotificationError> {
        if project_id.trim().is_empty() {
            return Err(NotificationError::MissingCredential {
                var: "FCM_PROJECT_ID",
            });
        }
        if access_token.trim().is_empty() {
            return Err(NotificationError::MissingCredential {
                var: "FCM_ACCESS_TOKEN",
            });
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/v1/projects/{}/messages:send",
                base_url.trim_end_matches('/'),
                project_id.trim()
            ),
            access_token: access_token.trim().to_string(),
            concurrent_requests: concurrent_requests.max(1),
        })
    }

    /// The fully qualified `messages:send` URL.
    #[must_use]
    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    async fn send_one(&self, endpoint: &str, message: &NotificationMessage) -> EndpointOutcome {
        let result = self
            .client
            .post(&self.send_url)
            .bearer_auth(&self.access_token)
            .json(&build_payload(endpoint, message))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                return EndpointOutcome::failed(
                    endpoint,
                    FailureCause::Unreachable {
                        message: e.to_string(),
                    },
                );
            }
        };

        let status = response.status();
        if status.is_success() {
            return EndpointOutcome::delivered(endpoint);
        }

        let body = response.text().await.unwrap_or_default();
        EndpointOutcome::failed(endpoint, classify_failure(status, &body))
    }
}

impl NotificationChannel for FcmChannel {
    fn name(&self) -> &'static str {
        "fcm"
    }

    fn send<'a>(
        &'a self,
        endpoints: &'a [String],
        message: &'a NotificationMessage,
    ) -> BoxStream<'a, Result<EndpointOutcome, ChannelError>> {
        log::debug!(
            "Sending {} FCM message(s) (concurrency={})",
            endpoints.len(),
            self.concurrent_requests
        );

        stream::iter(endpoints)
            .map(move |endpoint| self.send_one(endpoint, message))
            .buffer_unordered(self.concurrent_requests)
            .inspect(|outcome| {
                if outcome.failure.is_none() {
                    log::debug!("FCM delivered to {}", outcome.endpoint);
                }
            })
            .map(Ok)
            .boxed()
    }
}

/// Builds the v1 request body for a single token.
#[must_use]
pub fn build_payload(endpoint: &str, message: &NotificationMessage) -> serde_json::Value {
    serde_json::json!({
        "message": {
            "token": endpoint,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
            "android": { "priority": "high" },
        }
    })
}

/// Maps a non-success FCM response to a [`FailureCause`].
///
/// Invalid or unregistered tokens (400/403/404) are `Rejected`; throttling
/// and server errors (429/5xx) are `Unreachable`; anything else, including
/// bad credentials, is a `Channel` failure.
#[must_use]
pub fn classify_failure(status: StatusCode, body: &str) -> FailureCause {
    let message = error_detail(body).map_or_else(
        || format!("HTTP {status}"),
        |detail| format!("HTTP {status}: {detail}"),
    );

    match status {
        StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            FailureCause::Rejected { message }
        }
        StatusCode::TOO_MANY_REQUESTS => FailureCause::Unreachable { message },
        s if s.is_server_error() => FailureCause::Unreachable { message },
        _ => FailureCause::Channel { message },
    }
}

/// Extracts `errorCode` (or `status`) and `message` from an FCM error body.
fn error_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;

    let code = error
        .get("details")
        .and_then(serde_json::Value::as_array)
        .and_then(|details| {
            details
                .iter()
                .find_map(|d| d.get("errorCode").and_then(serde_json::Value::as_str))
        })
        .or_else(|| error.get("status").and_then(serde_json::Value::as_str));
    let message = error.get("message").and_then(serde_json::Value::as_str);

    match (code, message) {
        (Some(code), Some(message)) => Some(format!("{code} ({message})")),
        (Some(code), None) => Some(code.to_string()),
        (None, Some(message)) => Some(message.to_string()),
        (None, None) => None,
    }
}

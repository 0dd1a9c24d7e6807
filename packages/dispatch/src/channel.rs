//! Notification delivery channel abstraction.

use emergency_dispatch_models::{EndpointOutcome, NotificationMessage};
use futures::stream::BoxStream;
use thiserror::Error;

/// Errors that make a channel fail as a whole rather than per endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The channel backend could not be reached.
    #[error("Channel unavailable: {message}")]
    Unavailable {
        /// Transport detail.
        message: String,
    },

    /// The channel is misconfigured (missing credentials, bad URL).
    #[error("Channel misconfigured: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// A push delivery channel.
///
/// `send` delivers one message to each endpoint and yields one
/// [`EndpointOutcome`] per endpoint as soon as that endpoint finishes, so a
/// caller that stops polling at a deadline keeps every outcome already
/// yielded. It must not retry synchronously; retries are the delivery
/// backend's responsibility.
pub trait NotificationChannel: Send + Sync {
    /// Short identifier used in logs (e.g. `"fcm"`).
    fn name(&self) -> &str;

    /// Sends `message` to every endpoint in `endpoints`.
    ///
    /// A yielded [`ChannelError`] means the channel failed as a whole;
    /// endpoints without an outcome by then are not retried.
    fn send<'a>(
        &'a self,
        endpoints: &'a [String],
        message: &'a NotificationMessage,
    ) -> BoxStream<'a, Result<EndpointOutcome, ChannelError>>;
}

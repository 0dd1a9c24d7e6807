//! A channel that only logs, for dry runs and local scenarios.

use emergency_dispatch::{ChannelError, NotificationChannel};
use emergency_dispatch_models::{EndpointOutcome, NotificationMessage};
use futures::stream::{self, BoxStream, StreamExt as _};

/// Logs each message at `info` and reports every endpoint as delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send<'a>(
        &'a self,
        endpoints: &'a [String],
        message: &'a NotificationMessage,
    ) -> BoxStream<'a, Result<EndpointOutcome, ChannelError>> {
        stream::iter(endpoints)
            .map(move |endpoint| {
                log::info!(
                    "[notify {endpoint}] {}: {} {:?}",
                    message.title,
                    message.body,
                    message.data
                );
                Ok(EndpointOutcome::delivered(endpoint.clone()))
            })
            .boxed()
    }
}

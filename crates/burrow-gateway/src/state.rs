use std::sync::Arc;
use std::time::Duration;

use burrow_core::{CallContext, Shortener};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        request_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            shortener,
            request_timeout,
            shutdown,
        }
    }

    pub fn shortener(&self) -> Arc<dyn Shortener> {
        self.shortener.clone()
    }

    /// Builds the context for one request: cancelled on server shutdown and
    /// bounded by the configured request timeout.
    pub fn request_context(&self) -> CallContext {
        CallContext::with_token(self.shutdown.child_token()).timeout(self.request_timeout)
    }
}

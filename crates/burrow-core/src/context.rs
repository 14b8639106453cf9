use crate::error::{Result, StorageError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline and cancellation scope for a single storage call.
///
/// Storage backends run every operation through [`CallContext::run`], so a
/// caller can bound the lifetime of a call with a deadline or abort it by
/// cancelling the token. Contexts are cheap to clone; clones share the
/// same token.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// A context with no deadline that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    /// A context that is cancelled together with `token`.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            deadline: None,
            cancel: token,
        }
    }

    /// Tightens the deadline to at most `timeout` from now.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(current) if current < candidate => current,
            _ => candidate,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs `fut` inside this context.
    ///
    /// Returns [`StorageError::Cancelled`] if the token fires first and
    /// [`StorageError::Timeout`] if the deadline passes first. Work is not
    /// started at all when the context is already done.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(StorageError::Cancelled);
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(StorageError::Cancelled),
                res = fut => res,
            }
        };

        match self.deadline {
            Some(deadline) => {
                if Instant::now() >= deadline {
                    return Err(StorageError::Timeout("deadline already passed".to_string()));
                }
                tokio::time::timeout_at(deadline, guarded)
                    .await
                    .map_err(|_| StorageError::Timeout("deadline exceeded".to_string()))?
            }
            None => guarded.await,
        }
    }
}

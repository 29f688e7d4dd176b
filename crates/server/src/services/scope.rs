//! Per-request deadline and cancellation.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::ServiceError;

/// Deadline and cancellation signal supplied by the caller of an operation.
///
/// Operations run their whole transaction inside [`RequestScope::run`]. When
/// the deadline passes or the token is cancelled, the future is dropped,
/// which drops the open transaction and rolls it back.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl RequestScope {
    /// A scope with no deadline and a fresh cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels every operation run in this scope.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drive `operation` to completion unless the scope expires first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Cancelled`] if the token fires (or already
    /// fired), [`ServiceError::Timeout`] if the deadline passes, and
    /// otherwise whatever `operation` returns.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, operation)
                    .await
                    .unwrap_or(Err(ServiceError::Timeout)),
                None => operation.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ServiceError::Cancelled),
            result = bounded => result,
        }
    }
}

//! Per-request execution context: an absolute deadline plus a cancellation
//! token.
//!
//! Every store call made by a service goes through [`ExecContext::run`]. When
//! the deadline passes or the token is cancelled first, the in-flight future
//! is dropped (sqlx rolls back any open transaction when its connection is
//! returned) and the caller gets [`DeadlineExceeded`]. There is never a
//! partial result.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The context was cancelled or its deadline passed before the work finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

#[derive(Debug, Clone)]
pub struct ExecContext {
    deadline: Instant,
    cancel: CancellationToken,
}

impl ExecContext {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline,
            cancel: CancellationToken::new(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Token shared with every clone of this context.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Drive `fut` to completion unless the context ends first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, DeadlineExceeded>
    where
        F: Future<Output = T>,
    {
        // Biased so an already-finished context never polls `fut`.
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DeadlineExceeded),
            _ = tokio::time::sleep_until(self.deadline) => Err(DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

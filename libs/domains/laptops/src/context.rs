//! Per-call cancellation and deadline.
//!
//! Long-running operations poll [`CallContext::check`] at loop boundaries.
//! Nothing is interrupted mid-store-call.

use std::time::{Duration, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::{LaptopError, LaptopResult};

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Context with no deadline that is only cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Deadline `timeout` from now; `None` means no deadline
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: timeout.and_then(|t| Instant::now().checked_add(t)),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `Canceled` wins over `DeadlineExceeded` when both hold.
    pub fn check(&self) -> LaptopResult<()> {
        if self.is_cancelled() {
            tracing::debug!("request is cancelled");
            return Err(LaptopError::Canceled);
        }
        if self.is_deadline_exceeded() {
            tracing::debug!("request deadline exceeded");
            return Err(LaptopError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Cancels this context when the guard is dropped
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}

//! Shared cancel-with-cause signal of one search call

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::error::{Result, SearchError};

/// Cancellation signal shared by every task of one search call
///
/// The first recorded failure wins; later failures and cancellation echoes
/// from tasks that merely observed the signal are dropped. Every remote call
/// site checks [`SearchScope::ensure_active`] before issuing a request, while
/// requests already in flight run to completion.
#[derive(Debug, Clone, Default)]
pub struct SearchScope {
    token: CancellationToken,
    cause: Arc<OnceLock<SearchError>>,
}

impl SearchScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` as the cause, if none is recorded yet, and cancel
    ///
    /// Returns `true` when this call recorded the cause.
    pub fn fail(&self, error: SearchError) -> bool {
        if error.is_cancelled() {
            self.token.cancel();
            return false;
        }

        // cause is set before the token fires so observers always find it
        let recorded = self.cause.set(error).is_ok();
        if recorded {
            if let Some(cause) = self.cause.get() {
                tracing::warn!(cause = %cause, "Search cancelled");
            }
        }
        self.token.cancel();
        recorded
    }

    /// `Err(Cancelled)` once the scope has been cancelled
    pub fn ensure_active(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        Ok(())
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cause(&self) -> Option<SearchError> {
        self.cause.get().cloned()
    }

    /// The error a search call surfaces: the recorded cause, else `error`
    pub fn resolve(&self, error: SearchError) -> SearchError {
        self.cause().unwrap_or(error)
    }

    /// Token for callers that want to abort a whole search from outside
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

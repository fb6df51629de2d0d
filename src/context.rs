// ABOUTME: Cancellation and deadline scope threaded through every blocking call.
// ABOUTME: Pairs a CancellationToken with an optional deadline that can only tighten.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a scoped operation stopped before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    #[error("operation cancelled by caller")]
    Cancelled,

    #[error("operation deadline exceeded (timeout)")]
    DeadlineExceeded,
}

/// Scope for one deployment or rollback call.
///
/// Cloning shares the same token. Derived scopes from [`DeployContext::with_timeout`]
/// keep the caller's token and never extend the caller's deadline.
#[derive(Debug, Clone, Default)]
pub struct DeployContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl DeployContext {
    /// A scope with no deadline and a fresh token.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope driven by an externally owned token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a scope whose deadline is at most `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel this scope and every clone of it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check the scope without awaiting anything.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Interrupted::DeadlineExceeded);
        }
        Ok(())
    }

    /// Race `fut` against cancellation and the deadline.
    ///
    /// The future is dropped as soon as either fires. Cancellation wins ties.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        self.check()?;

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Cancelled),
            _ = expiry => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

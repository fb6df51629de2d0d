// ABOUTME: Fixed-interval ticker bounded by a DeployContext.
// ABOUTME: Shared by health reconciliation and termination waits.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

use crate::context::{DeployContext, Interrupted};

/// Smallest interval accepted; `tokio::time::interval` panics on zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Yields ticks until the scope is cancelled or its deadline passes.
///
/// The first tick fires immediately.
pub struct Poller<'a> {
    ctx: &'a DeployContext,
    ticker: Interval,
    attempts: u32,
}

impl<'a> Poller<'a> {
    pub fn new(ctx: &'a DeployContext, interval: Duration) -> Self {
        let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ctx,
            ticker,
            attempts: 0,
        }
    }

    /// Wait for the next tick and return its 1-based attempt number.
    pub async fn tick(&mut self) -> Result<u32, Interrupted> {
        let expiry = async {
            match self.ctx.deadline() {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.ctx.token().cancelled() => return Err(Interrupted::Cancelled),
            _ = expiry => return Err(Interrupted::DeadlineExceeded),
            _ = self.ticker.tick() => {}
        }

        self.attempts += 1;
        Ok(self.attempts)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

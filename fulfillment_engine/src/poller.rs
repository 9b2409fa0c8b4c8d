use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::*;
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};

use crate::{
    errors::{MarketplaceError, PollerError},
    orchestrator::{FulfillmentOrchestrator, FulfillmentOutcome},
    traits::{DocumentPrinter, MarketplaceApi},
};

/// Consecutive authentication failures tolerated before polling halts.
pub const MAX_CONSECUTIVE_AUTH_FAILURES: u32 = 2;

/// How far back each poll looks for orders. Orders the vendor already shows
/// as shipped never come back regardless of the window.
const ORDER_LOOKBACK_DAYS: i64 = 7;

/// The fixed-interval polling loop.
///
/// Each tick lists fulfillable orders and runs them through the orchestrator
/// one at a time. A failed poll is logged and retried on the next tick;
/// repeated auth failures are fatal, since credentials will not fix
/// themselves. Shutdown is observed between ticks and between orders, never
/// mid-order: an in-flight label purchase is always allowed to finish.
pub struct OrderPoller<B: MarketplaceApi, P: DocumentPrinter> {
    marketplace: Arc<B>,
    orchestrator: FulfillmentOrchestrator<B, P>,
    poll_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<B: MarketplaceApi, P: DocumentPrinter> OrderPoller<B, P> {
    pub fn new(
        marketplace: Arc<B>,
        orchestrator: FulfillmentOrchestrator<B, P>,
        poll_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self { marketplace, orchestrator, poll_interval, shutdown }
    }

    /// Run until shutdown is signalled or polling becomes futile.
    pub async fn run(&mut self) -> Result<(), PollerError> {
        let mut timer = interval(self.poll_interval);
        // A pass slower than the interval must not cause a burst of
        // catch-up ticks afterwards
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut auth_failures = 0u32;
        info!("📦 Order poller started. Interval: {}s", self.poll_interval.as_secs());
        loop {
            tokio::select! {
                _ = timer.tick() => {},
                _ = self.shutdown.changed() => {
                    info!("📦 Shutdown requested. Poller stopping.");
                    return Ok(());
                },
            }
            match self.run_once().await {
                Ok(_) => auth_failures = 0,
                Err(e) if e.is_auth() => {
                    auth_failures += 1;
                    error!("📦 Authentication failed while polling ({auth_failures}/{MAX_CONSECUTIVE_AUTH_FAILURES}): {e}");
                    if auth_failures >= MAX_CONSECUTIVE_AUTH_FAILURES {
                        return Err(PollerError::AuthHalt(auth_failures));
                    }
                },
                Err(e) => {
                    auth_failures = 0;
                    error!("📦 Poll failed, retrying on the next tick: {e}");
                },
            }
            if *self.shutdown.borrow() {
                info!("📦 Shutdown requested. Poller stopping.");
                return Ok(());
            }
        }
    }

    /// One complete pass: list fulfillable orders and process each to
    /// completion or failure. Per-order failures are captured in the
    /// outcomes; only the listing itself can fail the pass.
    pub async fn run_once(&self) -> Result<Vec<FulfillmentOutcome>, MarketplaceError> {
        let since = Utc::now() - chrono::Duration::days(ORDER_LOOKBACK_DAYS);
        let orders = self.marketplace.list_fulfillable_orders(since).await?;
        if orders.is_empty() {
            info!("📦 No orders need fulfillment");
            return Ok(Vec::new());
        }
        info!("📦 {} orders need fulfillment", orders.len());
        let mut outcomes = Vec::with_capacity(orders.len());
        for order in &orders {
            if *self.shutdown.borrow() {
                info!("📦 Shutdown requested. {} orders left for the next run.", orders.len() - outcomes.len());
                break;
            }
            outcomes.push(self.orchestrator.process_order(order).await);
        }
        let done = outcomes.iter().filter(|o| o.is_done()).count();
        info!("📦 Pass complete: {done} fulfilled, {} failed", outcomes.len() - done);
        Ok(outcomes)
    }
}

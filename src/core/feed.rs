//! Periodic rate refresh feeding a shared [`RateTable`]

use super::currency::{CurrencyCode, RateProvider};
use super::snapshot::RateSnapshot;
use super::table::RateTable;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

pub type SharedRateTable = Arc<RwLock<RateTable>>;

pub fn shared_table() -> SharedRateTable {
    Arc::new(RwLock::new(RateTable::new()))
}

/// Outcome of the latest refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Pending,
    Updated(DateTime<Utc>),
    Failed(String),
}

/// Fetches rates once and stores them in `table`.
///
/// On error the table is left as it was.
#[instrument(name = "RateRefresh", skip_all, fields(base = %base))]
pub async fn refresh_once(
    provider: &dyn RateProvider,
    base: &CurrencyCode,
    codes: &[CurrencyCode],
    table: &SharedRateTable,
) -> Result<Arc<RateSnapshot>> {
    let wanted: Vec<CurrencyCode> = codes.iter().filter(|c| *c != base).cloned().collect();
    let rates = provider
        .fetch_rates(base, &wanted)
        .await
        .with_context(|| format!("Failed to fetch rates for base {base}"))?;

    let snapshot = RateSnapshot::new(base.clone(), rates);
    if snapshot.is_empty() {
        bail!("Rate source returned no rates for base {}", base);
    }
    debug!(currencies = snapshot.len(), "Fetched rate snapshot");

    let mut table = table.write().await;
    table.update(snapshot);
    table
        .current()
        .context("Rate table has no current snapshot after update")
}

/// Background task refreshing a [`RateTable`] on a fixed interval.
///
/// The first fetch happens immediately. A cycle never starts before the
/// previous one finished. Dropping the feed aborts the task; prefer
/// [`RateFeed::shutdown`] for an orderly stop.
pub struct RateFeed {
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    events: watch::Receiver<FeedEvent>,
}

impl RateFeed {
    pub fn spawn(
        provider: Arc<dyn RateProvider>,
        base: CurrencyCode,
        codes: Vec<CurrencyCode>,
        period: Duration,
        table: SharedRateTable,
    ) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let (events_tx, events_rx) = watch::channel(FeedEvent::Pending);

        info!(base = %base, ?period, "Starting rate feed");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!("Rate feed stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let event = match refresh_once(provider.as_ref(), &base, &codes, &table).await {
                            Ok(snapshot) => FeedEvent::Updated(snapshot.timestamp()),
                            Err(e) => {
                                let message = format!("{e:#}");
                                error!(error = %message, "Rate refresh failed");
                                FeedEvent::Failed(message)
                            }
                        };
                        events_tx.send_replace(event);
                    }
                }
            }
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
            events: events_rx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedEvent> {
        self.events.clone()
    }

    /// Stops the task and waits for it. An in-flight fetch is allowed to settle.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Rate feed task ended abnormally");
            }
        }
        info!("Rate feed stopped");
    }
}

impl Drop for RateFeed {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

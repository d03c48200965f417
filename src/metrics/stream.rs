//! Metrics Streamer
//!
//! One background task per subscriber snapshots the registry on a ticker and
//! pushes [`MetricsUpdate`]s into a bounded channel. Tasks stop when the
//! subscriber cancels or drops its [`MetricsSubscription`], or when the
//! streamer is shut down.

use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{HealthThresholds, MetricsUpdate};
use crate::registry::Registry;

/// Default tick period of a subscription.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of updates buffered per subscriber.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Periodic health snapshots for any number of subscribers.
pub struct MetricsStreamer {
    registry: Arc<Registry>,
    thresholds: HealthThresholds,
    default_interval: Duration,
    channel_capacity: usize,
    /// Parent of every subscription token; cancelled on shutdown
    root: CancellationToken,
    active: Arc<AtomicUsize>,
}

impl MetricsStreamer {
    pub fn new(registry: Arc<Registry>, thresholds: HealthThresholds) -> Self {
        Self {
            registry,
            thresholds,
            default_interval: DEFAULT_UPDATE_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            root: CancellationToken::new(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.default_interval = interval;
        }
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    pub fn default_interval(&self) -> Duration {
        self.default_interval
    }

    /// Build a single update from the current registry state.
    pub fn snapshot(&self, include_backends: bool) -> MetricsUpdate {
        MetricsUpdate::from_backends(&self.registry.list(), &self.thresholds, include_backends)
    }

    /// Start a subscription. A zero `interval` uses the default interval.
    ///
    /// The first update is delivered immediately. Must be called from within
    /// a tokio runtime.
    pub fn subscribe(&self, interval: Duration, include_backends: bool) -> MetricsSubscription {
        let period = if interval.is_zero() {
            self.default_interval
        } else {
            interval
        };
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let cancel = self.root.child_token();

        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(Arc::clone(&self.active));
        let registry = Arc::clone(&self.registry);
        let thresholds = self.thresholds;
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let _guard = guard;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::debug!(
                interval_ms = period.as_millis() as u64,
                include_backends,
                "Metrics subscription started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => break,
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {
                        let update = MetricsUpdate::from_backends(
                            &registry.list(),
                            &thresholds,
                            include_backends,
                        );
                        tracing::debug!(status = %update.status, "Metrics tick");
                        tokio::select! {
                            biased;
                            _ = task_cancel.cancelled() => break,
                            sent = tx.send(update) => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }

            tracing::debug!("Metrics subscription stopped");
        });

        MetricsSubscription { rx, cancel }
    }

    /// Number of subscription tasks still running.
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// End every subscription; later subscriptions end immediately.
    pub fn shutdown(&self) {
        if !self.root.is_cancelled() {
            tracing::info!(
                active = self.active_subscriptions(),
                "Shutting down metrics streams"
            );
        }
        self.root.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl Drop for MetricsStreamer {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Receiving side of a metrics subscription.
///
/// Yields updates until cancelled. Dropping it cancels the producing task.
pub struct MetricsSubscription {
    rx: mpsc::Receiver<MetricsUpdate>,
    cancel: CancellationToken,
}

impl MetricsSubscription {
    /// Stop the subscription; the stream ends without further updates.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Stream for MetricsSubscription {
    type Item = MetricsUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl Drop for MetricsSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

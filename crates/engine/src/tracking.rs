//! Live location polling for the selected trip.
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use api_types::ItemId;
use api_types::trip::DriverLocation;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::ServiceError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Where driver positions come from.
pub trait LocationSource: Send + Sync + 'static {
    fn location(
        &self,
        trip_id: ItemId,
    ) -> impl Future<Output = Result<DriverLocation, ServiceError>> + Send;
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocationUpdate {
    pub trip_id: ItemId,
    pub result: Result<DriverLocation, ServiceError>,
}

/// Polls one trip at a time; selecting another trip restarts the timer.
pub struct LocationPoller<S: LocationSource> {
    source: Arc<S>,
    interval: Duration,
    updates: UnboundedSender<LocationUpdate>,
    selected: Option<ItemId>,
    task: Option<JoinHandle<()>>,
}

impl<S: LocationSource> LocationPoller<S> {
    pub fn new(source: Arc<S>, interval: Duration, updates: UnboundedSender<LocationUpdate>) -> Self {
        Self {
            source,
            interval,
            updates,
            selected: None,
            task: None,
        }
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `trip_id`: one fetch right away, then one per interval.
    /// Selecting the trip already polled keeps the running timer.
    pub fn select(&mut self, trip_id: ItemId) {
        if self.selected == Some(trip_id) && self.task.is_some() {
            return;
        }
        self.stop();
        info!(trip_id, interval_ms = self.interval.as_millis() as u64, "tracking trip");
        self.selected = Some(trip_id);

        let source = Arc::clone(&self.source);
        let updates = self.updates.clone();
        let period = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let result = source.location(trip_id).await;
                if updates.send(LocationUpdate { trip_id, result }).is_err() {
                    debug!(trip_id, "location receiver gone, polling stops");
                    break;
                }
            }
        }));
    }

    /// Stop polling and forget the selection.
    pub fn clear(&mut self) {
        if self.selected.is_some() {
            info!(trip_id = self.selected, "tracking stopped");
        }
        self.stop();
        self.selected = None;
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<S: LocationSource> Drop for LocationPoller<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

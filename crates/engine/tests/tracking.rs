use std::sync::Arc;
use std::time::Duration;

use api_types::ItemId;
use api_types::trip::DriverLocation;
use engine::{DEFAULT_POLL_INTERVAL, LocationPoller, LocationSource, ServiceError};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

struct FixedSource;

impl LocationSource for FixedSource {
    async fn location(&self, trip_id: ItemId) -> Result<DriverLocation, ServiceError> {
        Ok(DriverLocation {
            lat: -6.8,
            lng: 39.28 + trip_id as f64 / 1000.0,
            bearing: None,
            updated_at: None,
        })
    }
}

fn poller() -> (
    LocationPoller<FixedSource>,
    mpsc::UnboundedReceiver<engine::LocationUpdate>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        LocationPoller::new(Arc::new(FixedSource), DEFAULT_POLL_INTERVAL, tx),
        rx,
    )
}

#[tokio::test(start_paused = true)]
async fn polls_every_five_seconds() {
    let (mut poller, mut rx) = poller();
    let start = Instant::now();
    poller.select(7);

    for tick in 0..3_u64 {
        let update = rx.recv().await.unwrap();
        assert_eq!(update.trip_id, 7);
        assert!(update.result.is_ok());
        assert_eq!(start.elapsed(), Duration::from_millis(5000 * tick));
    }
}

#[tokio::test(start_paused = true)]
async fn switching_trip_fetches_immediately_and_resets_timer() {
    let (mut poller, mut rx) = poller();
    let start = Instant::now();
    poller.select(7);
    assert_eq!(rx.recv().await.unwrap().trip_id, 7);

    time::advance(Duration::from_secs(2)).await;
    poller.select(9);
    assert_eq!(poller.selected(), Some(9));

    let update = rx.recv().await.unwrap();
    assert_eq!(update.trip_id, 9);
    assert_eq!(start.elapsed(), Duration::from_secs(2));

    let update = rx.recv().await.unwrap();
    assert_eq!(update.trip_id, 9);
    assert_eq!(start.elapsed(), Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn reselecting_same_trip_keeps_timer() {
    let (mut poller, mut rx) = poller();
    let start = Instant::now();
    poller.select(7);
    rx.recv().await.unwrap();

    time::advance(Duration::from_secs(1)).await;
    poller.select(7);
    rx.recv().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn clear_stops_polling() {
    let (mut poller, mut rx) = poller();
    poller.select(7);
    rx.recv().await.unwrap();

    poller.clear();
    assert_eq!(poller.selected(), None);
    time::sleep(Duration::from_secs(30)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_poller_ends_the_stream() {
    let (mut poller, mut rx) = poller();
    poller.select(7);
    rx.recv().await.unwrap();

    drop(poller);
    assert!(rx.recv().await.is_none());
}

use api_types::ItemId;
use api_types::trip::{DriverLocation, StopStatus, Trip};
use engine::LocationUpdate;
use engine::geo::{self, LatLng};
use tracing::debug;

/// Trips on the road and the last known position of the selected one.
#[derive(Debug, Default)]
pub struct TrackingState {
    pub trips: Vec<Trip>,
    pub selected: usize,
    pub location: Option<DriverLocation>,
    pub location_error: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TrackingState {
    pub fn selected_trip(&self) -> Option<&Trip> {
        self.trips.get(self.selected)
    }

    pub fn selected_id(&self) -> Option<ItemId> {
        self.selected_trip().map(|trip| trip.id)
    }

    pub fn set_trips(&mut self, trips: Vec<Trip>) {
        let previous = self.selected_id();
        self.trips = trips;
        self.selected = previous
            .and_then(|id| self.trips.iter().position(|trip| trip.id == id))
            .unwrap_or(0);
        if self.selected_id() != previous {
            self.location = None;
            self.location_error = None;
        }
    }

    pub fn select_next(&mut self) -> Option<ItemId> {
        let before = self.selected_id();
        if !self.trips.is_empty() {
            self.selected = (self.selected + 1).min(self.trips.len() - 1);
        }
        self.moved_from(before)
    }

    pub fn select_prev(&mut self) -> Option<ItemId> {
        let before = self.selected_id();
        self.selected = self.selected.saturating_sub(1);
        self.moved_from(before)
    }

    fn moved_from(&mut self, before: Option<ItemId>) -> Option<ItemId> {
        let id = self.selected_id();
        if id != before {
            self.location = None;
            self.location_error = None;
        }
        id
    }

    /// Record a poll result. Results for a trip no longer selected are dropped.
    pub fn apply(&mut self, update: LocationUpdate) {
        if Some(update.trip_id) != self.selected_id() {
            debug!(trip_id = update.trip_id, "location for unselected trip dropped");
            return;
        }
        match update.result {
            Ok(location) => {
                self.location = Some(location);
                self.location_error = None;
            }
            Err(err) => self.location_error = Some(err.to_string()),
        }
    }

    /// Straight-line distance from the driver to the next pending stop.
    pub fn next_stop_km(&self) -> Option<f64> {
        let location = self.location.as_ref()?;
        let stop = self
            .selected_trip()?
            .locations
            .iter()
            .find(|stop| stop.status == StopStatus::Pending)?;
        Some(geo::haversine_km(
            LatLng::new(location.lat, location.lng),
            LatLng::new(stop.lat, stop.lng),
        ))
    }

    /// Straight-line length of the planned route, start point first.
    pub fn planned_km(&self) -> Option<f64> {
        let trip = self.selected_trip()?;
        let start = trip.start_lat.zip(trip.start_lng).map(|(lat, lng)| LatLng::new(lat, lng));
        let points: Vec<LatLng> = start
            .into_iter()
            .chain(trip.locations.iter().map(|stop| LatLng::new(stop.lat, stop.lng)))
            .collect();
        (points.len() > 1).then(|| geo::route_km(&points))
    }
}

#[cfg(test)]
mod tests {
    use api_types::trip::{TripStatus, TripStop};
    use engine::{FailureStatus, ServiceError};

    use super::*;

    fn stop(lat: f64, lng: f64, status: StopStatus) -> TripStop {
        TripStop {
            id: None,
            address: None,
            lat,
            lng,
            status,
        }
    }

    fn trip(id: ItemId, locations: Vec<TripStop>) -> Trip {
        Trip {
            id,
            name: None,
            status: TripStatus::InProgress,
            optimized: false,
            driver: None,
            vehicle: None,
            start_address: None,
            start_lat: Some(0.0),
            start_lng: Some(0.0),
            scheduled_at: None,
            started_at: None,
            locations,
        }
    }

    fn at(lat: f64, lng: f64) -> DriverLocation {
        DriverLocation {
            lat,
            lng,
            bearing: None,
            updated_at: None,
        }
    }

    #[test]
    fn updates_for_other_trips_are_dropped() {
        let mut tracking = TrackingState::default();
        tracking.set_trips(vec![trip(1, Vec::new()), trip(2, Vec::new())]);

        tracking.apply(LocationUpdate {
            trip_id: 2,
            result: Ok(at(1.0, 1.0)),
        });
        assert!(tracking.location.is_none());

        tracking.apply(LocationUpdate {
            trip_id: 1,
            result: Ok(at(1.0, 1.0)),
        });
        assert_eq!(tracking.location, Some(at(1.0, 1.0)));

        tracking.apply(LocationUpdate {
            trip_id: 1,
            result: Err(ServiceError::RequestFailed {
                status: FailureStatus::Http(404),
                message: "Trip not found".to_string(),
            }),
        });
        assert_eq!(tracking.location_error.as_deref(), Some("Trip not found"));
        assert!(tracking.location.is_some());
    }

    #[test]
    fn moving_the_selection_forgets_the_position() {
        let mut tracking = TrackingState::default();
        tracking.set_trips(vec![trip(1, Vec::new()), trip(2, Vec::new())]);
        tracking.location = Some(at(1.0, 1.0));

        assert_eq!(tracking.select_prev(), Some(1));
        assert!(tracking.location.is_some());
        assert_eq!(tracking.select_next(), Some(2));
        assert!(tracking.location.is_none());
        assert_eq!(tracking.select_next(), Some(2));
    }

    #[test]
    fn reload_keeps_the_selected_trip() {
        let mut tracking = TrackingState::default();
        tracking.set_trips(vec![trip(1, Vec::new()), trip(2, Vec::new())]);
        tracking.select_next();
        tracking.set_trips(vec![trip(5, Vec::new()), trip(2, Vec::new()), trip(1, Vec::new())]);
        assert_eq!(tracking.selected_id(), Some(2));
        assert_eq!(tracking.selected, 1);
    }

    #[test]
    fn distances_use_pending_stops() {
        let mut tracking = TrackingState::default();
        tracking.set_trips(vec![trip(
            1,
            vec![
                stop(0.0, 1.0, StopStatus::Arrived),
                stop(0.0, 2.0, StopStatus::Pending),
            ],
        )]);
        assert_eq!(tracking.next_stop_km(), None);

        tracking.location = Some(at(0.0, 1.0));
        let next = tracking.next_stop_km().unwrap();
        assert!((next - 111.19).abs() < 0.01, "got {next}");

        let planned = tracking.planned_km().unwrap();
        assert!((planned - 222.39).abs() < 0.02, "got {planned}");
    }
}

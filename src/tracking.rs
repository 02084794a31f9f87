//! Trip tracking: positions recorded while driving a route.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::advisor::{AdvisoryRequest, NextTrafficLight, SpeedAdvisor};
use crate::error::{SourceError, TrackingError};
use crate::traits::{PhaseDataSource, RouteSource, TripStore};

/// A GPS fix as reported by the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPosition {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub alt: Option<f64>,
    #[serde(default)]
    pub alt_accuracy: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    /// Speed in m/s.
    #[serde(default)]
    pub speed: Option<f64>,
    pub measurement_time: DateTime<Utc>,
}

impl TrackedPosition {
    pub fn new(lat: f64, lng: f64, measurement_time: DateTime<Utc>) -> Self {
        Self {
            lat,
            lng,
            accuracy: None,
            alt: None,
            alt_accuracy: None,
            heading: None,
            speed: None,
            measurement_time,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedTrip {
    pub id: u64,
    /// Incremented with every accepted position batch.
    pub version: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub route_name: String,
    /// Ordered by measurement time.
    pub locations: Vec<TrackedPosition>,
}

#[derive(Debug, Default)]
struct TripState {
    last_id: u64,
    trips: HashMap<u64, TrackedTrip>,
}

/// Trip store backed by memory; routes are checked against `routes`.
#[derive(Debug)]
pub struct InMemoryTripStore<R> {
    routes: R,
    state: Mutex<TripState>,
}

impl<R: RouteSource> InMemoryTripStore<R> {
    pub fn new(routes: R) -> Self {
        Self {
            routes,
            state: Mutex::new(TripState::default()),
        }
    }

    fn with_trip<T>(
        &self,
        trip_id: u64,
        f: impl FnOnce(&mut TrackedTrip) -> Result<T, TrackingError>,
    ) -> Result<T, TrackingError> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let trip = state
            .trips
            .get_mut(&trip_id)
            .ok_or(SourceError::TripNotFound(trip_id))?;
        f(trip)
    }
}

impl<R: RouteSource> TripStore for InMemoryTripStore<R> {
    fn start_trip(&self, start_time: DateTime<Utc>, route_name: &str) -> Result<u64, TrackingError> {
        let route = self.routes.route(route_name)?;

        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.last_id += 1;
        let id = state.last_id;
        state.trips.insert(
            id,
            TrackedTrip {
                id,
                version: 0,
                start_time,
                end_time: None,
                route_name: route.name().to_string(),
                locations: Vec::new(),
            },
        );

        info!(trip = id, route = route_name, "trip started");
        Ok(id)
    }

    fn track(&self, trip_id: u64, positions: &[TrackedPosition]) -> Result<TrackedTrip, TrackingError> {
        if positions.is_empty() {
            return Err(TrackingError::EmptyBatch);
        }

        self.with_trip(trip_id, |trip| {
            if trip.end_time.is_some() {
                return Err(TrackingError::TripEnded(trip_id));
            }

            let mut times: HashSet<DateTime<Utc>> =
                trip.locations.iter().map(|l| l.measurement_time).collect();
            for position in positions {
                if !times.insert(position.measurement_time) {
                    return Err(TrackingError::DuplicateMeasurement {
                        trip_id,
                        time: position.measurement_time,
                    });
                }
            }

            trip.locations.extend_from_slice(positions);
            trip.locations.sort_by_key(|l| l.measurement_time);
            trip.version += 1;
            Ok(trip.clone())
        })
    }

    fn end_trip(&self, trip_id: u64, end_time: DateTime<Utc>) -> Result<TrackedTrip, TrackingError> {
        self.with_trip(trip_id, |trip| {
            trip.end_time = Some(end_time);
            info!(trip = trip_id, locations = trip.locations.len(), "trip ended");
            Ok(trip.clone())
        })
    }

    fn trip(&self, trip_id: u64) -> Result<TrackedTrip, TrackingError> {
        self.with_trip(trip_id, |trip| Ok(trip.clone()))
    }

    fn trips(&self, limit: Option<usize>) -> Vec<TrackedTrip> {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut trips: Vec<TrackedTrip> = state.trips.values().cloned().collect();
        trips.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            trips.truncate(limit);
        }
        trips
    }
}

/// Record a batch of positions, then advise from the last one.
///
/// The batch's last position supplies location and current speed; the
/// trip supplies the route.
pub fn track_and_advise<S, R, P>(
    store: &S,
    advisor: &SpeedAdvisor<R, P>,
    trip_id: u64,
    positions: &[TrackedPosition],
    reached_idx_hint: usize,
    now: DateTime<Utc>,
) -> Result<NextTrafficLight, TrackingError>
where
    S: TripStore + ?Sized,
    R: RouteSource,
    P: PhaseDataSource,
{
    let last = positions.last().ok_or(TrackingError::EmptyBatch)?;
    let trip = store.track(trip_id, positions)?;

    let request = AdvisoryRequest {
        route_name: trip.route_name,
        lat: last.lat,
        lon: last.lng,
        reached_idx_hint,
        current_speed_ms: last.speed,
    };
    Ok(advisor.advise(&request, now)?)
}

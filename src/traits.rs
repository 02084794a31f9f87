//! Seams to the external collaborators of the advisory core.
//!
//! Persistence and transport live behind these traits. Concrete apps
//! implement them for their own storage and services.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{SourceError, TrackingError};
use crate::phase::PhaseObservation;
use crate::route::RouteSnapshot;
use crate::route_builder::TrafficLightSite;
use crate::tracking::{TrackedPosition, TrackedTrip};

/// Provides routes by name.
pub trait RouteSource {
    fn route(&self, name: &str) -> Result<Arc<RouteSnapshot>, SourceError>;

    fn route_names(&self) -> Vec<String>;
}

/// Provides real-time and predicted traffic-light phases.
pub trait PhaseDataSource {
    /// Most recent observations of a data stream, in no particular order.
    fn observations(&self, datastream_id: &str) -> Result<Vec<PhaseObservation>, SourceError>;

    /// Forecast continuation of `recent` for a traffic light.
    fn prediction(
        &self,
        light_id: &str,
        recent: &[PhaseObservation],
    ) -> Result<Vec<PhaseObservation>, SourceError>;
}

/// Resolves a traffic-light id to its position and data stream.
pub trait TrafficLightLocator {
    fn locate(&self, light_id: &str) -> Result<TrafficLightSite, SourceError>;
}

/// Stores trips and the positions tracked during them.
pub trait TripStore {
    fn start_trip(&self, start_time: DateTime<Utc>, route_name: &str) -> Result<u64, TrackingError>;

    /// Append a batch of positions; the whole batch is rejected on conflict.
    fn track(&self, trip_id: u64, positions: &[TrackedPosition]) -> Result<TrackedTrip, TrackingError>;

    fn end_trip(&self, trip_id: u64, end_time: DateTime<Utc>) -> Result<TrackedTrip, TrackingError>;

    fn trip(&self, trip_id: u64) -> Result<TrackedTrip, TrackingError>;

    /// Trips by start time, newest first.
    fn trips(&self, limit: Option<usize>) -> Vec<TrackedTrip>;
}

impl<T: RouteSource + ?Sized> RouteSource for &T {
    fn route(&self, name: &str) -> Result<Arc<RouteSnapshot>, SourceError> {
        (**self).route(name)
    }

    fn route_names(&self) -> Vec<String> {
        (**self).route_names()
    }
}

impl<T: RouteSource + ?Sized> RouteSource for Arc<T> {
    fn route(&self, name: &str) -> Result<Arc<RouteSnapshot>, SourceError> {
        (**self).route(name)
    }

    fn route_names(&self) -> Vec<String> {
        (**self).route_names()
    }
}

impl<T: PhaseDataSource + ?Sized> PhaseDataSource for &T {
    fn observations(&self, datastream_id: &str) -> Result<Vec<PhaseObservation>, SourceError> {
        (**self).observations(datastream_id)
    }

    fn prediction(
        &self,
        light_id: &str,
        recent: &[PhaseObservation],
    ) -> Result<Vec<PhaseObservation>, SourceError> {
        (**self).prediction(light_id, recent)
    }
}

impl<T: PhaseDataSource + ?Sized> PhaseDataSource for Arc<T> {
    fn observations(&self, datastream_id: &str) -> Result<Vec<PhaseObservation>, SourceError> {
        (**self).observations(datastream_id)
    }

    fn prediction(
        &self,
        light_id: &str,
        recent: &[PhaseObservation],
    ) -> Result<Vec<PhaseObservation>, SourceError> {
        (**self).prediction(light_id, recent)
    }
}

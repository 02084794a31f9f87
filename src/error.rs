//! Error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Invalid input to the route snapper.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapError {
    #[error("route needs at least two points to snap against, got {len}")]
    RouteTooShort { len: usize },
    #[error("scan hint {hint} leaves less than one segment in a route of {len} points")]
    HintOutOfRange { hint: usize, len: usize },
    #[error(
        "{context}: location ({lat}, {lon}) is {distance_m:.2} m from the route, threshold is {threshold_m} m"
    )]
    OutOfTolerance {
        context: String,
        lat: f64,
        lon: f64,
        distance_m: f64,
        threshold_m: f64,
    },
}

/// Failure of an external collaborator.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("route '{0}' not found")]
    RouteNotFound(String),
    #[error("trip {0} not found")]
    TripNotFound(u64),
    #[error("traffic light '{0}' not found")]
    TrafficLightNotFound(String),
    #[error("data unavailable: {0}")]
    Unavailable(String),
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("snapping failed")]
    Snap(#[from] SnapError),
    #[error("collaborator failed")]
    Source(#[from] SourceError),
}

#[derive(Error, Debug)]
pub enum RouteBuildError {
    #[error("recorded track contains no points")]
    EmptyTrack,
    #[error("traffic light could not be placed on the route")]
    Snap(#[from] SnapError),
    #[error("traffic light lookup failed")]
    Source(#[from] SourceError),
}

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("trip store lookup failed")]
    Source(#[from] SourceError),
    #[error("trip {trip_id} already has a position measured at {time}")]
    DuplicateMeasurement { trip_id: u64, time: DateTime<Utc> },
    #[error("trip {0} has already ended")]
    TripEnded(u64),
    #[error("position batch is empty")]
    EmptyBatch,
    #[error("advisory failed")]
    Advisory(#[from] AdvisoryError),
}

//! Route representations.
//!
//! [`PlannedRoute`] is the authoring/persistence shape: an ordered list of
//! points, some of them traffic lights. [`RouteSnapshot`] is the read-only
//! shape used while advising, with inter-point distances computed once.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::{Located, Point};

/// Identifies the traffic light at a route point and its real-time data stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrafficLightRef {
    pub id: String,
    pub datastream_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_light: Option<TrafficLightRef>,
}

impl RoutePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            position: Point::from_lat_lon(lat, lon),
            traffic_light: None,
        }
    }

    pub fn traffic_light(
        lat: f64,
        lon: f64,
        id: impl Into<String>,
        datastream_id: impl Into<String>,
    ) -> Self {
        Self {
            position: Point::from_lat_lon(lat, lon),
            traffic_light: Some(TrafficLightRef {
                id: id.into(),
                datastream_id: datastream_id.into(),
            }),
        }
    }
}

impl Located for RoutePoint {
    fn position(&self) -> &Point {
        &self.position
    }
}

/// A named route in direction of travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoute {
    pub name: String,
    pub points: Vec<RoutePoint>,
}

impl PlannedRoute {
    pub fn new(name: impl Into<String>, points: Vec<RoutePoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Traffic lights on the route with their point index, in route order.
    pub fn traffic_lights(&self) -> impl Iterator<Item = (usize, &TrafficLightRef)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.traffic_light.as_ref().map(|tl| (i, tl)))
    }
}

/// Immutable route used for live advisory.
///
/// `legs_m[i]` is the haversine distance from point `i` to point `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSnapshot {
    name: String,
    points: Vec<RoutePoint>,
    legs_m: Vec<f64>,
}

impl RouteSnapshot {
    pub fn new(route: PlannedRoute) -> Self {
        let legs_m = route
            .points
            .par_windows(2)
            .map(|pair| pair[0].position.haversine_distance(&pair[1].position))
            .collect();

        Self {
            name: route.name,
            points: route.points,
            legs_m,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn legs_m(&self) -> &[f64] {
        &self.legs_m
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First traffic light strictly after `reached_idx`.
    pub fn next_traffic_light(&self, reached_idx: usize) -> Option<(usize, &TrafficLightRef)> {
        self.points
            .iter()
            .enumerate()
            .skip(reached_idx + 1)
            .find_map(|(i, p)| p.traffic_light.as_ref().map(|tl| (i, tl)))
    }

    /// Back to the authoring shape, e.g. for persistence.
    pub fn to_planned(&self) -> PlannedRoute {
        PlannedRoute::new(self.name.clone(), self.points.clone())
    }
}

impl From<PlannedRoute> for RouteSnapshot {
    fn from(route: PlannedRoute) -> Self {
        RouteSnapshot::new(route)
    }
}

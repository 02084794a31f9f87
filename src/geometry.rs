//! Planar/geographic value types used by the route snapper.

use serde::{Deserialize, Serialize};

use crate::haversine::haversine_m;
use crate::projection;

/// A location carried in both Web-Mercator and WGS-84 coordinates.
///
/// Both representations are fixed at construction, so a point built from
/// projected coordinates compares equal to the same point built from its
/// geographic coordinates only up to floating-point round-trip error.
/// Only the geographic coordinates are persisted; the projected ones are
/// recomputed on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LatLon", into = "LatLon")]
pub struct Point {
    x: f64,
    y: f64,
    lat: f64,
    lon: f64,
}

impl Point {
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        let (x, y) = projection::project(lat, lon);
        Self { x, y, lat, lon }
    }

    pub fn from_mercator(x: f64, y: f64) -> Self {
        let (lat, lon) = projection::unproject(x, y);
        Self { x, y, lat, lon }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Euclidean distance in projection units.
    pub fn planar_distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Great-circle distance in meters.
    pub fn haversine_distance(&self, other: &Point) -> f64 {
        haversine_m((self.lat, self.lon), (other.lat, other.lon))
    }
}

#[derive(Serialize, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

impl From<LatLon> for Point {
    fn from(LatLon { lat, lon }: LatLon) -> Self {
        Point::from_lat_lon(lat, lon)
    }
}

impl From<Point> for LatLon {
    fn from(point: Point) -> Self {
        LatLon {
            lat: point.lat,
            lon: point.lon,
        }
    }
}

/// Anything that sits at a [`Point`] on a route.
pub trait Located {
    fn position(&self) -> &Point;
}

impl Located for Point {
    fn position(&self) -> &Point {
        self
    }
}

/// Distance metric for route lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean distance on projected coordinates.
    Planar,
    /// Great-circle distance on geographic coordinates, in meters.
    Haversine,
}

impl DistanceMetric {
    pub fn between(self, a: &Point, b: &Point) -> f64 {
        match self {
            DistanceMetric::Planar => a.planar_distance(b),
            DistanceMetric::Haversine => a.haversine_distance(b),
        }
    }
}

/// A directed segment between two consecutive route points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Nearest point on the segment to `p`, in planar geometry.
    ///
    /// Zero-length segments degrade to the start point.
    pub fn nearest_point(&self, p: &Point) -> Point {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return self.start;
        }

        let t = ((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len2;
        if t <= 0.0 {
            self.start
        } else if t >= 1.0 {
            self.end
        } else {
            Point::from_mercator(self.start.x + t * dx, self.start.y + t * dy)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestSegmentResult {
    pub segment: Segment,
    pub nearest: Point,
    /// Projection units from [`RouteSnapper::segment_distance`](crate::snapper::RouteSnapper::segment_distance),
    /// meters once returned inside a [`ReachedWaypoint`].
    pub distance: f64,
}

/// The segment a location snapped to, and the index of its start point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachedWaypoint {
    pub nearest: NearestSegmentResult,
    pub reached_idx: usize,
}

impl ReachedWaypoint {
    /// Haversine distance in meters from the query location to the route.
    pub fn distance_m(&self) -> f64 {
        self.nearest.distance
    }

    pub fn snapped(&self) -> &Point {
        &self.nearest.nearest
    }
}

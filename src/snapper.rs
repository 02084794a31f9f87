//! Snapping of locations onto a piecewise-linear route.
//!
//! Segment selection happens in planar Web-Mercator geometry. Only the
//! winning segment's nearest point is measured again in meters.

use tracing::trace;

use crate::error::SnapError;
use crate::geometry::{DistanceMetric, Located, NearestSegmentResult, Point, ReachedWaypoint, Segment};

/// Best match closer than this (projection units) allows an early exit.
const CLOSE_MATCH: f64 = 25.0;

/// A segment further than this from a close match means the route is
/// moving away from the location.
const MOVING_AWAY: f64 = 50.0;

/// Options for [`RouteSnapper::insert`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertOptions {
    /// Reject locations further than this many meters from the route.
    pub distance_threshold_m: Option<f64>,
    /// Start the scan at this index instead of the route origin.
    pub previously_reached_idx: Option<usize>,
}

/// Snaps locations onto routes and measures along them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteSnapper;

impl RouteSnapper {
    pub fn new() -> Self {
        Self
    }

    /// Nearest point on `segment` to `location`, distance in projection units.
    pub fn segment_distance(&self, segment: Segment, location: &Point) -> NearestSegmentResult {
        let nearest = segment.nearest_point(location);
        NearestSegmentResult {
            segment,
            nearest,
            distance: nearest.planar_distance(location),
        }
    }

    /// Find the segment `location` belongs to, scanning forward from `start_idx`.
    ///
    /// The returned index is absolute (relative to `route`, not to
    /// `start_idx`) and the distance is in meters.
    pub fn find_reached_waypoint<P: Located>(
        &self,
        route: &[P],
        location: &Point,
        start_idx: usize,
    ) -> Result<ReachedWaypoint, SnapError> {
        if route.len() < 2 {
            return Err(SnapError::RouteTooShort { len: route.len() });
        }
        if start_idx >= route.len() - 1 {
            return Err(SnapError::HintOutOfRange {
                hint: start_idx,
                len: route.len(),
            });
        }

        let mut best: Option<(usize, NearestSegmentResult)> = None;
        for (offset, pair) in route[start_idx..].windows(2).enumerate() {
            let segment = Segment::new(*pair[0].position(), *pair[1].position());
            let candidate = self.segment_distance(segment, location);

            let best_distance = best.as_ref().map(|(_, current)| current.distance);
            match best_distance {
                Some(current) if candidate.distance >= current => {
                    if current < CLOSE_MATCH && candidate.distance > MOVING_AWAY {
                        trace!(stopped_at = start_idx + offset, "route moves away, stop scanning");
                        break;
                    }
                }
                _ => best = Some((start_idx + offset, candidate)),
            }
        }

        // At least one window exists, so `best` is always set here.
        let (reached_idx, planar) = best.ok_or(SnapError::RouteTooShort { len: route.len() })?;

        Ok(ReachedWaypoint {
            nearest: NearestSegmentResult {
                distance: location.haversine_distance(&planar.nearest),
                ..planar
            },
            reached_idx,
        })
    }

    /// Insert `location` into `route` right after the start of the segment
    /// it snaps to.
    ///
    /// Returns the snap result from before the insertion; the new point sits
    /// at `reached_idx + 1`. When chaining inserts, pass that index as the
    /// next `previously_reached_idx` so points snapping onto the same segment
    /// keep their insertion order.
    pub fn insert<P: Located>(
        &self,
        route: &mut Vec<P>,
        location: P,
        context: &str,
        options: InsertOptions,
    ) -> Result<ReachedWaypoint, SnapError> {
        let start_idx = options.previously_reached_idx.unwrap_or(0);
        let reached = self.find_reached_waypoint(route, location.position(), start_idx)?;

        if let Some(threshold_m) = options.distance_threshold_m {
            if reached.distance_m() > threshold_m {
                let position = location.position();
                return Err(SnapError::OutOfTolerance {
                    context: context.to_string(),
                    lat: position.lat(),
                    lon: position.lon(),
                    distance_m: reached.distance_m(),
                    threshold_m,
                });
            }
        }

        route.insert(reached.reached_idx + 1, location);
        Ok(reached)
    }

    /// Sum of distances between consecutive points.
    pub fn length<P: Located>(&self, points: &[P], metric: DistanceMetric) -> f64 {
        points
            .windows(2)
            .map(|pair| metric.between(pair[0].position(), pair[1].position()))
            .sum()
    }

    /// Like [`length`](Self::length), but `legs[i]`, when present, is taken
    /// as the distance from `points[i]` to `points[i + 1]` regardless of
    /// `metric`.
    pub fn length_with_legs<P: Located>(
        &self,
        points: &[P],
        legs: &[f64],
        metric: DistanceMetric,
    ) -> f64 {
        points
            .windows(2)
            .enumerate()
            .map(|(i, pair)| match legs.get(i) {
                Some(leg) => *leg,
                None => metric.between(pair[0].position(), pair[1].position()),
            })
            .sum()
    }
}

//! Route authoring: a recorded track plus the traffic lights along it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RouteBuildError, SnapError};
use crate::route::{PlannedRoute, RoutePoint};
use crate::snapper::{InsertOptions, RouteSnapper};
use crate::traits::TrafficLightLocator;

/// Static traffic-light data: where it stands and which stream reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLightSite {
    pub id: String,
    pub datastream_id: String,
    pub lat: f64,
    pub lon: f64,
}

impl TrafficLightSite {
    pub fn to_route_point(&self) -> RoutePoint {
        RoutePoint::traffic_light(self.lat, self.lon, &self.id, &self.datastream_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteBuilderOptions {
    /// Reject traffic lights further than this many meters from the track.
    pub distance_threshold_m: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteBuilder {
    snapper: RouteSnapper,
    options: RouteBuilderOptions,
}

impl RouteBuilder {
    pub fn new(options: RouteBuilderOptions) -> Self {
        Self {
            snapper: RouteSnapper::new(),
            options,
        }
    }

    /// Build a route from `track` (`(lat, lon)` in driving order) and the
    /// traffic lights along it.
    ///
    /// Lights are inserted in the given order. Each light's scan starts at
    /// the previous light, so lights of one crossing keep their order even
    /// when they snap onto the same segment.
    pub fn build(
        &self,
        name: &str,
        track: &[(f64, f64)],
        lights: &[TrafficLightSite],
    ) -> Result<PlannedRoute, RouteBuildError> {
        let mut points = dedupe_track(track);
        if points.is_empty() {
            return Err(RouteBuildError::EmptyTrack);
        }
        if points.len() < 2 {
            return Err(SnapError::RouteTooShort { len: points.len() }.into());
        }
        let track_len = points.len();

        let mut previously_reached_idx = None;
        for light in lights {
            let options = InsertOptions {
                distance_threshold_m: self.options.distance_threshold_m,
                previously_reached_idx,
            };
            let reached = self
                .snapper
                .insert(&mut points, light.to_route_point(), &light.id, options)?;
            debug!(
                traffic_light = %light.id,
                idx = reached.reached_idx + 1,
                off_route_m = reached.distance_m(),
                "traffic light placed"
            );
            previously_reached_idx = Some(reached.reached_idx + 1);
        }

        info!(
            route = name,
            track_points = track_len,
            traffic_lights = lights.len(),
            "route built"
        );
        Ok(PlannedRoute::new(name, points))
    }

    /// Like [`build`](Self::build), resolving light ids through `locator` first.
    pub fn build_with_locator<L, S>(
        &self,
        name: &str,
        track: &[(f64, f64)],
        light_ids: &[S],
        locator: &L,
    ) -> Result<PlannedRoute, RouteBuildError>
    where
        L: TrafficLightLocator + ?Sized,
        S: AsRef<str>,
    {
        let lights = light_ids
            .iter()
            .map(|id| locator.locate(id.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.build(name, track, &lights)
    }
}

/// Drop repeated track points, keeping the first occurrence.
fn dedupe_track(track: &[(f64, f64)]) -> Vec<RoutePoint> {
    let mut seen = HashSet::new();
    track
        .iter()
        .filter(|(lat, lon)| seen.insert((lat.to_bits(), lon.to_bits())))
        .map(|&(lat, lon)| RoutePoint::new(lat, lon))
        .collect()
}

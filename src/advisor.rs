//! Green-light speed advisory.
//!
//! One advisory call snaps the vehicle onto its route, finds the next
//! traffic light ahead, measures the distance to it and turns the light's
//! phase timeline into a speed recommendation.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AdvisoryError;
use crate::geometry::{DistanceMetric, Point};
use crate::phase::{merge_timeline, PhaseObservation, TargetPhase};
use crate::snapper::RouteSnapper;
use crate::traits::{PhaseDataSource, RouteSource};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdvisorOptions {
    /// Lights further away than this get no phase data or recommendation.
    pub notification_distance_m: f64,
    /// Necessary speeds above this are not considered reachable (m/s).
    pub max_speed_ms: f64,
    /// How many waypoints behind the caller's hint the snap scan starts.
    pub backward_search_margin: usize,
}

impl Default for AdvisorOptions {
    fn default() -> Self {
        Self {
            notification_distance_m: 10_000.0,
            max_speed_ms: 28.0 / 3.6, // urban limit plus slack
            backward_search_margin: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Slower,
    Keep,
    Quicker,
}

/// A single tracking update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub route_name: String,
    pub lat: f64,
    pub lon: f64,
    /// Reached waypoint index from the previous update, 0 at the start.
    pub reached_idx_hint: usize,
    /// Current speed in m/s, if known.
    pub current_speed_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnappedTo {
    pub lat: f64,
    pub lon: f64,
    pub reached_idx: usize,
}

/// Advisory outcome.
///
/// Only `snapped_to` is always present. Without a light ahead everything
/// else is `None`; for a light beyond the notification distance only the
/// id and distance are set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTrafficLight {
    pub traffic_light_id: Option<String>,
    pub distance_m: Option<f64>,
    pub snapped_to: SnappedTo,
    /// Merged observations and predictions, newest first.
    pub data: Option<Vec<PhaseObservation>>,
    pub necessary_speed: Option<f64>,
    pub recommendation: Option<Recommendation>,
}

/// Constant speed that reaches the light exactly at a phase change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NecessarySpeed {
    pub speed_ms: f64,
    pub target: TargetPhase,
    pub at: DateTime<Utc>,
}

/// Turns tracking updates into speed advice for the next traffic light.
pub struct SpeedAdvisor<R, P> {
    routes: R,
    phases: P,
    snapper: RouteSnapper,
    options: AdvisorOptions,
}

impl<R, P> SpeedAdvisor<R, P>
where
    R: RouteSource,
    P: PhaseDataSource,
{
    pub fn new(routes: R, phases: P) -> Self {
        Self::with_options(routes, phases, AdvisorOptions::default())
    }

    pub fn with_options(routes: R, phases: P, options: AdvisorOptions) -> Self {
        Self {
            routes,
            phases,
            snapper: RouteSnapper::new(),
            options,
        }
    }

    pub fn options(&self) -> &AdvisorOptions {
        &self.options
    }

    /// Advise using the current wall-clock time.
    pub fn advise_now(&self, request: &AdvisoryRequest) -> Result<NextTrafficLight, AdvisoryError> {
        self.advise(request, Utc::now())
    }

    /// Advise for one tracking update, evaluated at `now`.
    pub fn advise(
        &self,
        request: &AdvisoryRequest,
        now: DateTime<Utc>,
    ) -> Result<NextTrafficLight, AdvisoryError> {
        let route = self.routes.route(&request.route_name)?;
        let points = route.points();

        let start_idx = request
            .reached_idx_hint
            .saturating_sub(self.options.backward_search_margin)
            .min(points.len().saturating_sub(2));
        let location = Point::from_lat_lon(request.lat, request.lon);
        let reached = self.snapper.find_reached_waypoint(points, &location, start_idx)?;

        let snapped = *reached.snapped();
        let snapped_to = SnappedTo {
            lat: snapped.lat(),
            lon: snapped.lon(),
            reached_idx: reached.reached_idx,
        };
        debug!(
            route = %request.route_name,
            reached_idx = reached.reached_idx,
            off_route_m = reached.distance_m(),
            "snapped"
        );

        let Some((light_idx, light)) = route.next_traffic_light(reached.reached_idx) else {
            debug!(route = %request.route_name, "no traffic light ahead");
            return Ok(NextTrafficLight {
                traffic_light_id: None,
                distance_m: None,
                snapped_to,
                data: None,
                necessary_speed: None,
                recommendation: None,
            });
        };

        // Measure from the snapped position, not from the reached waypoint.
        let first = reached.reached_idx + 1;
        let distance_m = snapped.haversine_distance(&points[first].position)
            + self.snapper.length_with_legs(
                &points[first..=light_idx],
                &route.legs_m()[first..light_idx],
                DistanceMetric::Haversine,
            );
        debug!(traffic_light = %light.id, light_idx, distance_m, "next traffic light");

        if distance_m > self.options.notification_distance_m {
            return Ok(NextTrafficLight {
                traffic_light_id: Some(light.id.clone()),
                distance_m: Some(distance_m),
                snapped_to,
                data: None,
                necessary_speed: None,
                recommendation: None,
            });
        }

        let observations = self.phases.observations(&light.datastream_id)?;
        let predictions = self.phases.prediction(&light.id, &observations)?;
        let timeline = merge_timeline(observations, predictions);

        let necessary = necessary_speed(distance_m, &timeline, now, self.options.max_speed_ms);
        let recommendation = match (necessary, request.current_speed_ms) {
            (Some(necessary), Some(current)) if current > 0.0 => Some(classify(current, &necessary)),
            _ => None,
        };
        debug!(
            traffic_light = %light.id,
            necessary = ?necessary,
            recommendation = ?recommendation,
            "advised"
        );

        Ok(NextTrafficLight {
            traffic_light_id: Some(light.id.clone()),
            distance_m: Some(distance_m),
            snapped_to,
            data: Some(timeline),
            necessary_speed: necessary.map(|n| n.speed_ms),
            recommendation,
        })
    }
}

impl<R, P> SpeedAdvisor<R, P>
where
    R: RouteSource + Sync,
    P: PhaseDataSource + Sync,
{
    /// Advise many independent vehicles at the same `now`.
    pub fn advise_batch(
        &self,
        requests: &[AdvisoryRequest],
        now: DateTime<Utc>,
    ) -> Vec<Result<NextTrafficLight, AdvisoryError>> {
        requests
            .par_iter()
            .map(|request| self.advise(request, now))
            .collect()
    }
}

/// Earliest RED/GREEN phase change still ahead that is reachable at a
/// constant speed no higher than `max_speed_ms`.
///
/// `timeline` may be in any order. Time until the change is counted in
/// whole seconds.
pub fn necessary_speed(
    distance_m: f64,
    timeline: &[PhaseObservation],
    now: DateTime<Utc>,
    max_speed_ms: f64,
) -> Option<NecessarySpeed> {
    let mut ascending = timeline.to_vec();
    ascending.sort_by_key(|observation| observation.time);

    ascending.into_iter().find_map(|observation| {
        let target = TargetPhase::try_from(observation.state).ok()?;

        let seconds_until = (observation.time - now).num_seconds();
        if seconds_until <= 0 {
            return None;
        }

        let speed_ms = distance_m / seconds_until as f64;
        if speed_ms > max_speed_ms {
            return None;
        }

        Some(NecessarySpeed {
            speed_ms,
            target,
            at: observation.time,
        })
    })
}

/// Compare the current speed with the necessary one.
pub fn classify(current_speed_ms: f64, necessary: &NecessarySpeed) -> Recommendation {
    let diff = necessary.speed_ms - current_speed_ms;

    match necessary.target {
        // green ahead: arrive no earlier than needed
        TargetPhase::Green => {
            if diff <= 0.0 {
                Recommendation::Slower
            } else if diff < 1.0 {
                Recommendation::Keep
            } else {
                Recommendation::Quicker
            }
        }
        // red ahead: arrive no later than the switch to green
        TargetPhase::Red => {
            if diff <= -1.0 {
                Recommendation::Keep
            } else {
                Recommendation::Quicker
            }
        }
    }
}

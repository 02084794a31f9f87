//! End-to-end: author a route from a recorded track, store it, then drive
//! it as a tracked trip while receiving speed advisories.

mod fixtures;

use std::sync::Arc;

use chrono::Duration;

use glosa_core::advisor::{AdvisoryRequest, Recommendation, SpeedAdvisor};
use glosa_core::error::{RouteBuildError, SnapError, TrackingError};
use glosa_core::phase::SignalState;
use glosa_core::route_builder::{RouteBuilder, RouteBuilderOptions};
use glosa_core::store::InMemoryRouteStore;
use glosa_core::tracking::{track_and_advise, InMemoryTripStore, TrackedPosition};
use glosa_core::traits::{RouteSource, TripStore};

use fixtures::hamburg_locations::{light_sites, LIGHT_INDICES, TRACK};
use fixtures::mocks::{now, obs, MockPhases};

fn hamburg_store() -> Arc<InMemoryRouteStore> {
    let store = Arc::new(InMemoryRouteStore::new());
    let route = RouteBuilder::default()
        .build("eimsbuettel", TRACK, &light_sites())
        .unwrap();
    store.insert(route);
    store
}

fn crossing_813() -> MockPhases {
    MockPhases::new()
        .observed("50850", vec![obs(-10, SignalState::Red)])
        .predicted("813_19", vec![obs(20, SignalState::Green), obs(50, SignalState::Amber)])
        .predicted("813_20", vec![obs(3, SignalState::Red), obs(40, SignalState::Green)])
}

#[test]
fn built_route_places_lights_between_track_points() {
    let store = hamburg_store();
    let route = store.route("eimsbuettel").unwrap();

    assert_eq!(route.len(), TRACK.len() + LIGHT_INDICES.len());
    let placed: Vec<usize> = route.to_planned().traffic_lights().map(|(idx, _)| idx).collect();
    assert_eq!(placed, LIGHT_INDICES);
    assert_eq!(route.legs_m().len(), route.len() - 1);
}

#[test]
fn strict_threshold_rejects_the_route() {
    let builder = RouteBuilder::new(RouteBuilderOptions {
        distance_threshold_m: Some(2.0),
    });

    // 813_20 stands 2.8 m off the track
    let err = builder.build("eimsbuettel", TRACK, &light_sites()).unwrap_err();
    match err {
        RouteBuildError::Snap(SnapError::OutOfTolerance { context, .. }) => {
            assert_eq!(context, "813_20")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn get_or_build_authors_once() {
    let store = InMemoryRouteStore::new();
    let builder = RouteBuilder::default();

    let first = store
        .get_or_build("eimsbuettel", || builder.build("eimsbuettel", TRACK, &light_sites()))
        .unwrap();
    let second = store
        .get_or_build("eimsbuettel", || -> Result<_, RouteBuildError> {
            panic!("route should already be stored")
        })
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.route_names(), vec!["eimsbuettel".to_string()]);
}

#[test]
fn advises_approaching_the_first_crossing() {
    let store = hamburg_store();
    let advisor = SpeedAdvisor::new(Arc::clone(&store), crossing_813());

    let request = AdvisoryRequest {
        route_name: "eimsbuettel".to_string(),
        lat: 53.56330,
        lon: 9.93050,
        reached_idx_hint: 0,
        current_speed_ms: Some(6.0),
    };
    let result = advisor.advise(&request, now()).unwrap();

    assert_eq!(result.snapped_to.reached_idx, 0);
    assert_eq!(result.traffic_light_id.as_deref(), Some("813_19"));
    assert!((result.distance_m.unwrap() - 77.88).abs() < 0.1);
    // 77.9 m to green in 20 s
    assert!((result.necessary_speed.unwrap() - 3.894).abs() < 0.01);
    assert_eq!(result.recommendation, Some(Recommendation::Slower));
}

#[test]
fn tracked_trip_receives_advisories_along_the_route() {
    let routes = hamburg_store();
    let trips = InMemoryTripStore::new(Arc::clone(&routes));
    let advisor = SpeedAdvisor::new(Arc::clone(&routes), crossing_813());
    let t = |secs: i64| now() + Duration::seconds(secs);

    let trip_id = trips.start_trip(t(-60), "eimsbuettel").unwrap();

    let approach = [
        TrackedPosition::new(53.56322, 9.93000, t(-2)).with_speed(5.0),
        TrackedPosition::new(53.56330, 9.93050, t(0)).with_speed(6.0),
    ];
    let first = track_and_advise(&trips, &advisor, trip_id, &approach, 0, now()).unwrap();
    assert_eq!(first.traffic_light_id.as_deref(), Some("813_19"));
    assert_eq!(first.recommendation, Some(Recommendation::Slower));

    // past 813_19, 5.7 m before 813_20 which turns red in 3 s
    let crossing = [TrackedPosition::new(53.56352, 9.93168, t(15)).with_speed(5.0)];
    let second = track_and_advise(
        &trips,
        &advisor,
        trip_id,
        &crossing,
        first.snapped_to.reached_idx,
        now(),
    )
    .unwrap();
    assert_eq!(second.snapped_to.reached_idx, 3);
    assert_eq!(second.traffic_light_id.as_deref(), Some("813_20"));
    assert!((second.distance_m.unwrap() - 5.70).abs() < 0.05);
    assert_eq!(second.recommendation, Some(Recommendation::Keep));

    let beyond = [TrackedPosition::new(53.56390, 9.93370, t(40)).with_speed(7.0)];
    let last = track_and_advise(
        &trips,
        &advisor,
        trip_id,
        &beyond,
        second.snapped_to.reached_idx,
        now(),
    )
    .unwrap();
    assert_eq!(last.snapped_to.reached_idx, 8);
    assert!(last.traffic_light_id.is_none());

    let trip = trips.end_trip(trip_id, t(60)).unwrap();
    assert_eq!(trip.version, 3);
    assert_eq!(trip.locations.len(), 4);
    assert_eq!(trip.route_name, "eimsbuettel");
}

#[test]
fn rejected_batch_gives_no_advisory() {
    let routes = hamburg_store();
    let trips = InMemoryTripStore::new(Arc::clone(&routes));
    let advisor = SpeedAdvisor::new(Arc::clone(&routes), crossing_813());

    let trip_id = trips.start_trip(now(), "eimsbuettel").unwrap();
    let position = TrackedPosition::new(53.56330, 9.93050, now());
    track_and_advise(&trips, &advisor, trip_id, &[position.clone()], 0, now()).unwrap();

    let err = track_and_advise(&trips, &advisor, trip_id, &[position], 0, now()).unwrap_err();
    assert!(matches!(err, TrackingError::DuplicateMeasurement { .. }));

    let err = track_and_advise(&trips, &advisor, trip_id, &[], 0, now()).unwrap_err();
    assert!(matches!(err, TrackingError::EmptyBatch));
}

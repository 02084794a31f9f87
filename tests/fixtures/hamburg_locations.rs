//! A short recorded track through Hamburg-Eimsbüttel and the traffic lights
//! along it.
//!
//! Light ids follow the Hamburg urban data platform naming (`<crossing>_<signal>`).

use glosa_core::route_builder::TrafficLightSite;

/// Recorded track, in driving order, as `(lat, lon)`.
pub const TRACK: &[(f64, f64)] = &[
    (53.56320, 9.92990),
    (53.56335, 9.93080),
    (53.56348, 9.93150),
    (53.56360, 9.93215),
    (53.56368, 9.93255),
    (53.56380, 9.93320),
    (53.56395, 9.93400),
];

/// Signals of crossing 813, in the order they are listed for the route.
pub const LIGHTS: &[(&str, &str, f64, f64)] = &[
    ("813_19", "50850", 53.56350, 9.93163),
    ("813_20", "50851", 53.56355, 9.93175),
    ("813_21", "50852", 53.56372, 9.93270),
];

/// Route index of each light once inserted into [`TRACK`].
pub const LIGHT_INDICES: &[usize] = &[3, 4, 7];

pub fn light_sites() -> Vec<TrafficLightSite> {
    LIGHTS
        .iter()
        .map(|&(id, datastream_id, lat, lon)| TrafficLightSite {
            id: id.to_string(),
            datastream_id: datastream_id.to_string(),
            lat,
            lon,
        })
        .collect()
}

//! glosa-core: green light optimal speed advisory
//!
//! Snaps GPS fixes onto a predefined route, finds the next traffic light
//! ahead and recommends whether to slow down, keep speed or speed up to
//! pass it on green.

pub mod error;
pub mod projection;
pub mod haversine;
pub mod geometry;
pub mod snapper;
pub mod route;
pub mod route_builder;
pub mod phase;
pub mod advisor;
pub mod traits;
pub mod store;
pub mod tracking;
pub mod tld;

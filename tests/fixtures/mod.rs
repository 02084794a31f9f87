//! Test fixtures for glosa-core.
//!
//! Provides realistic route data and mock collaborators shared by the
//! integration tests.

#![allow(dead_code)]

pub mod hamburg_locations;
pub mod mocks;

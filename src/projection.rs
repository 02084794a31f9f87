//! Web-Mercator (EPSG:3857) projection.
//!
//! Route geometry is compared in projected planar coordinates; geographic
//! coordinates are only needed for great-circle distances and output.

/// Half the projected extent of the world along the x axis, in projection units.
pub const MERCATOR_HALF_EXTENT: f64 = 20037508.34;

/// Projection units per degree of longitude.
const UNITS_PER_DEGREE: f64 = MERCATOR_HALF_EXTENT / 180.0;

/// Project geographic coordinates (WGS-84 degrees) to Web-Mercator `(x, y)`.
pub fn project(lat: f64, lon: f64) -> (f64, f64) {
    (lon_to_x(lon), lat_to_y(lat))
}

/// Inverse of [`project`]: returns `(lat, lon)` in degrees.
pub fn unproject(x: f64, y: f64) -> (f64, f64) {
    (y_to_lat(y), x_to_lon(x))
}

pub fn lon_to_x(lon: f64) -> f64 {
    lon * UNITS_PER_DEGREE
}

pub fn lat_to_y(lat: f64) -> f64 {
    let degrees = ((90.0 + lat).to_radians() / 2.0).tan().ln().to_degrees();
    degrees * UNITS_PER_DEGREE
}

pub fn x_to_lon(x: f64) -> f64 {
    x / UNITS_PER_DEGREE
}

pub fn y_to_lat(y: f64) -> f64 {
    let degrees = y / UNITS_PER_DEGREE;
    (2.0 * degrees.to_radians().exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees()
}

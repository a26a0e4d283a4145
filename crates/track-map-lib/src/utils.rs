//! Utility functions for world coordinates, headings and distances
//!
//! World points are `geo::Point<f64>` with `x` pointing east and `y` pointing north
//! (the route's Z axis). Headings are in radians, 0 = north, increasing clockwise.

use geo::Point;
use std::f64::consts::{PI, TAU};

/// Edge length of a world tile in meters
pub const TILE_SIZE: f64 = 2048.0;

/// Half a tile: local offsets inside a tile range over `[-HALF_TILE_SIZE, HALF_TILE_SIZE)`
pub const HALF_TILE_SIZE: f64 = TILE_SIZE / 2.0;

/// Squared distance (m²) under which a point counts as sitting on a segment endpoint
pub const PROXIMITY_TOLERANCE: f64 = 1.0;

/// Normalize an angle in radians to `(-π, π]`
#[inline(always)]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Unit vector pointing along the given heading
#[inline(always)]
pub fn heading_vector(heading: f64) -> Point<f64> {
    Point::new(heading.sin(), heading.cos())
}

/// Heading of the straight line from `from` to `to`
#[inline(always)]
pub fn bearing(from: Point<f64>, to: Point<f64>) -> f64 {
    let delta = to - from;
    wrap_angle(delta.x().atan2(delta.y()))
}

/// Squared Euclidean distance between two points
#[inline(always)]
pub fn distance_squared(a: Point<f64>, b: Point<f64>) -> f64 {
    let delta = a - b;
    delta.dot(delta)
}

/// Euclidean distance between two points
#[inline(always)]
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    distance_squared(a, b).sqrt()
}

/// Convert a tile-relative location into an absolute world point
#[inline(always)]
pub fn world_point(tile_x: i32, tile_z: i32, local_x: f64, local_z: f64) -> Point<f64> {
    Point::new(
        tile_x as f64 * TILE_SIZE + local_x,
        tile_z as f64 * TILE_SIZE + local_z,
    )
}

//! Plane geometry used by the simulation: points, distances and angle wrapping

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// A position on the map. The origin is the map centre.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Moves `length` units from this point along `angle` (radians).
    pub fn advanced(&self, angle: f64, length: f64) -> Point {
        Point {
            x: self.x + angle.cos() * length,
            y: self.y + angle.sin() * length,
        }
    }

    /// Direction from this point towards `other`, in radians.
    pub fn angle_to(&self, other: &Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Clamps both coordinates into `[-half_extent, half_extent]`.
    pub fn clamped(&self, half_extent: f64) -> Point {
        Point {
            x: self.x.clamp(-half_extent, half_extent),
            y: self.y.clamp(-half_extent, half_extent),
        }
    }

    /// Integer projection used for snapshots.
    pub fn rounded(&self) -> GridPoint {
        GridPoint {
            x: self.x.round() as i32,
            y: self.y.round() as i32,
        }
    }
}

/// Rounded point sent over the wire.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl From<GridPoint> for Point {
    fn from(p: GridPoint) -> Self {
        Point::new(f64::from(p.x), f64::from(p.y))
    }
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can land on either end of the range after rounding
    if wrapped <= -PI {
        wrapped += TAU;
    } else if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Signed shortest rotation that takes `from` onto `to`.
pub fn angle_delta(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

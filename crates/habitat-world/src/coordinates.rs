//! Surface positions and the distance metric used by stall detection.
//!
//! Positions use spherical coordinates on a Mars-sized sphere: `phi` is the
//! polar angle from the north pole (`0..=PI`) and `theta` the longitude
//! (`0..2*PI`), both in radians. Distances are great-circle kilometres.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Mean radius of Mars in kilometres.
pub const MARS_RADIUS_KM: f64 = 3393.0;

/// A metric between two positions of the same kind.
///
/// The watchdog only ever asks "how far is it from here to the goal", so
/// anything with a meaningful scalar distance can be monitored.
pub trait Distance {
    /// Return the distance from `self` to `other` (non-negative).
    fn distance_to(&self, other: &Self) -> f64;
}

/// A point on the Martian surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    phi: f64,
    theta: f64,
}

impl Coordinates {
    /// Create a position, normalising `phi` into `[0, PI]` and `theta`
    /// into `[0, 2*PI)`.
    pub fn new(phi: f64, theta: f64) -> Self {
        Self {
            phi: phi.clamp(0.0, PI),
            theta: theta.rem_euclid(TAU),
        }
    }

    /// Create a position from latitude / longitude in degrees
    /// (north and east positive).
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self::new((90.0 - latitude).to_radians(), longitude.to_radians())
    }

    /// Return the polar angle in radians.
    pub const fn phi(&self) -> f64 {
        self.phi
    }

    /// Return the longitude in radians.
    pub const fn theta(&self) -> f64 {
        self.theta
    }

    /// Return the initial bearing (radians clockwise from north, in
    /// `[0, 2*PI)`) of the great-circle path to `other`.
    pub fn bearing_to(&self, other: &Self) -> f64 {
        let lat1 = PI / 2.0 - self.phi;
        let lat2 = PI / 2.0 - other.phi;
        let d_lon = other.theta - self.theta;
        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x).rem_euclid(TAU)
    }

    /// Return the position reached by moving `distance_km` along `bearing`
    /// (radians clockwise from north).
    pub fn travel(&self, bearing: f64, distance_km: f64) -> Self {
        let angular = distance_km / MARS_RADIUS_KM;
        let lat = PI / 2.0 - self.phi;
        let new_lat = (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos())
            .clamp(-1.0, 1.0)
            .asin();
        let new_lon = self.theta
            + (bearing.sin() * angular.sin() * lat.cos())
                .atan2(angular.cos() - lat.sin() * new_lat.sin());
        Self::new(PI / 2.0 - new_lat, new_lon)
    }
}

impl Distance for Coordinates {
    /// Great-circle distance in kilometres (haversine form).
    fn distance_to(&self, other: &Self) -> f64 {
        let lat1 = PI / 2.0 - self.phi;
        let lat2 = PI / 2.0 - other.phi;
        let d_lat = lat2 - lat1;
        let d_lon = other.theta - self.theta;
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().clamp(0.0, 1.0).asin();
        MARS_RADIUS_KM * c
    }
}

impl core::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let lat = 90.0 - self.phi.to_degrees();
        let mut lon = self.theta.to_degrees();
        if lon > 180.0 {
            lon -= 360.0;
        }
        let ns = if lat >= 0.0 { 'N' } else { 'S' };
        let ew = if lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.2}{ns} {:.2}{ew}", lat.abs(), lon.abs())
    }
}

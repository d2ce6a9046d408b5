//! Physical and numerical constants

use std::f64::consts::PI;

/// Full turn in radians
pub const TAU: f64 = 2.0 * PI;

/// Earth gravitational parameter in m³/s² (JGM-3 value)
pub const GM_EARTH: f64 = 3.986004415e14;

/// Eccentricity below which an orbit is treated as circular
pub const CIRCULAR_ECCENTRICITY: f64 = 1e-11;

/// Half-width of the eccentricity band around 1 treated as parabolic
pub const PARABOLIC_ECCENTRICITY: f64 = 1e-10;

/// Half-width of the band around e = 1, outside the parabolic one, where
/// propagation uses the universal anomaly instead of Kepler's equation
pub const NEAR_PARABOLIC_ECCENTRICITY: f64 = 1e-3;

/// Inclination below which (or within which of π) an orbit is equatorial
pub const EQUATORIAL_INCLINATION: f64 = 1e-12;

/// Default Newton-Raphson convergence tolerance, relative to |M| or |Δt|
pub const DEFAULT_KEPLER_TOLERANCE: f64 = 1e-12;

/// Default Newton-Raphson iteration budget
pub const DEFAULT_KEPLER_MAX_ITERATIONS: usize = 100;

//! Kepler's equation and anomaly conversions
//!
//! Relates the true anomaly ν to the time-linear mean anomaly M in every
//! conic regime:
//!
//! - elliptic: eccentric anomaly E, `M = E − e·sin(E)`
//! - hyperbolic: hyperbolic anomaly H, `M = e·sinh(H) − H`
//! - parabolic: Barker's equation, `M = D + D³/3` with `D = tan(ν/2)`
//!
//! The transcendental cases are solved through a [`KeplerSolver`]; the
//! parabolic cubic has a closed form. Orbits close to e = 1 on either side
//! are handled by the universal-variable form in [`universal`].
//!
//! # Example
//!
//! ```
//! use kepler_propagator::keplerlib::{
//!     eccentric_to_true_anomaly, KeplerSolver, NewtonRaphson,
//! };
//!
//! let solver = NewtonRaphson::default();
//! let ea = solver.eccentric_anomaly(1.0, 0.1).unwrap();
//! let nu = eccentric_to_true_anomaly(0.1, ea);
//! assert!(nu > ea);
//! ```

pub mod solver;
pub mod universal;

use std::f64::consts::PI;

use crate::constants::TAU;

pub use solver::{KeplerSolver, NewtonRaphson, NewtonRaphsonConfig, Root};
pub use universal::{stumpff_c2, stumpff_c3, UniversalKepler};

/// |x| below which `x − sin(x)` and `sinh(x) − x` are summed as series
const SERIES_LIMIT: f64 = 1.0;

/// Normalize angle to [-π, π)
pub(crate) fn normpi(x: f64) -> f64 {
    (x + PI).rem_euclid(TAU) - PI
}

/// Reduce an angle to [-π, π], leaving angles already in range untouched
///
/// Unlike [`normpi`] this keeps full relative precision for small angles.
pub(crate) fn reduce_angle(x: f64) -> f64 {
    if x.abs() <= PI {
        x
    } else {
        normpi(x)
    }
}

/// Sum of the odd power series `x³/3! ± x⁵/5! + x⁷/7! ± …`
fn odd_series_tail(x: f64, alternating: bool) -> f64 {
    let x2 = if alternating { -x * x } else { x * x };
    let mut term = x * x * x / 6.0;
    let mut sum = term;
    let mut n = 3.0;
    while term.abs() > f64::EPSILON * sum.abs() {
        term *= x2 / ((n + 1.0) * (n + 2.0));
        sum += term;
        n += 2.0;
    }
    sum
}

/// `x − sin(x)`, accurate for small x
pub(crate) fn x_minus_sin(x: f64) -> f64 {
    if x.abs() < SERIES_LIMIT {
        odd_series_tail(x, true)
    } else {
        x - x.sin()
    }
}

/// `sinh(x) − x`, accurate for small x
pub(crate) fn sinh_minus_x(x: f64) -> f64 {
    if x.abs() < SERIES_LIMIT {
        odd_series_tail(x, false)
    } else {
        x.sinh() - x
    }
}

/// Eccentric anomaly from true anomaly (0 ≤ e < 1), in (-π, π]
pub fn true_to_eccentric_anomaly(e: f64, nu: f64) -> f64 {
    let half = 0.5 * nu;
    2.0 * ((1.0 - e).sqrt() * half.sin()).atan2((1.0 + e).sqrt() * half.cos())
}

/// True anomaly from eccentric anomaly (0 ≤ e < 1), in (-π, π]
pub fn eccentric_to_true_anomaly(e: f64, ea: f64) -> f64 {
    let half = 0.5 * ea;
    2.0 * ((1.0 + e).sqrt() * half.sin()).atan2((1.0 - e).sqrt() * half.cos())
}

/// Mean anomaly from eccentric anomaly
///
/// Evaluated as `(1 − e)·E + e·(E − sin E)` so that M keeps its relative
/// precision near periapsis of highly eccentric orbits.
pub fn eccentric_to_mean_anomaly(e: f64, ea: f64) -> f64 {
    (1.0 - e) * ea + e * x_minus_sin(ea)
}

/// Hyperbolic anomaly from true anomaly (e > 1)
///
/// ν must lie strictly inside the asymptotes, `|ν| < acos(−1/e)`.
pub fn true_to_hyperbolic_anomaly(e: f64, nu: f64) -> f64 {
    2.0 * (((e - 1.0) / (e + 1.0)).sqrt() * (0.5 * nu).tan()).atanh()
}

/// True anomaly from hyperbolic anomaly (e > 1)
pub fn hyperbolic_to_true_anomaly(e: f64, ha: f64) -> f64 {
    2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (0.5 * ha).tanh()).atan()
}

/// Mean anomaly from hyperbolic anomaly, as `(e − 1)·H + e·(sinh H − H)`
pub fn hyperbolic_to_mean_anomaly(e: f64, ha: f64) -> f64 {
    (e - 1.0) * ha + e * sinh_minus_x(ha)
}

/// Parabolic mean anomaly `D + D³/3` from true anomaly (Barker's equation)
pub fn true_to_parabolic_mean_anomaly(nu: f64) -> f64 {
    let d = (0.5 * nu).tan();
    d + d * d * d / 3.0
}

/// True anomaly from parabolic mean anomaly
///
/// Solves `D³ + 3D − 3M = 0` with Cardano's formula. The cubic has a single
/// real root, `D = B − 1/B` with `B = ∛(W + √(W² + 1))` and `W = 3M/2`.
/// Since `B³ − B⁻³ = 2W`, the root is evaluated as `2W / (B² + 1 + B⁻²)`,
/// which stays accurate when B is close to 1.
pub fn parabolic_mean_to_true_anomaly(m: f64) -> f64 {
    let w = 1.5 * m.abs();
    let b = (w + (w * w + 1.0).sqrt()).cbrt();
    let b2 = b * b;
    let d = (2.0 * w / (b2 + 1.0 + 1.0 / b2)).copysign(m);
    2.0 * d.atan()
}

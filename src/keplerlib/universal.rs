//! Universal-variable form of Kepler's equation
//!
//! Close to e = 1 the classical anomalies degenerate: the semi-major axis
//! grows without bound and the mean anomaly becomes a small difference of
//! large terms. The universal anomaly χ keeps the same scale on both sides
//! of the parabolic boundary, so near-parabolic orbits are propagated
//! straight from their Cartesian state.
//!
//! With σ₀ = r₀·v₀/√μ, α = 2/r₀ − v₀²/μ and ψ = αχ², the elapsed time is
//!
//! ```text
//! √μ·Δt = χ³·c₃(ψ) + σ₀·χ²·c₂(ψ) + r₀·χ·(1 − ψ·c₃(ψ))
//! ```
//!
//! whose χ-derivative is the orbital radius, so the equation is strictly
//! increasing in χ.

use crate::errors::{KeplerError, Result};
use crate::state::State;

/// |ψ| below which the Stumpff functions are summed as series
const STUMPFF_SERIES_LIMIT: f64 = 1.0;

/// Doublings allowed while growing the bracket around χ
const MAX_BRACKET_DOUBLINGS: usize = 200;

/// Stumpff function c₂(ψ) = (1 − cos√ψ)/ψ, continued to ψ ≤ 0
pub fn stumpff_c2(psi: f64) -> f64 {
    if psi.abs() < STUMPFF_SERIES_LIMIT {
        stumpff_series(psi, 2)
    } else if psi > 0.0 {
        (1.0 - psi.sqrt().cos()) / psi
    } else {
        ((-psi).sqrt().cosh() - 1.0) / -psi
    }
}

/// Stumpff function c₃(ψ) = (√ψ − sin√ψ)/√ψ³, continued to ψ ≤ 0
pub fn stumpff_c3(psi: f64) -> f64 {
    if psi.abs() < STUMPFF_SERIES_LIMIT {
        stumpff_series(psi, 3)
    } else if psi > 0.0 {
        let s = psi.sqrt();
        (s - s.sin()) / (psi * s)
    } else {
        let s = (-psi).sqrt();
        (s.sinh() - s) / (-psi * s)
    }
}

/// Σ (−ψ)^k / (2k + order)!
fn stumpff_series(psi: f64, order: u32) -> f64 {
    let mut term = 1.0 / (1..=order).map(f64::from).product::<f64>();
    let mut sum = term;
    let mut n = f64::from(order);
    while term.abs() > f64::EPSILON * sum.abs() {
        term *= -psi / ((n + 1.0) * (n + 2.0));
        sum += term;
        n += 2.0;
    }
    sum
}

/// The universal Kepler equation of one initial state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniversalKepler {
    /// r₀
    radius: f64,
    /// σ₀ = r₀·v₀/√μ
    sigma: f64,
    /// α = 1/a, zero on a parabola
    alpha: f64,
    sqrt_mu: f64,
}

impl UniversalKepler {
    pub fn new(state: &State, mu: f64) -> Self {
        let position = state.position();
        let velocity = state.velocity();
        let radius = position.norm();
        let sqrt_mu = mu.sqrt();
        UniversalKepler {
            radius,
            sigma: position.dot(&velocity) / sqrt_mu,
            alpha: 2.0 / radius - velocity.norm_squared() / mu,
            sqrt_mu,
        }
    }

    /// Reciprocal semi-major axis α = 2/r₀ − v₀²/μ
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn sqrt_mu(&self) -> f64 {
        self.sqrt_mu
    }

    /// Time elapsed when the universal anomaly reaches χ
    pub fn elapsed_at(&self, chi: f64) -> f64 {
        let psi = self.alpha * chi * chi;
        let c2 = stumpff_c2(psi);
        let c3 = stumpff_c3(psi);
        chi * (chi * chi * c3 + self.sigma * chi * c2 + self.radius * (1.0 - psi * c3))
            / self.sqrt_mu
    }

    /// Orbital radius at χ; equals `√μ · d(elapsed)/dχ`
    pub fn radius_at(&self, chi: f64) -> f64 {
        let psi = self.alpha * chi * chi;
        let c2 = stumpff_c2(psi);
        let c3 = stumpff_c3(psi);
        chi * chi * c2 + self.sigma * chi * (1.0 - psi * c3) + self.radius * (1.0 - psi * c2)
    }

    /// χ solving the parabolic (α = 0) equation, a starting point for the solver
    ///
    /// Substituting χ = y − σ₀ reduces the cubic to `y³ + 3P·y − 2Q = 0`
    /// with `P = 2r₀ − σ₀²`, which equals the semi-latus rectum on a
    /// parabola. Its real root is taken in the same cancellation-free form
    /// as Barker's equation. Falls back to `√μ·Δt/r₀` when P ≤ 0.
    pub fn initial_guess(&self, elapsed: f64) -> f64 {
        let sigma = self.sigma;
        let p = 2.0 * self.radius - sigma * sigma;
        if !(p > 0.0) {
            return self.sqrt_mu * elapsed / self.radius;
        }
        let q = 3.0 * self.sqrt_mu * elapsed + 3.0 * self.radius * sigma - sigma.powi(3);
        let b = (q.abs() + (q * q + p.powi(3)).sqrt()).cbrt();
        let b2 = b * b;
        let y = (2.0 * q.abs() / (b2 + p + p * p / b2)).copysign(q);
        y - sigma
    }

    /// Interval `(lower, upper)` of χ containing the anomaly reached after `elapsed`
    ///
    /// Starts from χ = 0 and doubles outwards until the elapsed time is
    /// passed. A non-finite time counts as passed: the Stumpff functions
    /// only overflow far beyond the root.
    pub fn bracket(&self, elapsed: f64) -> Result<(f64, f64)> {
        if elapsed == 0.0 {
            return Ok((0.0, 0.0));
        }
        let target = elapsed.abs();
        let mut near = 0.0;
        let mut far = self.sqrt_mu * elapsed / self.radius;
        if far == 0.0 {
            far = f64::MIN_POSITIVE.copysign(elapsed);
        }

        for _ in 0..MAX_BRACKET_DOUBLINGS {
            let reached = self.elapsed_at(far);
            if !reached.is_finite() || reached.abs() >= target {
                return Ok(if elapsed > 0.0 { (near, far) } else { (far, near) });
            }
            near = far;
            far *= 2.0;
        }

        Err(KeplerError::Convergence {
            iterations: MAX_BRACKET_DOUBLINGS,
            last_iterate: far,
            residual: (self.elapsed_at(far) - elapsed).abs(),
        })
    }

    /// State after `elapsed` from the Lagrange coefficients at the solved χ
    ///
    /// `state` must be the state this equation was built from.
    pub fn propagate(&self, state: &State, chi: f64, elapsed: f64) -> State {
        let position = state.position();
        let velocity = state.velocity();

        let chi2 = chi * chi;
        let psi = self.alpha * chi2;
        let c2 = stumpff_c2(psi);
        let c3 = stumpff_c3(psi);
        let radius = self.radius_at(chi);

        let f = 1.0 - chi2 * c2 / self.radius;
        let g = elapsed - chi2 * chi * c3 / self.sqrt_mu;
        let f_dot = self.sqrt_mu * chi * (psi * c3 - 1.0) / (radius * self.radius);
        let g_dot = 1.0 - chi2 * c2 / radius;

        State::from_position_velocity(
            &(f * position + g * velocity),
            &(f_dot * position + g_dot * velocity),
        )
    }
}

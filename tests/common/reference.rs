//! Two-body reference propagator for test-only use.
//!
//! Solves the universal Kepler equation with the Laguerre–Conway iteration
//! and rebuilds the state from the Lagrange f and g coefficients, written in
//! terms of the universal functions U₀…U₃. It forms no orbital elements and
//! no anomalies, so it checks the element path and the near-parabolic path
//! of the crate alike.

use kepler_propagator::State;
use nalgebra::Vector3;

/// Degree of the Laguerre–Conway iteration
const LAGUERRE_DEGREE: f64 = 5.0;

const MAX_ITERATIONS: usize = 200;

/// Stumpff functions (c₂, c₃) at z = αx²
fn stumpff_pair(z: f64) -> (f64, f64) {
    if z == 0.0 {
        return (0.5, 1.0 / 6.0);
    }
    let s = z.abs().sqrt();

    // Half-angle forms: 1 − cos s = 2 sin²(s/2), cosh s − 1 = 2 sinh²(s/2).
    let c2 = if z > 0.0 {
        2.0 * (0.5 * s).sin().powi(2) / z
    } else {
        2.0 * (0.5 * s).sinh().powi(2) / -z
    };

    let c3 = if s < 0.5 {
        // Σ (−z)^k / (2k + 3)!
        let mut term = 1.0 / 6.0;
        let mut sum = term;
        for k in 1..12 {
            let n = 2.0 * k as f64 + 1.0;
            term *= -z / ((n + 1.0) * (n + 2.0));
            sum += term;
        }
        sum
    } else if z > 0.0 {
        (s - s.sin()) / (z * s)
    } else {
        (s.sinh() - s) / (-z * s)
    };

    (c2, c3)
}

/// Universal functions (U₁, U₂, U₃) at x, with U₀ = 1 − α·U₂
fn universal_functions(alpha: f64, x: f64) -> (f64, f64, f64) {
    let z = alpha * x * x;
    let (c2, c3) = stumpff_pair(z);
    (x * (1.0 - z * c3), x * x * c2, x * x * x * c3)
}

/// State after `elapsed` seconds of two-body motion around `mu`
pub fn reference_state(state: &State, mu: f64, elapsed: f64) -> State {
    if elapsed == 0.0 {
        return *state;
    }

    let r0: Vector3<f64> = state.position();
    let v0: Vector3<f64> = state.velocity();
    let r0_norm = r0.norm();
    let sqrt_mu = mu.sqrt();
    let sigma0 = r0.dot(&v0) / sqrt_mu;
    let alpha = 2.0 / r0_norm - v0.norm_squared() / mu;
    let target = sqrt_mu * elapsed;

    // F(x) = U₃ + σ₀U₂ + r₀U₁ − √μΔt, F' = r(x), F'' = σ₀U₀ + (1 − αr₀)U₁
    let kepler = |x: f64| {
        let (u1, u2, u3) = universal_functions(alpha, x);
        let u0 = 1.0 - alpha * u2;
        (
            u3 + sigma0 * u2 + r0_norm * u1 - target,
            u2 + sigma0 * u1 + r0_norm * u0,
            sigma0 * u0 + (1.0 - alpha * r0_norm) * u1,
        )
    };

    let n = LAGUERRE_DEGREE;
    let mut x = if alpha * r0_norm > 1e-6 {
        target * alpha
    } else {
        target / r0_norm
    };
    for _ in 0..MAX_ITERATIONS {
        let (f, df, ddf) = kepler(x);
        let spread = ((n - 1.0).powi(2) * df * df - n * (n - 1.0) * f * ddf)
            .abs()
            .sqrt();
        let delta = n * f / (df + spread.copysign(df));
        x -= delta;
        if delta.abs() <= 1e-15 * x.abs() {
            break;
        }
    }

    let (u1, u2, u3) = universal_functions(alpha, x);
    let radius = kepler(x).1;

    let f = 1.0 - u2 / r0_norm;
    let g = elapsed - u3 / sqrt_mu;
    let f_dot = -sqrt_mu * u1 / (radius * r0_norm);
    let g_dot = 1.0 - u2 / radius;

    State::from_position_velocity(&(f * r0 + g * v0), &(f_dot * r0 + g_dot * v0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stumpff_pair_continuous_at_series_switch() {
        for &z in &[-0.25, 0.25] {
            let inside = stumpff_pair(z * (1.0 - 1e-12));
            let outside = stumpff_pair(z * (1.0 + 1e-12));
            assert!((inside.1 - outside.1).abs() < 1e-12);
            assert!((inside.0 - outside.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_circular_quarter_turn() {
        let mu: f64 = 3.986004415e14;
        let r: f64 = 7e6;
        let v = (mu / r).sqrt();
        let quarter = 0.5 * std::f64::consts::PI * (r.powi(3) / mu).sqrt();
        let state = reference_state(&State::new(r, 0.0, 0.0, 0.0, v, 0.0), mu, quarter);
        assert!(state.x().abs() < 1e-6 * r);
        assert!((state.y() - r).abs() < 1e-6 * r);
        assert!((state.x_dot() + v).abs() < 1e-9 * v);
    }
}

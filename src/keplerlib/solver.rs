//! Newton-Raphson root finding for Kepler's equation
//!
//! [`NewtonRaphson`] is a small, configurable scalar root finder. It is used
//! through the [`KeplerSolver`] trait so that propagators can be handed a
//! different strategy (or a differently tuned one) without knowing anything
//! about the iteration itself.

use std::f64::consts::PI;

use crate::constants::{DEFAULT_KEPLER_MAX_ITERATIONS, DEFAULT_KEPLER_TOLERANCE};
use crate::errors::{KeplerError, Result};

use super::universal::UniversalKepler;
use super::{reduce_angle, sinh_minus_x, x_minus_sin};

/// Eccentricity above which the elliptic iteration starts from E₀ = π
const HIGH_ECCENTRICITY: f64 = 0.8;

/// Relative step size below which an iteration has stopped moving
const STEP_RESOLUTION: f64 = 4.0 * f64::EPSILON;

/// Strategy for solving Kepler's equation
pub trait KeplerSolver {
    /// Eccentric anomaly E with `M = E − e·sin(E)`, for 0 ≤ e < 1
    fn eccentric_anomaly(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64>;

    /// Hyperbolic anomaly H with `M = e·sinh(H) − H`, for e > 1
    fn hyperbolic_anomaly(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64>;

    /// Universal anomaly χ reached after `elapsed` on the orbit of `kepler`
    fn universal_anomaly(&self, kepler: &UniversalKepler, elapsed: f64) -> Result<f64>;
}

impl<T: KeplerSolver + ?Sized> KeplerSolver for &T {
    fn eccentric_anomaly(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
        (**self).eccentric_anomaly(mean_anomaly, eccentricity)
    }

    fn hyperbolic_anomaly(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
        (**self).hyperbolic_anomaly(mean_anomaly, eccentricity)
    }

    fn universal_anomaly(&self, kepler: &UniversalKepler, elapsed: f64) -> Result<f64> {
        (**self).universal_anomaly(kepler, elapsed)
    }
}

/// Configuration for [`NewtonRaphson`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonRaphsonConfig {
    /// Iteration stops once `|f(x)|` drops below this value
    ///
    /// The Kepler equations scale it by the size of their right-hand side,
    /// |M| or |Δt|, so it acts as a relative tolerance there.
    pub tolerance: f64,
    /// Maximum number of Newton steps before giving up
    pub max_iterations: usize,
}

impl Default for NewtonRaphsonConfig {
    fn default() -> Self {
        NewtonRaphsonConfig {
            tolerance: DEFAULT_KEPLER_TOLERANCE,
            max_iterations: DEFAULT_KEPLER_MAX_ITERATIONS,
        }
    }
}

/// A converged root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// Abscissa of the root
    pub value: f64,
    /// Number of Newton steps taken
    pub iterations: usize,
    /// `|f(value)|`
    pub residual: f64,
}

/// Newton-Raphson root finder
#[derive(Debug, Clone, Default)]
pub struct NewtonRaphson {
    config: NewtonRaphsonConfig,
}

impl NewtonRaphson {
    pub fn new(config: NewtonRaphsonConfig) -> Self {
        NewtonRaphson { config }
    }

    pub fn config(&self) -> &NewtonRaphsonConfig {
        &self.config
    }

    /// Find a root of `f` starting from `initial_guess`
    ///
    /// Iterates `x ← x − f(x)/f'(x)` until `|f(x)| < tolerance`, or until the
    /// step falls below the floating-point resolution of x. Running out of
    /// iterations, hitting a zero derivative or producing a non-finite
    /// iterate all yield [`KeplerError::Convergence`] carrying the last
    /// iterate and its residual.
    pub fn find_root<F, D>(&self, f: F, df: D, initial_guess: f64) -> Result<Root>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        self.iterate(f, df, initial_guess, self.config.tolerance)
    }

    fn iterate<F, D>(&self, f: F, df: D, initial_guess: f64, tolerance: f64) -> Result<Root>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let mut x = initial_guess;
        let mut residual = f(x);
        let mut iterations = 0;

        while residual.is_finite() && x.is_finite() {
            if residual.abs() < tolerance {
                return Ok(Root {
                    value: x,
                    iterations,
                    residual: residual.abs(),
                });
            }
            if iterations == self.config.max_iterations {
                break;
            }

            let slope = df(x);
            if slope == 0.0 || !slope.is_finite() {
                break;
            }
            let step = residual / slope;
            x -= step;
            residual = f(x);
            iterations += 1;

            if step.abs() <= STEP_RESOLUTION * x.abs() && residual.is_finite() {
                return Ok(Root {
                    value: x,
                    iterations,
                    residual: residual.abs(),
                });
            }
        }

        Err(KeplerError::Convergence {
            iterations,
            last_iterate: x,
            residual: residual.abs(),
        })
    }

    /// Newton iteration for an increasing `f`, kept inside `bracket`
    ///
    /// `f(lower) ≤ 0 ≤ f(upper)` must hold. Each evaluation shrinks the
    /// bracket; a Newton step that would leave it is replaced by bisection.
    /// A NaN residual is taken to lie on the far side of zero, where the
    /// function overflowed.
    fn iterate_bracketed<F, D>(
        &self,
        f: F,
        df: D,
        bracket: (f64, f64),
        initial_guess: f64,
        tolerance: f64,
    ) -> Result<Root>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let (mut lower, mut upper) = bracket;
        let mut x = if initial_guess > lower && initial_guess < upper {
            initial_guess
        } else {
            0.5 * (lower + upper)
        };
        let mut residual = f(x);
        let mut iterations = 0;

        loop {
            if residual.abs() < tolerance {
                return Ok(Root {
                    value: x,
                    iterations,
                    residual: residual.abs(),
                });
            }
            if iterations == self.config.max_iterations {
                break;
            }

            let above = if residual.is_nan() { x > 0.0 } else { residual > 0.0 };
            if above {
                upper = x;
            } else {
                lower = x;
            }

            let newton = x - residual / df(x);
            let next = if newton > lower && newton < upper {
                newton
            } else {
                0.5 * (lower + upper)
            };
            let step = next - x;
            x = next;
            residual = f(x);
            iterations += 1;

            if step.abs() <= STEP_RESOLUTION * x.abs() && residual.is_finite() {
                return Ok(Root {
                    value: x,
                    iterations,
                    residual: residual.abs(),
                });
            }
        }

        Err(KeplerError::Convergence {
            iterations,
            last_iterate: x,
            residual: residual.abs(),
        })
    }
}

impl KeplerSolver for NewtonRaphson {
    fn eccentric_anomaly(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
        if !mean_anomaly.is_finite() {
            return Err(KeplerError::Configuration(format!(
                "mean anomaly must be finite, got {mean_anomaly}"
            )));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(KeplerError::Configuration(format!(
                "elliptic Kepler equation needs 0 <= e < 1, got {eccentricity}"
            )));
        }
        if eccentricity == 0.0 {
            return Ok(mean_anomaly);
        }

        // Solve on [0, π] and mirror; E − e·sin(E) is odd.
        let reduced = reduce_angle(mean_anomaly);
        let sign = if reduced < 0.0 { -1.0 } else { 1.0 };
        let m = reduced.abs();
        if m == 0.0 {
            return Ok(mean_anomaly - reduced);
        }

        // (1 − e)·E + e·(E − sin E) keeps small M resolved as e → 1.
        let guess = if eccentricity < HIGH_ECCENTRICITY { m } else { PI };
        let root = self.iterate(
            |ea| (1.0 - eccentricity) * ea + eccentricity * x_minus_sin(ea) - m,
            |ea| (1.0 - eccentricity) + 2.0 * eccentricity * (0.5 * ea).sin().powi(2),
            guess,
            self.config.tolerance * m,
        )?;

        // Put back the whole turns stripped by the reduction.
        Ok(sign * root.value + (mean_anomaly - reduced))
    }

    fn hyperbolic_anomaly(&self, mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
        if !mean_anomaly.is_finite() {
            return Err(KeplerError::Configuration(format!(
                "mean anomaly must be finite, got {mean_anomaly}"
            )));
        }
        if !(eccentricity > 1.0 && eccentricity.is_finite()) {
            return Err(KeplerError::Configuration(format!(
                "hyperbolic Kepler equation needs e > 1, got {eccentricity}"
            )));
        }

        if mean_anomaly == 0.0 {
            return Ok(0.0);
        }

        let sign = if mean_anomaly < 0.0 { -1.0 } else { 1.0 };
        let m = mean_anomaly.abs();

        // Log-scaled start keeps near-parabolic cases off the flat part of f.
        let guess = (2.0 * m / eccentricity + 1.8).ln();
        let root = self.iterate(
            |ha| (eccentricity - 1.0) * ha + eccentricity * sinh_minus_x(ha) - m,
            |ha| (eccentricity - 1.0) + 2.0 * eccentricity * (0.5 * ha).sinh().powi(2),
            guess,
            self.config.tolerance * m,
        )?;

        Ok(sign * root.value)
    }

    fn universal_anomaly(&self, kepler: &UniversalKepler, elapsed: f64) -> Result<f64> {
        if !elapsed.is_finite() {
            return Err(KeplerError::Configuration(format!(
                "elapsed time must be finite, got {elapsed}"
            )));
        }
        if elapsed == 0.0 {
            return Ok(0.0);
        }

        let bracket = kepler.bracket(elapsed)?;
        let root = self.iterate_bracketed(
            |chi| kepler.elapsed_at(chi) - elapsed,
            |chi| kepler.radius_at(chi) / kepler.sqrt_mu(),
            bracket,
            kepler.initial_guess(elapsed),
            self.config.tolerance * elapsed.abs(),
        )?;

        Ok(root.value)
    }
}

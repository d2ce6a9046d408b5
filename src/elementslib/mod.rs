//! Classical Keplerian elements and Cartesian conversion
//!
//! [`to_keplerian`] turns a Cartesian [`State`] into [`KeplerianElements`]
//! for a given gravitational parameter, and [`to_cartesian`] goes back. Both
//! directions handle elliptic, parabolic and hyperbolic orbits; the conic is
//! described by its semi-latus rectum `p` so the parabolic case needs no
//! special representation. The semi-major axis is derived from `p` and `e`.
//!
//! Angles are measured in the reference frame of the state: inclination from
//! +z, node from +x. Circular orbits measure the true anomaly from the
//! ascending node (argument of latitude) with ω = 0; equatorial orbits put the
//! node line on +x with Ω = 0.
//!
//! # Example
//!
//! ```
//! use kepler_propagator::constants::GM_EARTH;
//! use kepler_propagator::elementslib::{to_cartesian, to_keplerian, OrbitRegime};
//! use kepler_propagator::State;
//!
//! let state = State::new(6.75e6, 0.0, 0.0, 0.0, 8059.5973215, 0.0);
//! let elements = to_keplerian(&state, GM_EARTH).unwrap();
//! assert_eq!(elements.regime(), OrbitRegime::Elliptic);
//!
//! let back = to_cartesian(&elements, GM_EARTH).unwrap();
//! assert!((back.x() - state.x()).abs() < 1e-6);
//! ```

use nalgebra::Vector3;

use crate::constants::{
    CIRCULAR_ECCENTRICITY, EQUATORIAL_INCLINATION, PARABOLIC_ECCENTRICITY, TAU,
};
use crate::errors::{KeplerError, Result};
use crate::keplerlib::{
    eccentric_to_mean_anomaly, hyperbolic_to_mean_anomaly, true_to_eccentric_anomaly,
    true_to_hyperbolic_anomaly, true_to_parabolic_mean_anomaly,
};
use crate::state::State;

/// Conic section described by the elements, derived from the eccentricity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitRegime {
    /// e below [`CIRCULAR_ECCENTRICITY`]
    Circular,
    /// 0 < e < 1
    Elliptic,
    /// e within [`PARABOLIC_ECCENTRICITY`] of 1
    Parabolic,
    /// e > 1
    Hyperbolic,
}

impl OrbitRegime {
    pub fn from_eccentricity(e: f64) -> Self {
        if (e - 1.0).abs() < PARABOLIC_ECCENTRICITY {
            OrbitRegime::Parabolic
        } else if e > 1.0 {
            OrbitRegime::Hyperbolic
        } else if e < CIRCULAR_ECCENTRICITY {
            OrbitRegime::Circular
        } else {
            OrbitRegime::Elliptic
        }
    }

    /// Circular and elliptic orbits repeat; the others escape
    pub fn is_closed(&self) -> bool {
        matches!(self, OrbitRegime::Circular | OrbitRegime::Elliptic)
    }
}

/// Classical orbital elements
///
/// Lengths share the unit of the state they came from; angles are radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    /// Semi-latus rectum p = h²/μ
    pub semi_latus_rectum: f64,
    /// Eccentricity e ≥ 0
    pub eccentricity: f64,
    /// Inclination i in [0, π]
    pub inclination: f64,
    /// Argument of periapsis ω in [0, 2π)
    pub argument_of_periapsis: f64,
    /// Longitude (right ascension) of the ascending node Ω in [0, 2π)
    pub longitude_of_ascending_node: f64,
    /// True anomaly ν; [0, 2π) for closed orbits, (-π, π] otherwise
    pub true_anomaly: f64,
}

impl KeplerianElements {
    /// Build elements from a semi-major axis
    ///
    /// Parabolic orbits have no finite semi-major axis and are rejected; use
    /// the struct fields with a semi-latus rectum instead. The sign of `a`
    /// must match the regime: positive below e = 1, negative above.
    pub fn from_semi_major_axis(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        argument_of_periapsis: f64,
        longitude_of_ascending_node: f64,
        true_anomaly: f64,
    ) -> Result<Self> {
        let regime = OrbitRegime::from_eccentricity(eccentricity);
        if regime == OrbitRegime::Parabolic {
            return Err(KeplerError::DegenerateOrbit(
                "parabolic orbits have no finite semi-major axis".to_string(),
            ));
        }
        let sign_ok = if regime.is_closed() {
            semi_major_axis > 0.0
        } else {
            semi_major_axis < 0.0
        };
        if !sign_ok || !semi_major_axis.is_finite() {
            return Err(KeplerError::DegenerateOrbit(format!(
                "semi-major axis {semi_major_axis} inconsistent with eccentricity {eccentricity}"
            )));
        }

        let elements = KeplerianElements {
            semi_latus_rectum: semi_major_axis * (1.0 - eccentricity * eccentricity),
            eccentricity,
            inclination,
            argument_of_periapsis,
            longitude_of_ascending_node,
            true_anomaly,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Same orbit, different position along it
    pub fn with_true_anomaly(&self, true_anomaly: f64) -> Self {
        KeplerianElements {
            true_anomaly,
            ..*self
        }
    }

    pub fn regime(&self) -> OrbitRegime {
        OrbitRegime::from_eccentricity(self.eccentricity)
    }

    /// Semi-major axis a = p / (1 − e²); negative for hyperbolic, infinite for parabolic
    pub fn semi_major_axis(&self) -> f64 {
        match self.regime() {
            OrbitRegime::Parabolic => f64::INFINITY,
            _ => {
                let e = self.eccentricity;
                self.semi_latus_rectum / ((1.0 - e) * (1.0 + e))
            }
        }
    }

    /// Periapsis distance q = p / (1 + e)
    pub fn periapsis_distance(&self) -> f64 {
        self.semi_latus_rectum / (1.0 + self.eccentricity)
    }

    /// Apoapsis distance (infinite for open orbits)
    pub fn apoapsis_distance(&self) -> f64 {
        if self.regime().is_closed() {
            self.semi_latus_rectum / (1.0 - self.eccentricity)
        } else {
            f64::INFINITY
        }
    }

    /// Rate of change of the mean anomaly
    ///
    /// `sqrt(μ/|a|³)` for elliptic and hyperbolic orbits; for parabolic
    /// orbits the rate of Barker's mean anomaly, `2·sqrt(μ/p³)`.
    pub fn mean_motion(&self, mu: f64) -> f64 {
        match self.regime() {
            OrbitRegime::Parabolic => 2.0 * (mu / self.semi_latus_rectum.powi(3)).sqrt(),
            _ => (mu / self.semi_major_axis().abs().powi(3)).sqrt(),
        }
    }

    /// Orbital period `2π/n`, `None` for open orbits
    pub fn period(&self, mu: f64) -> Option<f64> {
        if self.regime().is_closed() {
            Some(TAU / self.mean_motion(mu))
        } else {
            None
        }
    }

    /// Mean anomaly at the current true anomaly
    ///
    /// [0, 2π) for closed orbits; signed for open ones (Barker's form when
    /// parabolic).
    pub fn mean_anomaly(&self) -> f64 {
        let e = self.eccentricity;
        let nu = self.true_anomaly;
        match self.regime() {
            OrbitRegime::Circular | OrbitRegime::Elliptic => {
                eccentric_to_mean_anomaly(e, true_to_eccentric_anomaly(e, nu)).rem_euclid(TAU)
            }
            OrbitRegime::Hyperbolic => {
                hyperbolic_to_mean_anomaly(e, true_to_hyperbolic_anomaly(e, nu))
            }
            OrbitRegime::Parabolic => true_to_parabolic_mean_anomaly(nu),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.semi_latus_rectum > 0.0 && self.semi_latus_rectum.is_finite()) {
            return Err(KeplerError::DegenerateOrbit(format!(
                "semi-latus rectum must be positive, got {}",
                self.semi_latus_rectum
            )));
        }
        if !(self.eccentricity >= 0.0 && self.eccentricity.is_finite()) {
            return Err(KeplerError::DegenerateOrbit(format!(
                "eccentricity must be non-negative, got {}",
                self.eccentricity
            )));
        }
        let angles = [
            self.inclination,
            self.argument_of_periapsis,
            self.longitude_of_ascending_node,
            self.true_anomaly,
        ];
        if angles.iter().any(|a| !a.is_finite()) {
            return Err(KeplerError::DegenerateOrbit(
                "orbital angles must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KeplerianElements(p={:.3}, e={:.6}, i={:.4}°, ω={:.4}°, Ω={:.4}°, ν={:.4}°)",
            self.semi_latus_rectum,
            self.eccentricity,
            self.inclination.to_degrees(),
            self.argument_of_periapsis.to_degrees(),
            self.longitude_of_ascending_node.to_degrees(),
            self.true_anomaly.to_degrees(),
        )
    }
}

pub(crate) fn validate_gravitational_parameter(mu: f64) -> Result<()> {
    if mu > 0.0 && mu.is_finite() {
        Ok(())
    } else {
        Err(KeplerError::Configuration(format!(
            "gravitational parameter must be positive and finite, got {mu}"
        )))
    }
}

/// Convert a Cartesian state to Keplerian elements
///
/// Fails with [`KeplerError::DegenerateOrbit`] for a zero position, a zero
/// velocity, or parallel position and velocity (rectilinear motion), and
/// with [`KeplerError::Configuration`] for a non-positive μ.
pub fn to_keplerian(state: &State, mu: f64) -> Result<KeplerianElements> {
    validate_gravitational_parameter(mu)?;
    if !state.is_finite() {
        return Err(KeplerError::DegenerateOrbit(format!(
            "state has non-finite components: {state}"
        )));
    }

    let pos = state.position();
    let vel = state.velocity();
    let r = pos.norm();
    let v = vel.norm();
    if r == 0.0 {
        return Err(KeplerError::DegenerateOrbit("zero position vector".to_string()));
    }
    if v == 0.0 {
        return Err(KeplerError::DegenerateOrbit("zero velocity vector".to_string()));
    }

    let h_vec = pos.cross(&vel);
    let h = h_vec.norm();
    if h <= f64::EPSILON * r * v {
        return Err(KeplerError::DegenerateOrbit(
            "zero angular momentum (rectilinear orbit)".to_string(),
        ));
    }
    let h_hat = h_vec / h;

    let e_vec = eccentricity_vector(&pos, &vel, mu);
    let e = e_vec.norm();

    let inclination = h_vec.x.hypot(h_vec.y).atan2(h_vec.z);

    // k × h = [-h_y, h_x, 0]
    let node = Vector3::new(-h_vec.y, h_vec.x, 0.0);
    let node_len = node.norm();
    let node_hat = if node_len > EQUATORIAL_INCLINATION * h {
        node / node_len
    } else {
        Vector3::x()
    };
    let longitude_of_ascending_node = node_hat.y.atan2(node_hat.x).rem_euclid(TAU);

    let (argument_of_periapsis, true_anomaly) = if e < CIRCULAR_ECCENTRICITY {
        (0.0, signed_angle(&node_hat, &pos, &h_hat))
    } else {
        let e_hat = e_vec / e;
        let omega = signed_angle(&node_hat, &e_hat, &h_hat);
        // cos ν from e·r, |sin ν| from |e × r|, sign from r·v.
        let sin_nu = e_hat.cross(&pos).norm().copysign(pos.dot(&vel));
        (omega, sin_nu.atan2(e_hat.dot(&pos)))
    };

    let true_anomaly = if OrbitRegime::from_eccentricity(e).is_closed() {
        true_anomaly.rem_euclid(TAU)
    } else {
        true_anomaly
    };

    Ok(KeplerianElements {
        semi_latus_rectum: h * h / mu,
        eccentricity: e,
        inclination,
        argument_of_periapsis,
        longitude_of_ascending_node,
        true_anomaly,
    })
}

/// Convert Keplerian elements to a Cartesian state
///
/// Based on CCAR equations:
/// <https://web.archive.org/web/*/http://ccar.colorado.edu/asen5070/handouts/kep2cart_2002.doc>
///
/// A hyperbolic true anomaly on or beyond the asymptote (`1 + e·cos ν ≤ 0`)
/// is rejected as [`KeplerError::DegenerateOrbit`].
pub fn to_cartesian(elements: &KeplerianElements, mu: f64) -> Result<State> {
    validate_gravitational_parameter(mu)?;
    elements.validate()?;

    let p = elements.semi_latus_rectum;
    let e = elements.eccentricity;
    let i = elements.inclination;
    let om = elements.longitude_of_ascending_node;
    let w = elements.argument_of_periapsis;
    let v = elements.true_anomaly;

    let denom = 1.0 + e * v.cos();
    if denom <= 0.0 {
        return Err(KeplerError::DegenerateOrbit(format!(
            "true anomaly {v} lies beyond the asymptote of an e = {e} orbit"
        )));
    }

    let r = p / denom;
    let h = (p * mu).sqrt();
    let u = v + w;

    let (sin_om, cos_om) = om.sin_cos();
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_i, cos_i) = i.sin_cos();

    let x = r * (cos_om * cos_u - sin_om * sin_u * cos_i);
    let y = r * (sin_om * cos_u + cos_om * sin_u * cos_i);
    let z = r * (sin_i * sin_u);

    let he_rp = h * e / (r * p) * v.sin();
    let h_r = h / r;

    let x_dot = x * he_rp - h_r * (cos_om * sin_u + sin_om * cos_u * cos_i);
    let y_dot = y * he_rp - h_r * (sin_om * sin_u - cos_om * cos_u * cos_i);
    let z_dot = z * he_rp + h_r * sin_i * cos_u;

    Ok(State::new(x, y, z, x_dot, y_dot, z_dot))
}

/// Eccentricity vector from state vectors
fn eccentricity_vector(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Vector3<f64> {
    let r = pos.norm();
    let v_sq = vel.norm_squared();
    ((v_sq - mu / r) * pos - pos.dot(vel) * vel) / mu
}

/// Angle from `from` to `to` measured counter-clockwise about `axis`, in [0, 2π)
fn signed_angle(from: &Vector3<f64>, to: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    axis.dot(&from.cross(to))
        .atan2(from.dot(to))
        .rem_euclid(TAU)
}

//! Closed-form two-body propagation
//!
//! [`KeplerPropagator`] advances a body's Cartesian state by an elapsed time
//! without integrating any differential equation: the state is converted to
//! Keplerian elements, the mean anomaly is advanced linearly, Kepler's
//! equation is solved for the new anomaly and the elements are converted
//! back. Only the true anomaly changes; p, e, i, ω and Ω are carried over.
//!
//! Within [`NEAR_PARABOLIC_ECCENTRICITY`] of e = 1 (but outside the
//! parabolic band itself) the mean anomaly loses its precision, so those
//! orbits are advanced through the universal anomaly instead, directly from
//! the Cartesian state.
//!
//! Bodies are associated with a [`CentralBody`] by [`BodyId`]. The
//! association is a lookup table owned by the propagator, so bodies and
//! central bodies never reference each other.
//!
//! # Example
//!
//! ```
//! use kepler_propagator::constants::GM_EARTH;
//! use kepler_propagator::propagator::{Body, BodyId, CentralBody, KeplerPropagator};
//! use kepler_propagator::State;
//!
//! let asterix = Body::new(
//!     BodyId::new(0),
//!     "Asterix",
//!     State::new(6.75e6, 0.0, 0.0, 0.0, 8059.5973215, 0.0),
//! );
//!
//! let mut propagator = KeplerPropagator::default();
//! propagator.set_central_body(asterix.id(), CentralBody::new("Earth", GM_EARTH).unwrap());
//!
//! let later = propagator.propagate(&asterix, 3600.0).unwrap();
//! assert!(later.position().norm() > 6.75e6);
//! ```

use std::collections::HashMap;

use crate::constants::{NEAR_PARABOLIC_ECCENTRICITY, TAU};
use crate::elementslib::{
    to_cartesian, to_keplerian, validate_gravitational_parameter, KeplerianElements,
    OrbitRegime,
};
use crate::errors::{KeplerError, Result};
use crate::keplerlib::{
    eccentric_to_mean_anomaly, eccentric_to_true_anomaly, hyperbolic_to_mean_anomaly,
    hyperbolic_to_true_anomaly, parabolic_mean_to_true_anomaly, true_to_eccentric_anomaly,
    reduce_angle, true_to_hyperbolic_anomaly, true_to_parabolic_mean_anomaly, KeplerSolver,
    NewtonRaphson, UniversalKepler,
};
use crate::state::State;

/// Handle identifying a propagated body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(usize);

impl BodyId {
    pub fn new(index: usize) -> Self {
        BodyId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body #{}", self.0)
    }
}

/// A propagated body: an identity and its current state
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    id: BodyId,
    name: String,
    state: State,
}

impl Body {
    pub fn new(id: BodyId, name: &str, state: State) -> Self {
        Body {
            id,
            name: name.to_string(),
            state,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// The attracting body of a two-body problem
#[derive(Debug, Clone, PartialEq)]
pub struct CentralBody {
    name: String,
    gravitational_parameter: f64,
}

impl CentralBody {
    /// Create a central body; μ must be positive and finite
    pub fn new(name: &str, gravitational_parameter: f64) -> Result<Self> {
        validate_gravitational_parameter(gravitational_parameter)?;
        Ok(CentralBody {
            name: name.to_string(),
            gravitational_parameter,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// μ = G·M in the caller's length³/time² unit
    pub fn gravitational_parameter(&self) -> f64 {
        self.gravitational_parameter
    }
}

/// Single-step Kepler propagator with an injected Kepler equation solver
#[derive(Debug, Clone)]
pub struct KeplerPropagator<S: KeplerSolver = NewtonRaphson> {
    solver: S,
    central_bodies: HashMap<BodyId, CentralBody>,
}

impl Default for KeplerPropagator<NewtonRaphson> {
    fn default() -> Self {
        Self::new(NewtonRaphson::default())
    }
}

impl<S: KeplerSolver> KeplerPropagator<S> {
    pub fn new(solver: S) -> Self {
        KeplerPropagator {
            solver,
            central_bodies: HashMap::new(),
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Associate a body with its central body, returning any previous association
    pub fn set_central_body(&mut self, body: BodyId, central: CentralBody) -> Option<CentralBody> {
        self.central_bodies.insert(body, central)
    }

    pub fn central_body(&self, body: BodyId) -> Option<&CentralBody> {
        self.central_bodies.get(&body)
    }

    /// State of `body` after `elapsed` time units
    ///
    /// The body itself is left untouched. Fails with
    /// [`KeplerError::Configuration`] when no central body has been
    /// associated with it.
    pub fn propagate(&self, body: &Body, elapsed: f64) -> Result<State> {
        let central = self.central_body(body.id()).ok_or_else(|| {
            KeplerError::Configuration(format!("no central body associated with {body}"))
        })?;
        self.propagate_state(body.state(), central, elapsed)
    }

    /// State after `elapsed` time units around an explicit central body
    pub fn propagate_state(
        &self,
        state: &State,
        central: &CentralBody,
        elapsed: f64,
    ) -> Result<State> {
        propagate_kepler(&self.solver, state, central.gravitational_parameter(), elapsed)
    }
}

/// Propagate a Cartesian state by `elapsed` around a central body with parameter `mu`
///
/// Negative elapsed times propagate backwards. A zero elapsed time returns
/// the input state unchanged (after checking that it describes an orbit).
pub fn propagate_kepler<S: KeplerSolver + ?Sized>(
    solver: &S,
    state: &State,
    mu: f64,
    elapsed: f64,
) -> Result<State> {
    if !elapsed.is_finite() {
        return Err(KeplerError::Configuration(format!(
            "elapsed time must be finite, got {elapsed}"
        )));
    }

    let elements = to_keplerian(state, mu)?;
    if elapsed == 0.0 {
        return Ok(*state);
    }

    if is_near_parabolic(&elements) {
        let kepler = UniversalKepler::new(state, mu);
        let chi = solver.universal_anomaly(&kepler, elapsed)?;
        return Ok(kepler.propagate(state, chi, elapsed));
    }

    let true_anomaly = advance_true_anomaly(solver, &elements, mu, elapsed)?;
    to_cartesian(&elements.with_true_anomaly(true_anomaly), mu)
}

fn is_near_parabolic(elements: &KeplerianElements) -> bool {
    elements.regime() != OrbitRegime::Parabolic
        && (elements.eccentricity - 1.0).abs() < NEAR_PARABOLIC_ECCENTRICITY
}

/// True anomaly reached after `elapsed`, from the mean anomaly advanced at the mean motion
fn advance_true_anomaly<S: KeplerSolver + ?Sized>(
    solver: &S,
    elements: &KeplerianElements,
    mu: f64,
    elapsed: f64,
) -> Result<f64> {
    let e = elements.eccentricity;
    let nu = elements.true_anomaly;
    let n = elements.mean_motion(mu);

    match elements.regime() {
        OrbitRegime::Circular | OrbitRegime::Elliptic => {
            let m0 = eccentric_to_mean_anomaly(e, true_to_eccentric_anomaly(e, nu));
            let ea = solver.eccentric_anomaly(reduce_angle(m0 + n * elapsed), e)?;
            Ok(eccentric_to_true_anomaly(e, ea).rem_euclid(TAU))
        }
        OrbitRegime::Hyperbolic => {
            let m0 = hyperbolic_to_mean_anomaly(e, true_to_hyperbolic_anomaly(e, nu));
            let ha = solver.hyperbolic_anomaly(m0 + n * elapsed, e)?;
            Ok(hyperbolic_to_true_anomaly(e, ha))
        }
        OrbitRegime::Parabolic => {
            let m0 = true_to_parabolic_mean_anomaly(nu);
            Ok(parabolic_mean_to_true_anomaly(m0 + n * elapsed))
        }
    }
}

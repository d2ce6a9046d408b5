//! Closed-form two-body propagation
//!
//! Analytic Kepler propagation of point masses around a central body, and a
//! driver that samples the motion at fixed output intervals.
//!
//! - [`elementslib`]: Cartesian ↔ Keplerian element conversion
//! - [`keplerlib`]: Kepler's equation, anomaly conversions, the universal
//!   anomaly for near-parabolic orbits and the Newton-Raphson solver
//! - [`propagator`]: single-step propagation of a body by an elapsed time
//! - [`serieslib`]: fixed-interval sampling into per-body histories
//! - [`benchmark`]: reference trajectory files and comparison
//! - [`units`]: km ↔ m conversion of states and histories
//!
//! # Example
//!
//! ```
//! use kepler_propagator::constants::GM_EARTH;
//! use kepler_propagator::{CentralBody, SeriesConfig, SeriesPropagator, State};
//!
//! let mut series = SeriesPropagator::default();
//! let id = series
//!     .add_body("Asterix", State::new(6.75e6, 0.0, 0.0, 0.0, 8059.5973215, 0.0))
//!     .unwrap();
//! series.set_central_body(id, CentralBody::new("Earth", GM_EARTH).unwrap()).unwrap();
//! series
//!     .configure(SeriesConfig { start: 0.0, end: 7200.0, output_interval: 3600.0 })
//!     .unwrap();
//! series.execute().unwrap();
//!
//! for (t, state) in series.history(id).unwrap().iter() {
//!     println!("{t:>8} {state}");
//! }
//! ```

pub mod benchmark;
pub mod constants;
pub mod elementslib;
pub mod errors;
pub mod keplerlib;
pub mod propagator;
pub mod serieslib;
pub mod state;
pub mod units;

pub use elementslib::{to_cartesian, to_keplerian, KeplerianElements, OrbitRegime};
pub use errors::{KeplerError, Result};
pub use keplerlib::{KeplerSolver, NewtonRaphson, NewtonRaphsonConfig};
pub use propagator::{Body, BodyId, CentralBody, KeplerPropagator};
pub use serieslib::{PropagationHistory, SeriesConfig, SeriesPhase, SeriesPropagator};
pub use state::State;

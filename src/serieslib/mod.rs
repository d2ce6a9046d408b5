//! Fixed-interval series propagation
//!
//! A [`SeriesPropagator`] owns a set of bodies, samples each of them at
//! `t_k = start + k·interval` for every `t_k ≤ end` and records the states in
//! a [`PropagationHistory`] per body.
//!
//! The driver is a small state machine:
//!
//! - **Configured**: bodies, central bodies and the time grid may be changed.
//! - **Running**: [`SeriesPropagator::execute`] is sampling.
//! - **Completed**: histories are readable; nothing may be changed until
//!   [`SeriesPropagator::reset`].
//!
//! # Example
//!
//! ```
//! use kepler_propagator::constants::GM_EARTH;
//! use kepler_propagator::propagator::CentralBody;
//! use kepler_propagator::serieslib::{SeriesConfig, SeriesPropagator};
//! use kepler_propagator::State;
//!
//! let mut series = SeriesPropagator::default();
//! let asterix = series
//!     .add_body("Asterix", State::new(6.75e6, 0.0, 0.0, 0.0, 8059.5973215, 0.0))
//!     .unwrap();
//! series
//!     .set_central_body(asterix, CentralBody::new("Earth", GM_EARTH).unwrap())
//!     .unwrap();
//! series
//!     .configure(SeriesConfig { start: 0.0, end: 86400.0, output_interval: 3600.0 })
//!     .unwrap();
//!
//! series.execute().unwrap();
//! assert_eq!(series.history(asterix).unwrap().len(), 25);
//! ```

pub mod history;

pub use history::PropagationHistory;

use tracing::{debug, info, trace, warn};

use crate::errors::{KeplerError, Result};
use crate::keplerlib::{KeplerSolver, NewtonRaphson};
use crate::propagator::{Body, BodyId, CentralBody, KeplerPropagator};
use crate::state::State;

/// Upper bound on the samples a single series may produce per body
pub const MAX_SERIES_SAMPLES: usize = 100_000_000;

/// Lifecycle phase of a [`SeriesPropagator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPhase {
    Configured,
    Running,
    Completed,
}

impl std::fmt::Display for SeriesPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeriesPhase::Configured => "configured",
            SeriesPhase::Running => "running",
            SeriesPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Time grid of a series propagation
///
/// All values share the time unit of the gravitational parameters (seconds
/// in SI). The default grid is all zeros and fails validation until an
/// output interval is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesConfig {
    /// Epoch of the initial states
    pub start: f64,
    /// Last epoch that may be sampled
    pub end: f64,
    /// Spacing between samples
    pub output_interval: f64,
}

impl SeriesConfig {
    /// Check the grid: `0 ≤ start ≤ end`, all finite, positive interval
    pub fn validate(&self) -> Result<()> {
        if !(self.start.is_finite() && self.start >= 0.0) {
            return Err(KeplerError::Configuration(format!(
                "start time must be finite and non-negative, got {}",
                self.start
            )));
        }
        if !self.end.is_finite() || self.end < self.start {
            return Err(KeplerError::Configuration(format!(
                "end time {} precedes start time {}",
                self.end, self.start
            )));
        }
        if !(self.output_interval.is_finite() && self.output_interval > 0.0) {
            return Err(KeplerError::Configuration(format!(
                "output interval must be positive, got {}",
                self.output_interval
            )));
        }
        Ok(())
    }

    /// Epoch of sample `k`; computed directly, never accumulated
    pub fn epoch(&self, k: usize) -> f64 {
        self.start + k as f64 * self.output_interval
    }

    /// Number of epochs `t_k ≤ end`
    ///
    /// Fails with [`KeplerError::Configuration`] when the grid is too large or
    /// when the interval is too small to separate consecutive epochs at the
    /// magnitude of `start`.
    pub fn sample_count(&self) -> Result<usize> {
        self.validate()?;
        let span = (self.end - self.start) / self.output_interval;
        if span >= MAX_SERIES_SAMPLES as f64 {
            return Err(KeplerError::Configuration(format!(
                "series would produce more than {MAX_SERIES_SAMPLES} samples"
            )));
        }
        if self.start + self.output_interval == self.start {
            return Err(KeplerError::Configuration(format!(
                "output interval {} is below the resolution of start time {}",
                self.output_interval, self.start
            )));
        }

        // floor() can land one off either way once the division rounds.
        let mut count = span.floor() as usize + 1;
        if count > 1 && self.epoch(count - 1) > self.end {
            count -= 1;
        } else if self.epoch(count) <= self.end {
            count += 1;
        }

        for k in 1..count {
            if self.epoch(k) <= self.epoch(k - 1) {
                return Err(KeplerError::Configuration(format!(
                    "epochs {} and {} coincide at t = {}",
                    k - 1,
                    k,
                    self.epoch(k)
                )));
            }
        }
        Ok(count)
    }
}

#[derive(Debug, Clone)]
struct RegisteredBody {
    body: Body,
    initial_state: State,
    history: PropagationHistory,
}

/// Samples registered bodies at fixed output intervals
#[derive(Debug, Clone)]
pub struct SeriesPropagator<S: KeplerSolver = NewtonRaphson> {
    propagator: KeplerPropagator<S>,
    config: SeriesConfig,
    bodies: Vec<RegisteredBody>,
    phase: SeriesPhase,
}

impl Default for SeriesPropagator<NewtonRaphson> {
    fn default() -> Self {
        Self::new(NewtonRaphson::default())
    }
}

impl<S: KeplerSolver> SeriesPropagator<S> {
    pub fn new(solver: S) -> Self {
        SeriesPropagator {
            propagator: KeplerPropagator::new(solver),
            config: SeriesConfig::default(),
            bodies: Vec::new(),
            phase: SeriesPhase::Configured,
        }
    }

    /// Register a body with its state at the start epoch
    pub fn add_body(&mut self, name: &str, initial_state: State) -> Result<BodyId> {
        self.ensure_configurable()?;
        let id = BodyId::new(self.bodies.len());
        debug!("Registered {} as {}: {}", name, id, initial_state);
        self.bodies.push(RegisteredBody {
            body: Body::new(id, name, initial_state),
            initial_state,
            history: PropagationHistory::new(),
        });
        Ok(id)
    }

    pub fn set_initial_state(&mut self, id: BodyId, state: State) -> Result<()> {
        self.ensure_configurable()?;
        let registered = self.registered_mut(id)?;
        registered.initial_state = state;
        registered.body.set_state(state);
        Ok(())
    }

    pub fn set_central_body(&mut self, id: BodyId, central: CentralBody) -> Result<()> {
        self.ensure_configurable()?;
        self.registered(id)?;
        debug!("{} orbits {}", id, central.name());
        self.propagator.set_central_body(id, central);
        Ok(())
    }

    pub fn set_start(&mut self, start: f64) -> Result<()> {
        self.ensure_configurable()?;
        self.config.start = start;
        Ok(())
    }

    pub fn set_end(&mut self, end: f64) -> Result<()> {
        self.ensure_configurable()?;
        self.config.end = end;
        Ok(())
    }

    pub fn set_output_interval(&mut self, interval: f64) -> Result<()> {
        self.ensure_configurable()?;
        self.config.output_interval = interval;
        Ok(())
    }

    /// Replace the whole time grid; validated at [`execute`](Self::execute)
    pub fn configure(&mut self, config: SeriesConfig) -> Result<()> {
        self.ensure_configurable()?;
        self.config = config;
        Ok(())
    }

    pub fn start(&self) -> f64 {
        self.config.start
    }

    pub fn end(&self) -> f64 {
        self.config.end
    }

    pub fn output_interval(&self) -> f64 {
        self.config.output_interval
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub fn phase(&self) -> SeriesPhase {
        self.phase
    }

    pub fn propagator(&self) -> &KeplerPropagator<S> {
        &self.propagator
    }

    /// A registered body; once completed its state is the last sampled one
    pub fn body(&self, id: BodyId) -> Result<&Body> {
        self.registered(id).map(|registered| &registered.body)
    }

    /// Identifiers in registration order
    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.iter().map(|registered| registered.body.id())
    }

    /// Sample every body over the configured grid
    ///
    /// The grid and the central-body associations are checked before any
    /// sample is taken; a failure there leaves the propagator configured.
    /// Once sampling starts, a body whose propagation fails keeps the samples
    /// taken so far and the remaining bodies still run. The first such error
    /// is returned and the propagator ends up completed either way.
    pub fn execute(&mut self) -> Result<()> {
        if self.phase != SeriesPhase::Configured {
            return Err(KeplerError::InvalidState(format!(
                "execute called while {}; reset first",
                self.phase
            )));
        }

        let samples = self.config.sample_count()?;
        for registered in &self.bodies {
            let id = registered.body.id();
            if self.propagator.central_body(id).is_none() {
                return Err(KeplerError::Configuration(format!(
                    "no central body associated with {}",
                    registered.body
                )));
            }
        }

        self.phase = SeriesPhase::Running;
        debug!(
            "Propagating {} bodies over {} samples ({} to {} every {})",
            self.bodies.len(),
            samples,
            self.config.start,
            self.config.end,
            self.config.output_interval
        );

        let mut first_error = None;
        for registered in &mut self.bodies {
            registered.body.set_state(registered.initial_state);
            registered.history = PropagationHistory::with_capacity(samples);

            if let Err(err) = sample_body(&self.propagator, &self.config, samples, registered) {
                warn!(
                    "Propagation of {} stopped after {} samples: {}",
                    registered.body,
                    registered.history.len(),
                    err
                );
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        self.phase = SeriesPhase::Completed;
        info!("Series propagation completed for {} bodies", self.bodies.len());

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Sampled states of a body, available once completed
    pub fn history_at_fixed_intervals(&self, id: BodyId) -> Result<&PropagationHistory> {
        if self.phase != SeriesPhase::Completed {
            return Err(KeplerError::InvalidState(format!(
                "history requested while {}",
                self.phase
            )));
        }
        self.registered(id).map(|registered| &registered.history)
    }

    /// Alias of [`history_at_fixed_intervals`](Self::history_at_fixed_intervals)
    pub fn history(&self, id: BodyId) -> Result<&PropagationHistory> {
        self.history_at_fixed_intervals(id)
    }

    /// Discard histories and return to the configured phase
    ///
    /// Bodies go back to their initial states; registrations, central bodies
    /// and the time grid are kept.
    pub fn reset(&mut self) {
        for registered in &mut self.bodies {
            registered.body.set_state(registered.initial_state);
            registered.history = PropagationHistory::new();
        }
        self.phase = SeriesPhase::Configured;
    }

    fn ensure_configurable(&self) -> Result<()> {
        if self.phase == SeriesPhase::Configured {
            Ok(())
        } else {
            Err(KeplerError::InvalidState(format!(
                "cannot reconfigure while {}; reset first",
                self.phase
            )))
        }
    }

    fn registered(&self, id: BodyId) -> Result<&RegisteredBody> {
        self.bodies
            .get(id.index())
            .ok_or(KeplerError::UnknownBody(id))
    }

    fn registered_mut(&mut self, id: BodyId) -> Result<&mut RegisteredBody> {
        self.bodies
            .get_mut(id.index())
            .ok_or(KeplerError::UnknownBody(id))
    }
}

/// Step one body through the grid, committing each sample as its current state
fn sample_body<S: KeplerSolver>(
    propagator: &KeplerPropagator<S>,
    config: &SeriesConfig,
    samples: usize,
    registered: &mut RegisteredBody,
) -> Result<()> {
    let mut last_epoch = config.start;
    for k in 0..samples {
        let epoch = config.epoch(k);
        let state = propagator.propagate(&registered.body, epoch - last_epoch)?;
        if registered.history.insert(epoch, state)?.is_some() {
            return Err(KeplerError::InvalidState(format!(
                "{} already has a sample at t = {}",
                registered.body, epoch
            )));
        }
        registered.body.set_state(state);
        last_epoch = epoch;
        trace!("{} at t={}: {}", registered.body, epoch, state);
    }
    Ok(())
}

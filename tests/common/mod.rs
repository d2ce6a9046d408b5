//! Shared utilities for the propagation integration tests.

#![allow(dead_code)]

pub mod reference;

use kepler_propagator::State;

/// Asterix initial state around Earth, meters and m/s
pub fn asterix_initial_state() -> State {
    State::new(6.75e6, 0.0, 0.0, 0.0, 8059.5973215, 0.0)
}

//! Cartesian state vectors
//!
//! A [`State`] is the six-component kinematic vector (x, y, z, ẋ, ẏ, ż) the
//! propagators work on. The unit system is whatever the caller uses
//! consistently with the gravitational parameter; the crate's own tests and
//! demos use meters and seconds.

use std::ops::{Index, IndexMut};

use nalgebra::{Vector3, Vector6};

/// Number of components in a Cartesian state
pub const STATE_DIMENSION: usize = 6;

/// Cartesian position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    components: Vector6<f64>,
}

impl State {
    /// Create a state from its six components
    pub fn new(x: f64, y: f64, z: f64, x_dot: f64, y_dot: f64, z_dot: f64) -> Self {
        State {
            components: Vector6::new(x, y, z, x_dot, y_dot, z_dot),
        }
    }

    /// Create a state from separate position and velocity vectors
    pub fn from_position_velocity(position: &Vector3<f64>, velocity: &Vector3<f64>) -> Self {
        Self::new(
            position.x, position.y, position.z, velocity.x, velocity.y, velocity.z,
        )
    }

    /// The all-zero state
    pub fn zeros() -> Self {
        State {
            components: Vector6::zeros(),
        }
    }

    pub fn x(&self) -> f64 {
        self.components[0]
    }

    pub fn y(&self) -> f64 {
        self.components[1]
    }

    pub fn z(&self) -> f64 {
        self.components[2]
    }

    pub fn x_dot(&self) -> f64 {
        self.components[3]
    }

    pub fn y_dot(&self) -> f64 {
        self.components[4]
    }

    pub fn z_dot(&self) -> f64 {
        self.components[5]
    }

    pub fn set_x(&mut self, value: f64) {
        self.components[0] = value;
    }

    pub fn set_y(&mut self, value: f64) {
        self.components[1] = value;
    }

    pub fn set_z(&mut self, value: f64) {
        self.components[2] = value;
    }

    pub fn set_x_dot(&mut self, value: f64) {
        self.components[3] = value;
    }

    pub fn set_y_dot(&mut self, value: f64) {
        self.components[4] = value;
    }

    pub fn set_z_dot(&mut self, value: f64) {
        self.components[5] = value;
    }

    /// Position vector (first three components)
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x(), self.y(), self.z())
    }

    /// Velocity vector (last three components)
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.x_dot(), self.y_dot(), self.z_dot())
    }

    /// All six components as a vector
    pub fn as_vector(&self) -> &Vector6<f64> {
        &self.components
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.components.iter().all(|c| c.is_finite())
    }

    /// Sum of absolute component differences between two states
    pub fn abs_difference_sum(&self, other: &State) -> f64 {
        (self.components - other.components).abs().sum()
    }
}

impl From<Vector6<f64>> for State {
    fn from(components: Vector6<f64>) -> Self {
        State { components }
    }
}

impl From<State> for Vector6<f64> {
    fn from(state: State) -> Self {
        state.components
    }
}

impl Index<usize> for State {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.components[index]
    }
}

impl IndexMut<usize> for State {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.components[index]
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "State(r=[{:.6}, {:.6}, {:.6}], v=[{:.9}, {:.9}, {:.9}])",
            self.x(),
            self.y(),
            self.z(),
            self.x_dot(),
            self.y_dot(),
            self.z_dot(),
        )
    }
}

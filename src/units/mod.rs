//! Unit conversion for states and histories built on the `uom` crate
//!
//! The propagators are unit-agnostic: any consistent length/time system
//! works as long as μ uses it too. The crate's demos work in meters and
//! seconds while benchmark files are written in kilometers, so this module
//! converts between the two.
//!
//! Re-exports the `uom::si::f64` quantity types used for the conversions.

pub use uom::si::f64::Length;
pub use uom::si::f64::Time;
pub use uom::si::f64::Velocity;
pub use uom::si::f64::Volume;

pub use uom::si::length::kilometer;
pub use uom::si::length::meter;
pub use uom::si::time::second;
pub use uom::si::velocity::kilometer_per_second;
pub use uom::si::velocity::meter_per_second;
pub use uom::si::volume::cubic_kilometer;
pub use uom::si::volume::cubic_meter;

use crate::serieslib::PropagationHistory;
use crate::state::State;

/// Convert kilometers to meters
pub fn km_to_m(km: f64) -> f64 {
    Length::new::<kilometer>(km).get::<meter>()
}

/// Convert meters to kilometers
pub fn m_to_km(m: f64) -> f64 {
    Length::new::<meter>(m).get::<kilometer>()
}

/// Convert km/s to m/s
pub fn km_per_s_to_m_per_s(km_s: f64) -> f64 {
    Velocity::new::<kilometer_per_second>(km_s).get::<meter_per_second>()
}

/// Convert m/s to km/s
pub fn m_per_s_to_km_per_s(m_s: f64) -> f64 {
    Velocity::new::<meter_per_second>(m_s).get::<kilometer_per_second>()
}

/// State in km and km/s to m and m/s
pub fn state_km_to_m(state: &State) -> State {
    State::new(
        km_to_m(state.x()),
        km_to_m(state.y()),
        km_to_m(state.z()),
        km_per_s_to_m_per_s(state.x_dot()),
        km_per_s_to_m_per_s(state.y_dot()),
        km_per_s_to_m_per_s(state.z_dot()),
    )
}

/// State in m and m/s to km and km/s
pub fn state_m_to_km(state: &State) -> State {
    State::new(
        m_to_km(state.x()),
        m_to_km(state.y()),
        m_to_km(state.z()),
        m_per_s_to_km_per_s(state.x_dot()),
        m_per_s_to_km_per_s(state.y_dot()),
        m_per_s_to_km_per_s(state.z_dot()),
    )
}

/// Convert every state of a history; epochs stay in seconds
pub fn history_km_to_m(history: &PropagationHistory) -> PropagationHistory {
    history.map_states(state_km_to_m)
}

/// Convert every state of a history; epochs stay in seconds
pub fn history_m_to_km(history: &PropagationHistory) -> PropagationHistory {
    history.map_states(state_m_to_km)
}

/// Gravitational parameter from m³/s² to km³/s²
///
/// The time unit is unchanged, so only the volume part is rescaled.
pub fn mu_m3_to_km3(mu: f64) -> f64 {
    Volume::new::<cubic_meter>(mu).get::<cubic_kilometer>()
}

/// Gravitational parameter from km³/s² to m³/s²
pub fn mu_km3_to_m3(mu: f64) -> f64 {
    Volume::new::<cubic_kilometer>(mu).get::<cubic_meter>()
}
